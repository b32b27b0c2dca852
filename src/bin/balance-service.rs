//! 以太坊余额查询服务

use authgate::{routes, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(config) = server::start("balance-service")? else {
        return Ok(());
    };

    let state = server::build_balance_state(&config).await?;
    let app = routes::create_balance_router(state);

    server::serve(app, &config.server).await
}
