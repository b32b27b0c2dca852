//! 公共 API 目录过滤服务

use authgate::{routes, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(config) = server::start("catalog-service")? else {
        return Ok(());
    };

    let state = server::build_catalog_state(&config).await?;
    let app = routes::create_catalog_router(state);

    server::serve(app, &config.server).await
}
