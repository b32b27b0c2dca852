//! 用户注册与登录服务

use authgate::{routes, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(config) = server::start("users-service")? else {
        return Ok(());
    };

    let state = server::build_users_state(&config).await?;
    let app = routes::create_users_router(state);

    server::serve(app, &config.server).await
}
