//! 固定用户目录的登录服务

use authgate::{routes, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(config) = server::start("directory-service")? else {
        return Ok(());
    };

    let state = server::build_directory_state(&config).await?;
    let app = routes::create_directory_router(state);

    server::serve(app, &config.server).await
}
