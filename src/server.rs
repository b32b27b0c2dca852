//! 进程启动与关闭
//! 命令行参数、.env 加载、配置与日志初始化、各服务状态构建、优雅关闭

use crate::{
    auth::{JwtService, PasswordHasher},
    config::{AppConfig, ServerConfig},
    db,
    handlers::health,
    middleware::{AppState, BalanceState, CatalogState},
    repository::{CredentialStore, MemoryCredentialStore, SqliteCredentialStore},
    services::{AuthService, CatalogService, EthereumClient},
    telemetry,
};
use axum::Router;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::{net::TcpListener, signal, sync::watch};

/// 命令行参数解析结果
#[derive(Debug, PartialEq, Eq)]
pub enum CliCommand {
    Run,
    Version,
    Help,
    Unknown(String),
}

/// 解析命令行参数（不含程序名）
pub fn parse_args<I, S>(args: I) -> CliCommand
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match args.into_iter().next() {
        None => CliCommand::Run,
        Some(arg) => match arg.as_ref() {
            "--version" | "-V" => CliCommand::Version,
            "--help" | "-h" => CliCommand::Help,
            other => CliCommand::Unknown(other.to_string()),
        },
    }
}

/// 打印帮助信息
fn print_help(service: &str) {
    println!("{} {}", service, env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: {} [选项]", service);
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  所有配置通过 AUTHGATE_ 前缀的环境变量完成，例如 AUTHGATE_SECURITY__JWT_SECRET");
    println!("  可用选项请参考 .env.example");
}

/// 加载 .env 文件（开发环境）
///
/// 按优先级加载：.env.local > .env.development > .env；
/// 设置了 `AUTHGATE_ENV` 时只加载 `.env.<AUTHGATE_ENV>`。
/// 已存在的环境变量不会被覆盖。
fn load_dotenv() {
    if let Ok(env) = std::env::var("AUTHGATE_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }
}

/// 进程启动的公共部分
///
/// 返回 `None` 表示已经处理了 `--version` / `--help`，进程应直接退出；
/// 未知参数返回错误，由 `main` 以非零状态退出。
pub fn start(service: &str) -> anyhow::Result<Option<AppConfig>> {
    start_with_args(service, std::env::args().skip(1))
}

/// 同 [`start`]，参数由调用方给出（不含程序名）
pub fn start_with_args<I, S>(service: &str, args: I) -> anyhow::Result<Option<AppConfig>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match parse_args(args) {
        CliCommand::Run => {}
        CliCommand::Version => {
            println!("{} {}", service, env!("CARGO_PKG_VERSION"));
            return Ok(None);
        }
        CliCommand::Help => {
            print_help(service);
            return Ok(None);
        }
        CliCommand::Unknown(arg) => {
            eprintln!("未知参数: {}（使用 --help 查看可用选项）", arg);
            return Err(anyhow::anyhow!("unknown argument: {}", arg));
        }
    }

    load_dotenv();

    // 设置应用启动时间
    health::set_start_time();

    // 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 初始化日志
    telemetry::init_telemetry(service, &config.logging);

    tracing::info!(service, version = env!("CARGO_PKG_VERSION"), "Starting");

    Ok(Some(config))
}

fn auth_state(config: &AppConfig, store: Arc<dyn CredentialStore>) -> anyhow::Result<Arc<AppState>> {
    let jwt_service = Arc::new(JwtService::from_config(config)?);
    let hasher = Arc::new(PasswordHasher::from_config(&config.security)?);

    let auth_service = Arc::new(AuthService::new(
        store,
        hasher,
        jwt_service.clone(),
        config.security.clone(),
    ));

    Ok(Arc::new(AppState {
        auth_service,
        jwt_service,
    }))
}

/// users 服务：SQLite 凭据存储
pub async fn build_users_state(config: &AppConfig) -> anyhow::Result<Arc<AppState>> {
    // 数据库连接池 + 迁移
    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    tracing::info!("Database initialized");

    auth_state(config, Arc::new(SqliteCredentialStore::new(pool)))
}

/// directory 服务：内存凭据存储，启动时写入配置中的固定用户
pub async fn build_directory_state(config: &AppConfig) -> anyhow::Result<Arc<AppState>> {
    let state = auth_state(config, Arc::new(MemoryCredentialStore::new()))?;

    let seeded = state.auth_service.seed(&config.directory.users).await?;
    if seeded == 0 {
        tracing::warn!("Directory is empty, no user will be able to log in");
    } else {
        tracing::info!(users = seeded, "Directory seeded");
    }

    Ok(state)
}

/// catalog 服务：启动时拉取一次目录，然后定时刷新
pub async fn build_catalog_state(config: &AppConfig) -> anyhow::Result<Arc<CatalogState>> {
    let catalog_service = Arc::new(CatalogService::new(&config.catalog)?);

    // 启动时拉取失败不阻止服务启动，刷新任务会继续重试
    let _ = catalog_service.refresh().await;
    catalog_service.spawn_refresh_task();

    Ok(Arc::new(CatalogState { catalog_service }))
}

/// balance 服务
pub async fn build_balance_state(config: &AppConfig) -> anyhow::Result<Arc<BalanceState>> {
    let ethereum_client = Arc::new(EthereumClient::from_config(&config.ethereum)?);

    Ok(Arc::new(BalanceState { ethereum_client }))
}

/// 绑定地址并启动服务器，收到关闭信号后在超时时间内优雅关闭
pub async fn serve(router: Router, config: &ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.addr).await?;

    tracing::info!(addr = %listener.local_addr()?, "Server listening");

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let timeout = Duration::from_secs(config.graceful_shutdown_timeout_secs);

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .into_future();

    // 收到信号后开始计时，超时则放弃仍在处理的连接
    let deadline = async move {
        if shutdown_rx.wait_for(|stopping| *stopping).await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(timeout).await;
    };

    tokio::select! {
        result = server => result?,
        _ = deadline => {
            tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        }
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(Vec::<String>::new()), CliCommand::Run);
        assert_eq!(parse_args(["--version"]), CliCommand::Version);
        assert_eq!(parse_args(["--help"]), CliCommand::Help);
        assert_eq!(
            parse_args(["--port", "80"]),
            CliCommand::Unknown("--port".to_string())
        );
    }

    #[test]
    fn test_start_rejects_unknown_argument() {
        let err = start_with_args("authgate-test", ["--bogus"]).unwrap_err();
        assert_eq!(err.to_string(), "unknown argument: --bogus");
    }

    #[test]
    fn test_start_version_and_help_exit_early() {
        assert!(start_with_args("authgate-test", ["--version"]).unwrap().is_none());
        assert!(start_with_args("authgate-test", ["-h"]).unwrap().is_none());
    }
}
