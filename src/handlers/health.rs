//! 健康检查处理器
//! 提供 /health 和 /ready 端点

use axum::{extract::State, http::StatusCode, Json};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    db::HealthStatus,
    middleware::{AppState, CatalogState},
};

/// 存活探针响应
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// 就绪探针响应
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<HealthCheck>,
}

/// 健康检查项
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthCheck {
    fn new(name: &str, health: HealthStatus) -> Self {
        match health {
            HealthStatus::Healthy => Self {
                name: name.to_string(),
                status: "healthy".to_string(),
                message: None,
            },
            HealthStatus::Unhealthy(msg) => Self {
                name: name.to_string(),
                status: "unhealthy".to_string(),
                message: Some(msg),
            },
        }
    }
}

/// 应用启动时间
static APP_START_TIME: OnceCell<Instant> = OnceCell::new();

/// 设置应用启动时间（只有第一次调用生效）
pub fn set_start_time() {
    let _ = APP_START_TIME.set(Instant::now());
}

/// 获取应用运行时间（秒）
pub fn get_uptime() -> u64 {
    APP_START_TIME.get().map_or(0, |start| start.elapsed().as_secs())
}

/// 存活探针
/// 快速响应，不检查依赖
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: get_uptime(),
    })
}

fn readiness(checks: Vec<HealthCheck>) -> (StatusCode, Json<ReadinessResponse>) {
    let ready = checks.iter().all(|c| c.status == "healthy");
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, checks }))
}

/// 就绪探针：检查凭据存储
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let store = state.auth_service.health_check().await;
    readiness(vec![HealthCheck::new("credential_store", store)])
}

/// 就绪探针：目录至少成功拉取过一次
pub async fn catalog_readiness_check(
    State(state): State<Arc<CatalogState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let snapshot = state.catalog_service.snapshot();
    let health = match snapshot.fetched_at {
        Some(_) => HealthStatus::Healthy,
        None => HealthStatus::Unhealthy("catalog has not been fetched yet".to_string()),
    };
    readiness(vec![HealthCheck::new("catalog", health)])
}

/// 就绪探针：没有需要检查的依赖
pub async fn static_readiness_check() -> (StatusCode, Json<ReadinessResponse>) {
    readiness(Vec::new())
}
