//! 认证相关的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext, error::AppError, handlers::json_body, middleware::AppState,
    models::auth::*,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = json_body(payload)?;

    state.auth_service.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = json_body(payload)?;

    let response = state.auth_service.login(req).await?;

    Ok(Json(response))
}

/// 当前用户信息
pub async fn profile(auth_context: AuthContext) -> impl IntoResponse {
    Json(json!({
        "message": format!("Welcome {}! This is a protected route.", auth_context.username),
        "username": auth_context.username,
    }))
}

/// 登出
///
/// 令牌是无状态的，服务端无法提前作废，这里只做确认。
pub async fn logout(auth_context: AuthContext) -> impl IntoResponse {
    tracing::info!(username = %auth_context.username, "User logged out");

    Json(MessageResponse::new(format!(
        "Thank you {}, you have been logged out successfully!",
        auth_context.username
    )))
}
