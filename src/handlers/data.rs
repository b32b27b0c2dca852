//! 目录服务的受保护数据端点

use crate::auth::middleware::AuthContext;
use axum::{response::IntoResponse, Json};
use serde_json::json;

pub async fn user_data(auth_context: AuthContext) -> impl IntoResponse {
    Json(json!({
        "message": "Authenticated user data",
        "user": { "username": auth_context.username },
    }))
}
