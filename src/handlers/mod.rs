//! HTTP 处理器模块

pub mod auth;
pub mod balance;
pub mod catalog;
pub mod data;
pub mod health;

use crate::error::AppError;
use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};

/// 请求体解析失败（缺字段、类型错误、非 JSON）按校验错误返回 400；
/// 超过请求体上限返回 413
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::Validation(rejection.body_text())
        }
    })
}
