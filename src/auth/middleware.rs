//! JWT 认证中间件
//!
//! 请求状态机：
//! - 没有 `Authorization` 头，或不是 `Bearer <token>` 两段格式 → 401，不进入 handler
//! - 令牌签名或声明校验失败 → 403
//! - 校验通过 → 把 [`AuthContext`] 放入请求扩展，交给 handler

use crate::{auth::jwt::JwtService, error::AppError};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// 认证上下文（附加到请求扩展，只在单个请求内存在）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub username: String,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// 从 Authorization 头提取令牌
///
/// 必须恰好是两段以单个空格分隔的非空字段，且第一段为 Bearer（不区分大小写）。
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
        {
            Ok(token)
        }
        _ => Err(AppError::Unauthorized),
    }
}

/// JWT 认证中间件 - 必须认证
pub async fn jwt_auth_middleware(
    State(jwt_service): State<Arc<JwtService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 从 Authorization 头提取令牌
    let token = extract_token(req.headers())?;

    // 验证令牌
    let claims = jwt_service.verify(token)?;

    tracing::debug!(username = %claims.sub, "Bearer token accepted");

    // 附加到请求扩展
    req.extensions_mut().insert(AuthContext {
        username: claims.sub,
    });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_extract_token_valid() {
        let headers = headers_with("Bearer test_token_123");
        assert_eq!(extract_token(&headers).unwrap(), "test_token_123");

        let headers = headers_with("bearer test_token_123");
        assert_eq!(extract_token(&headers).unwrap(), "test_token_123");
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert!(matches!(extract_token(&headers), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_extract_token_invalid_format() {
        for value in [
            "InvalidFormat",
            "Bearer",
            "Bearer ",
            "Bearer a b",
            "Bearer  token",
            "Basic dXNlcjpwYXNz",
        ] {
            let headers = headers_with(value);
            assert!(
                matches!(extract_token(&headers), Err(AppError::Unauthorized)),
                "{value:?} should be rejected"
            );
        }
    }
}
