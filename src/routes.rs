//! 路由注册
//! 每个服务一个路由构造函数，受保护的路由挂载 JWT 认证中间件

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{
    auth::middleware::jwt_auth_middleware,
    error::AppError,
    handlers,
    middleware::{request_tracking_middleware, AppState, BalanceState, CatalogState},
};

/// 请求体上限（64 KiB），认证请求远小于此
const MAX_BODY_BYTES: usize = 64 * 1024;

/// 未匹配的路由
async fn not_found() -> AppError {
    AppError::NotFound
}

/// 路径存在但方法不匹配
async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// 所有服务共用的外层：健康检查、404/405、请求体上限、请求追踪
///
/// 请求体上限由提取器执行，超限时经 [`AppError::PayloadTooLarge`] 返回统一的错误体。
fn finish<S>(router: Router<S>, ready: axum::routing::MethodRouter<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .route("/health", get(handlers::health::health_check))
        .route("/ready", ready)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn(request_tracking_middleware))
}

/// users 服务：注册、登录、个人信息、登出
pub fn create_users_router(state: Arc<AppState>) -> Router {
    // 需要认证的路由
    let authenticated_routes = Router::new()
        .route("/profile", get(handlers::auth::profile))
        .route("/logout", post(handlers::auth::logout))
        .route_layer(from_fn_with_state(
            state.jwt_service.clone(),
            jwt_auth_middleware,
        ));

    let router = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .merge(authenticated_routes);

    finish(router, get(handlers::health::readiness_check)).with_state(state)
}

/// directory 服务：固定用户目录登录，受保护的数据端点
pub fn create_directory_router(state: Arc<AppState>) -> Router {
    let authenticated_routes = Router::new()
        .route("/api/data", get(handlers::data::user_data))
        .route_layer(from_fn_with_state(
            state.jwt_service.clone(),
            jwt_auth_middleware,
        ));

    let router = Router::new()
        .route("/login", post(handlers::auth::login))
        .merge(authenticated_routes);

    finish(router, get(handlers::health::readiness_check)).with_state(state)
}

/// catalog 服务：公共 API 目录过滤
pub fn create_catalog_router(state: Arc<CatalogState>) -> Router {
    let router = Router::new().route(
        "/api/publicapis",
        get(handlers::catalog::list_public_apis),
    );

    finish(router, get(handlers::health::catalog_readiness_check)).with_state(state)
}

/// balance 服务：以太坊余额查询
pub fn create_balance_router(state: Arc<BalanceState>) -> Router {
    let router = Router::new().route("/balance/{address}", get(handlers::balance::get_balance));

    finish(router, get(handlers::health::static_readiness_check)).with_state(state)
}
