//! 测试公共模块
//! 提供测试配置、应用状态构建和请求辅助函数

#![allow(dead_code)]

use authgate::{
    config::{
        AppConfig, CatalogConfig, DatabaseConfig, DirectoryConfig, EthereumConfig, LoggingConfig,
        SecurityConfig, SeedUser, ServerConfig,
    },
    middleware::AppState,
    server,
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";

/// 创建测试配置
///
/// SQLite 使用内存数据库（单连接，保证所有查询落在同一个库上），
/// Argon2 使用最低开销参数以保持测试速度。
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(), // 使用随机端口
            graceful_shutdown_timeout_secs: 5,
        },
        database: DatabaseConfig {
            url: Secret::new("sqlite::memory:".to_string()),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Some(Secret::new(TEST_JWT_SECRET.to_string())),
            token_exp_secs: 300,
            password_min_length: 6,
            password_require_uppercase: false,
            password_require_digit: false,
            password_require_special: false,
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            argon2_parallelism: 1,
        },
        directory: DirectoryConfig {
            users: vec![
                SeedUser {
                    username: "rakesh".to_string(),
                    password: Secret::new("rakesh123".to_string()),
                },
                SeedUser {
                    username: "user2".to_string(),
                    password: Secret::new("password2".to_string()),
                },
            ],
        },
        catalog: CatalogConfig {
            source_url: "http://127.0.0.1:9/entries".to_string(),
            fetch_timeout_secs: 2,
            refresh_interval_secs: 0,
        },
        ethereum: EthereumConfig {
            rpc_url: None,
            request_timeout_secs: 2,
        },
    }
}

/// users 服务状态（内存 SQLite + 迁移）
pub async fn users_state(config: &AppConfig) -> Arc<AppState> {
    server::build_users_state(config)
        .await
        .expect("Failed to build users state")
}

/// users 服务路由
pub async fn users_app() -> Router {
    let config = create_test_config();
    authgate::routes::create_users_router(users_state(&config).await)
}

/// directory 服务路由
pub async fn directory_app() -> Router {
    let config = create_test_config();
    let state = server::build_directory_state(&config)
        .await
        .expect("Failed to build directory state");
    authgate::routes::create_directory_router(state)
}

/// 构造 JSON 请求
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// 构造带（或不带）Authorization 头的请求
pub fn authed_request(method: &str, uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

/// 发送请求并解析 JSON 响应体（空响应体解析为 Null）
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

/// 登录并返回令牌
pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/login",
            serde_json::json!({ "username": username, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");

    body["token"].as_str().unwrap().to_string()
}
