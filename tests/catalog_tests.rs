//! 公共 API 目录服务集成测试（上游使用 wiremock 模拟）

use authgate::{
    config::CatalogConfig, middleware::CatalogState, routes::create_catalog_router,
    services::CatalogService,
};
use axum::{http::StatusCode, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

mod common;
use common::{authed_request, send};

fn entry(api: &str, category: &str) -> Value {
    json!({
        "API": api,
        "Description": format!("{} description", api),
        "Auth": "",
        "HTTPS": true,
        "Cors": "yes",
        "Link": format!("https://example.org/{}", api),
        "Category": category,
    })
}

async fn upstream(entries: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/entries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": entries.as_array().map_or(0, |a| a.len()),
            "entries": entries,
        })))
        .mount(&server)
        .await;
    server
}

async fn catalog(server: &MockServer) -> (Arc<CatalogService>, Router) {
    let service = Arc::new(
        CatalogService::new(&CatalogConfig {
            source_url: format!("{}/entries", server.uri()),
            fetch_timeout_secs: 2,
            refresh_interval_secs: 0,
        })
        .unwrap(),
    );
    let app = create_catalog_router(Arc::new(CatalogState {
        catalog_service: service.clone(),
    }));
    (service, app)
}

#[tokio::test]
async fn test_filter_by_category_and_limit() {
    let server = upstream(json!([
        entry("Cat Facts", "Animals"),
        entry("Dogs", "Animals"),
        entry("Open Meteo", "Weather"),
        entry("Shibe", "animals"),
    ]))
    .await;
    let (service, app) = catalog(&server).await;
    assert_eq!(service.refresh().await.unwrap(), 4);

    let (status, body) = send(&app, authed_request("GET", "/api/publicapis", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 4);

    let (status, body) = send(
        &app,
        authed_request("GET", "/api/publicapis?category=ANIMALS", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);

    let (status, body) = send(
        &app,
        authed_request("GET", "/api/publicapis?category=animals&limit=2", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["entries"][0]["API"], "Cat Facts");
    assert_eq!(body["entries"][0]["Category"], "Animals");
    assert_eq!(body["entries"][1]["API"], "Dogs");
}

#[tokio::test]
async fn test_non_numeric_limit_rejected() {
    let server = upstream(json!([entry("Cat Facts", "Animals")])).await;
    let (service, app) = catalog(&server).await;
    service.refresh().await.unwrap();

    let (status, body) = send(&app, authed_request("GET", "/api/publicapis?limit=ten", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Limit parameter must be a number");
}

#[tokio::test]
async fn test_fractional_limit_truncated() {
    let server = upstream(json!([
        entry("Cat Facts", "Animals"),
        entry("Dogs", "Animals"),
        entry("Shibe", "Animals"),
    ]))
    .await;
    let (service, app) = catalog(&server).await;
    service.refresh().await.unwrap();

    let (status, body) = send(&app, authed_request("GET", "/api/publicapis?limit=1.5", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, body) = send(&app, authed_request("GET", "/api/publicapis?limit=2abc", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (status, _) = send(&app, authed_request("GET", "/api/publicapis?limit=-1", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let server = upstream(json!([entry("Cat Facts", "Animals"), entry("Dogs", "Animals")])).await;
    let (service, app) = catalog(&server).await;
    service.refresh().await.unwrap();

    // 上游开始返回 500
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/entries"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(service.refresh().await.is_err());

    let (status, body) = send(&app, authed_request("GET", "/api/publicapis", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_malformed_upstream_payload_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/entries"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    let (service, app) = catalog(&server).await;

    assert!(service.refresh().await.is_err());

    // 从未拉取成功：空目录，未就绪
    let (status, body) = send(&app, authed_request("GET", "/api/publicapis", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let (status, body) = send(&app, authed_request("GET", "/ready", None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ready"], false);
}

#[tokio::test]
async fn test_null_entries_yield_empty_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/entries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 0, "entries": null })))
        .mount(&server)
        .await;
    let (service, app) = catalog(&server).await;

    assert_eq!(service.refresh().await.unwrap(), 0);

    let (status, body) = send(&app, authed_request("GET", "/ready", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
}
