mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;
use slug_shortener::infrastructure::memory::MemoryStore;
use slug_shortener::routes::core_router;

#[tokio::test]
async fn test_health_ok() {
    let app = common::spawn_app();

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"]["status"], "ok");
    assert_eq!(body["checks"]["click_queue"]["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_degraded_when_click_queue_closed() {
    let store = MemoryStore::new();
    let (state, rx) = common::create_test_state(&store, 10);
    drop(rx);
    let server = TestServer::new(core_router(state)).unwrap();

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["click_queue"]["status"], "error");
}

#[tokio::test]
async fn test_health_is_not_a_slug() {
    let app = common::spawn_app();
    common::insert_link(&app.store, "healthy", "https://example.com/", None, None).await;

    app.server.get("/health").await.assert_status_ok();
    app.server.get("/healthy").await.assert_status_not_found();
}
