use crate::common::TestApp;

#[tokio::test]
async fn test_health_reports_version_and_uptime() {
    let app = TestApp::new().await;

    let response = app.get("/api/v1/health").await;
    response.assert_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptimeSeconds"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_liveness() {
    let app = TestApp::new().await;
    app.get("/api/v1/health/live").await.assert_ok();
}

#[tokio::test]
async fn test_readiness_checks_database() {
    let app = TestApp::new().await;

    let response = app.get("/api/v1/health/ready").await;
    response.assert_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["database"], "healthy");
}

#[tokio::test]
async fn test_readiness_fails_when_database_closed() {
    let app = TestApp::new().await;
    app.state.db.close().await;

    let response = app.get("/api/v1/health/ready").await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "not_ready");
}
