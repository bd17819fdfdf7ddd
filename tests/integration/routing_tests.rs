use axum::{body::Body, http::Request, http::StatusCode};

use crate::common::TestApp;

#[tokio::test]
async fn test_unknown_path_gets_json_not_found() {
    let app = TestApp::new().await;

    for path in ["/api/v1/does/not/exist", "/api/v2/fpo", "/"] {
        let response = app.get(path).await;
        response.assert_not_found();
        assert_eq!(response.error_code(), "not_found", "path {}", path);
        assert_eq!(response.json::<serde_json::Value>()["error"], "No such endpoint");
    }
}

#[tokio::test]
async fn test_wrong_method_gets_json_method_not_allowed() {
    let app = TestApp::new().await;
    let fpo_id = app.create_fpo("Rohtak Mandi Growers").await;
    let member = app.register_user().await;
    app.join(&member, fpo_id).await;

    let response = app
        .request_with_auth(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/fpo/{}/messages", fpo_id))
                .body(Body::empty())
                .unwrap(),
            &member.token,
        )
        .await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.error_code(), "method_not_allowed");

    let response = app
        .request(
            Request::builder()
                .method("PUT")
                .uri("/api/v1/fpo")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.error_code(), "method_not_allowed");
}
