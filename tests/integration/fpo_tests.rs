use serde_json::json;
use uuid::Uuid;

use crate::common::{fpo_body, TestApp};

#[tokio::test]
async fn test_empty_directory_is_not_found() {
    let app = TestApp::new().await;

    let response = app.get("/api/v1/fpo").await;
    response.assert_not_found();
    assert_eq!(response.error_code(), "fpo_not_found");
}

#[tokio::test]
async fn test_create_and_list_fpos_with_member_counts() {
    let app = TestApp::new().await;
    let fpo_id = app.create_fpo("Sonipat Kisan FPO").await;
    app.create_fpo("Karnal Dairy Collective").await;

    let farmer = app.register_user().await;
    app.join(&farmer, fpo_id).await;

    let response = app.get("/api/v1/fpo").await;
    response.assert_ok();

    let fpos: Vec<serde_json::Value> = response.json();
    assert_eq!(fpos.len(), 2);

    let sonipat = fpos
        .iter()
        .find(|f| f["id"] == fpo_id.to_string())
        .unwrap();
    assert_eq!(sonipat["name"], "Sonipat Kisan FPO");
    assert_eq!(sonipat["memberCount"], 1);
}

#[tokio::test]
async fn test_create_fpo_trims_fields() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/api/v1/fpo/new",
            json!({
                "name": "  Panipat Growers  ",
                "location": " Panipat ",
                "description": " Wheat and mustard ",
            }),
        )
        .await;
    response.assert_created();

    let fpo: serde_json::Value = response.json();
    assert_eq!(fpo["name"], "Panipat Growers");
    assert_eq!(fpo["location"], "Panipat");
}

#[tokio::test]
async fn test_create_fpo_requires_all_fields() {
    let app = TestApp::new().await;

    let response = app
        .post_json("/api/v1/fpo/new", json!({ "name": "No Location" }))
        .await;
    response.assert_bad_request();
    assert_eq!(response.error_code(), "invalid_input");

    let response = app
        .post_json(
            "/api/v1/fpo/new",
            json!({ "name": "   ", "location": "Rohtak", "description": "x" }),
        )
        .await;
    response.assert_bad_request();
}

#[tokio::test]
async fn test_create_fpo_rejects_malformed_json() {
    let app = TestApp::new().await;

    let response = app
        .request(
            axum::http::Request::builder()
                .method("POST")
                .uri("/api/v1/fpo/new")
                .header("Content-Type", "application/json")
                .body(axum::body::Body::from("{not json"))
                .unwrap(),
        )
        .await;
    response.assert_bad_request();
}

#[tokio::test]
async fn test_get_unknown_or_malformed_fpo() {
    let app = TestApp::new().await;

    app.get(&format!("/api/v1/fpo/{}", Uuid::new_v4()))
        .await
        .assert_not_found();
    app.get("/api/v1/fpo/not-a-uuid").await.assert_not_found();
}

#[tokio::test]
async fn test_fpo_detail_hides_messages_from_non_members() {
    let app = TestApp::new().await;
    let fpo_id = app.create_fpo("Sonipat Kisan FPO").await;

    let member = app.register_user().await;
    let outsider = app.register_user().await;
    app.join(&member, fpo_id).await;
    app.send(&member, fpo_id, "Mandi prices are up today").await;

    let uri = format!("/api/v1/fpo/{}", fpo_id);

    // Anonymous
    let anonymous: serde_json::Value = app.get(&uri).await.json();
    assert_eq!(anonymous["memberCount"], 1);
    assert!(anonymous.get("messages").is_none());

    // Signed in but not a member
    let response = app.get_as(&uri, &outsider.token).await;
    response.assert_ok();
    let body: serde_json::Value = response.json();
    assert!(body.get("messages").is_none());
    assert_eq!(body["members"][0]["user"]["id"], member.id.to_string());

    // Member
    let body: serde_json::Value = app.get_as(&uri, &member.token).await.json();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "Mandi prices are up today");
}

#[tokio::test]
async fn test_fpo_detail_with_invalid_token_is_anonymous() {
    let app = TestApp::new().await;
    let fpo_id = app.create_fpo("Sonipat Kisan FPO").await;

    let response = app
        .get_as(&format!("/api/v1/fpo/{}", fpo_id), "garbage-token")
        .await;
    response.assert_ok();
}

#[tokio::test]
async fn test_joined_fpos_lists_only_memberships() {
    let app = TestApp::new().await;
    let joined = app.create_fpo("Sonipat Kisan FPO").await;
    app.create_fpo("Hisar Cotton Growers").await;

    let farmer = app.register_user().await;
    app.join(&farmer, joined).await;

    let response = app.get_as("/api/v1/fpo/joined", &farmer.token).await;
    response.assert_ok();

    let fpos: Vec<serde_json::Value> = response.json();
    assert_eq!(fpos.len(), 1);
    assert_eq!(fpos[0]["id"], joined.to_string());
}

#[tokio::test]
async fn test_joined_fpos_requires_session() {
    let app = TestApp::new().await;
    app.create_fpo("Sonipat Kisan FPO").await;

    let response = app.get("/api/v1/fpo/joined").await;
    response.assert_unauthorized();
    assert_eq!(response.error_code(), "unauthenticated");
}

#[tokio::test]
async fn test_fpo_body_fixture_is_valid() {
    let app = TestApp::new().await;
    app.post_json("/api/v1/fpo/new", fpo_body("Jind Organic"))
        .await
        .assert_created();
}
