use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, TestUser};

async fn unread_count(app: &TestApp, user: &TestUser, fpo_id: Uuid) -> i64 {
    let chat: serde_json::Value = app
        .get_as(&format!("/api/v1/fpo/{}/chat", fpo_id), &user.token)
        .await
        .json();
    chat["unreadCount"].as_i64().unwrap()
}

async fn mark_read(app: &TestApp, user: &TestUser, fpo_id: Uuid) -> serde_json::Value {
    let response = app
        .post_json_as(
            &format!("/api/v1/fpo/{}/chat", fpo_id),
            json!({ "action": "mark_read" }),
            &user.token,
        )
        .await;
    response.assert_ok();
    response.json()
}

#[tokio::test]
async fn test_unread_counts_and_mark_read_are_per_user() {
    let app = TestApp::new().await;
    let fpo_id = app.create_fpo("Sonipat Kisan FPO").await;
    let asha = app.register_user_named("Asha Devi").await;
    let ravi = app.register_user_named("Ravi Kumar").await;
    app.join(&asha, fpo_id).await;
    app.join(&ravi, fpo_id).await;

    app.send(&asha, fpo_id, "Seed distribution on Monday").await;
    app.send(&asha, fpo_id, "Bring your Kisan cards").await;

    assert_eq!(unread_count(&app, &ravi, fpo_id).await, 2);
    // Authors are not added to the read-set of their own messages
    assert_eq!(unread_count(&app, &asha, fpo_id).await, 2);

    let body = mark_read(&app, &ravi, fpo_id).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["markedCount"], 2);
    assert_eq!(unread_count(&app, &ravi, fpo_id).await, 0);
    assert_eq!(unread_count(&app, &asha, fpo_id).await, 2);

    // Nothing left to mark
    let body = mark_read(&app, &ravi, fpo_id).await;
    assert_eq!(body["markedCount"], 0);

    app.send(&asha, fpo_id, "Meeting moved to 10am").await;
    assert_eq!(unread_count(&app, &ravi, fpo_id).await, 1);
}

#[tokio::test]
async fn test_mark_read_fills_read_by() {
    let app = TestApp::new().await;
    let fpo_id = app.create_fpo("Sonipat Kisan FPO").await;
    let asha = app.register_user().await;
    let ravi = app.register_user().await;
    app.join(&asha, fpo_id).await;
    app.join(&ravi, fpo_id).await;
    app.send(&asha, fpo_id, "Soil testing camp").await;

    mark_read(&app, &ravi, fpo_id).await;

    let page: serde_json::Value = app
        .get_as(&format!("/api/v1/fpo/{}/messages", fpo_id), &asha.token)
        .await
        .json();
    assert_eq!(page["messages"][0]["readBy"], json!([ravi.id]));
}

#[tokio::test]
async fn test_chat_detail() {
    let app = TestApp::new().await;
    let fpo_id = app.create_fpo("Sonipat Kisan FPO").await;
    let asha = app.register_user().await;
    app.join(&asha, fpo_id).await;

    let response = app
        .get_as(&format!("/api/v1/fpo/{}/chat", fpo_id), &asha.token)
        .await;
    response.assert_ok();
    let chat: serde_json::Value = response.json();
    assert_eq!(chat["id"], fpo_id.to_string());
    assert_eq!(chat["memberCount"], 1);
    assert!(chat["lastMessage"].is_null());

    app.send(&asha, fpo_id, "first").await;
    app.send(&asha, fpo_id, "second").await;

    let chat: serde_json::Value = app
        .get_as(&format!("/api/v1/fpo/{}/chat", fpo_id), &asha.token)
        .await
        .json();
    assert_eq!(chat["lastMessage"]["content"], "second");
}

#[tokio::test]
async fn test_chat_is_members_only() {
    let app = TestApp::new().await;
    let fpo_id = app.create_fpo("Sonipat Kisan FPO").await;
    let outsider = app.register_user().await;
    let uri = format!("/api/v1/fpo/{}/chat", fpo_id);

    app.get_as(&uri, &outsider.token).await.assert_forbidden();
    app.post_json_as(&uri, json!({ "action": "mark_read" }), &outsider.token)
        .await
        .assert_forbidden();
}

#[tokio::test]
async fn test_chat_of_unknown_fpo() {
    let app = TestApp::new().await;
    let farmer = app.register_user().await;
    let uri = format!("/api/v1/fpo/{}/chat", Uuid::new_v4());

    app.get_as(&uri, &farmer.token).await.assert_not_found();
    app.post_json_as(&uri, json!({ "action": "mark_read" }), &farmer.token)
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_unknown_chat_action_rejected() {
    let app = TestApp::new().await;
    let fpo_id = app.create_fpo("Sonipat Kisan FPO").await;
    let farmer = app.register_user().await;
    app.join(&farmer, fpo_id).await;

    for body in [json!({ "action": "archive" }), json!({})] {
        let response = app
            .post_json_as(&format!("/api/v1/fpo/{}/chat", fpo_id), body, &farmer.token)
            .await;
        response.assert_bad_request();
        let error: serde_json::Value = response.json();
        assert_eq!(error["error"], "Invalid action");
    }
}

async fn chat_order(app: &TestApp, user: &TestUser) -> Vec<serde_json::Value> {
    let response = app.get_as("/api/v1/user/chats", &user.token).await;
    response.assert_ok();
    response.json()
}

#[tokio::test]
async fn test_chat_list_ordered_by_recent_activity() {
    let app = TestApp::new().await;
    let older = app.create_fpo("Gohana Vegetable Growers").await;
    let newer = app.create_fpo("Sonipat Kisan FPO").await;
    let asha = app.register_user().await;
    let ravi = app.register_user().await;
    app.join(&asha, older).await;
    app.join(&asha, newer).await;
    app.join(&ravi, older).await;

    // No messages yet: newest FPO first
    let chats = chat_order(&app, &asha).await;
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[0]["fpoId"], newer.to_string());
    assert!(chats[0]["lastMessage"].is_null());

    app.send(&ravi, older, "Tomato prices crashed").await;

    let chats = chat_order(&app, &asha).await;
    assert_eq!(chats[0]["fpoId"], older.to_string());
    assert_eq!(chats[0]["unreadCount"], 1);
    assert_eq!(chats[0]["memberRole"], "Member");
    assert_eq!(chats[0]["lastMessage"]["content"], "Tomato prices crashed");
    assert_eq!(chats[1]["unreadCount"], 0);
}

#[tokio::test]
async fn test_chat_list_empty_without_memberships() {
    let app = TestApp::new().await;
    app.create_fpo("Sonipat Kisan FPO").await;
    let farmer = app.register_user().await;

    assert!(chat_order(&app, &farmer).await.is_empty());
}

#[tokio::test]
async fn test_mark_read_without_content_type() {
    let app = TestApp::new().await;
    let fpo_id = app.create_fpo("Jhajjar Organic Collective").await;
    let author = app.register_user().await;
    let reader = app.register_user().await;
    app.join(&author, fpo_id).await;
    app.join(&reader, fpo_id).await;
    app.send(&author, fpo_id, "Compost pit training tomorrow").await;

    let response = app
        .post_raw_as(
            &format!("/api/v1/fpo/{}/chat", fpo_id),
            r#"{"action":"mark_read"}"#,
            &reader.token,
        )
        .await;
    response.assert_ok();
    assert_eq!(response.json::<serde_json::Value>()["markedCount"], 1);
}

#[tokio::test]
async fn test_non_member_with_malformed_chat_body_gets_forbidden() {
    let app = TestApp::new().await;
    let fpo_id = app.create_fpo("Jind Pulse Growers").await;
    let outsider = app.register_user().await;

    let response = app
        .post_raw_as(&format!("/api/v1/fpo/{}/chat", fpo_id), "{oops", &outsider.token)
        .await;
    response.assert_forbidden();
    assert_eq!(response.error_code(), "access_denied");
}

#[tokio::test]
async fn test_member_with_malformed_chat_body_gets_bad_request() {
    let app = TestApp::new().await;
    let fpo_id = app.create_fpo("Bhiwani Millet FPO").await;
    let member = app.register_user().await;
    app.join(&member, fpo_id).await;

    let response = app
        .post_raw_as(&format!("/api/v1/fpo/{}/chat", fpo_id), "{oops", &member.token)
        .await;
    response.assert_bad_request();
    assert_eq!(response.error_code(), "invalid_input");
}
