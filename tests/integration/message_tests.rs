use rstest::rstest;
use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, TestUser};

async fn chat_with_messages(app: &TestApp, count: usize) -> (Uuid, TestUser) {
    let fpo_id = app.create_fpo("Sonipat Kisan FPO").await;
    let farmer = app.register_user().await;
    app.join(&farmer, fpo_id).await;
    for i in 1..=count {
        app.send(&farmer, fpo_id, &format!("message {}", i)).await;
    }
    (fpo_id, farmer)
}

fn contents(page: &serde_json::Value) -> Vec<String> {
    page["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_member_sends_message() {
    let app = TestApp::new().await;
    let (fpo_id, farmer) = chat_with_messages(&app, 0).await;

    let response = app
        .post_json_as(
            &format!("/api/v1/fpo/{}/messages", fpo_id),
            json!({ "content": "  Urea stock arrived  " }),
            &farmer.token,
        )
        .await;
    response.assert_created();

    let body: serde_json::Value = response.json();
    let message = &body["message"];
    assert_eq!(message["content"], "  Urea stock arrived  ");
    assert_eq!(message["fpoId"], fpo_id.to_string());
    assert_eq!(message["author"]["id"], farmer.id.to_string());
    assert_eq!(message["author"]["displayName"], farmer.display_name);
    assert_eq!(message["readBy"], json!([]));
}

#[tokio::test]
async fn test_non_member_cannot_send_or_read() {
    let app = TestApp::new().await;
    let (fpo_id, _) = chat_with_messages(&app, 1).await;
    let outsider = app.register_user().await;
    let uri = format!("/api/v1/fpo/{}/messages", fpo_id);

    let response = app
        .post_json_as(&uri, json!({ "content": "hello?" }), &outsider.token)
        .await;
    response.assert_forbidden();
    assert_eq!(response.error_code(), "access_denied");

    app.get_as(&uri, &outsider.token).await.assert_forbidden();
}

#[tokio::test]
async fn test_send_to_unknown_fpo_is_not_found_before_access_check() {
    let app = TestApp::new().await;
    let farmer = app.register_user().await;

    let response = app
        .post_json_as(
            &format!("/api/v1/fpo/{}/messages", Uuid::new_v4()),
            json!({ "content": "" }),
            &farmer.token,
        )
        .await;
    response.assert_not_found();
}

#[tokio::test]
async fn test_non_member_with_blank_content_gets_forbidden() {
    let app = TestApp::new().await;
    let (fpo_id, _) = chat_with_messages(&app, 0).await;
    let outsider = app.register_user().await;

    app.post_json_as(
        &format!("/api/v1/fpo/{}/messages", fpo_id),
        json!({ "content": "   " }),
        &outsider.token,
    )
    .await
    .assert_forbidden();
}

#[rstest]
#[case(json!({ "content": "" }))]
#[case(json!({ "content": " \n\t " }))]
#[case(json!({}))]
#[tokio::test]
async fn test_blank_content_rejected(#[case] body: serde_json::Value) {
    let app = TestApp::new().await;
    let (fpo_id, farmer) = chat_with_messages(&app, 0).await;

    let response = app
        .post_json_as(&format!("/api/v1/fpo/{}/messages", fpo_id), body, &farmer.token)
        .await;
    response.assert_bad_request();
    assert_eq!(response.error_code(), "invalid_content");
}

#[tokio::test]
async fn test_send_requires_session() {
    let app = TestApp::new().await;
    let (fpo_id, _) = chat_with_messages(&app, 0).await;

    app.post_json(
        &format!("/api/v1/fpo/{}/messages", fpo_id),
        json!({ "content": "hi" }),
    )
    .await
    .assert_unauthorized();
}

#[tokio::test]
async fn test_first_page_holds_newest_messages_oldest_first() {
    let app = TestApp::new().await;
    let (fpo_id, farmer) = chat_with_messages(&app, 5).await;

    let page: serde_json::Value = app
        .get_as(
            &format!("/api/v1/fpo/{}/messages?page=1&limit=2", fpo_id),
            &farmer.token,
        )
        .await
        .json();

    assert_eq!(contents(&page), vec!["message 4", "message 5"]);
    assert_eq!(page["currentPage"], 1);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["totalCount"], 5);
}

#[tokio::test]
async fn test_pages_concatenated_last_to_first_give_full_history() {
    let app = TestApp::new().await;
    let (fpo_id, farmer) = chat_with_messages(&app, 5).await;

    let mut history = Vec::new();
    for page in (1..=3).rev() {
        let body: serde_json::Value = app
            .get_as(
                &format!("/api/v1/fpo/{}/messages?page={}&limit=2", fpo_id, page),
                &farmer.token,
            )
            .await
            .json();
        history.extend(contents(&body));
    }

    let expected: Vec<String> = (1..=5).map(|i| format!("message {}", i)).collect();
    assert_eq!(history, expected);
}

#[rstest]
#[case("", 1, 1, 3)]
#[case("?page=2&limit=2", 2, 2, 1)]
#[case("?page=9&limit=2", 9, 2, 0)]
#[case("?page=0&limit=0", 1, 1, 3)]
#[case("?page=abc&limit=-4", 1, 1, 3)]
#[tokio::test]
async fn test_page_query_handling(
    #[case] query: &str,
    #[case] expected_page: u64,
    #[case] expected_total_pages: u64,
    #[case] expected_len: usize,
) {
    let app = TestApp::new().await;
    let (fpo_id, farmer) = chat_with_messages(&app, 3).await;

    let response = app
        .get_as(
            &format!("/api/v1/fpo/{}/messages{}", fpo_id, query),
            &farmer.token,
        )
        .await;
    response.assert_ok();

    let page: serde_json::Value = response.json();
    assert_eq!(page["currentPage"], expected_page);
    assert_eq!(page["totalPages"], expected_total_pages);
    assert_eq!(page["totalCount"], 3);
    assert_eq!(page["messages"].as_array().unwrap().len(), expected_len);
}

#[tokio::test]
async fn test_empty_chat_has_no_pages() {
    let app = TestApp::new().await;
    let (fpo_id, farmer) = chat_with_messages(&app, 0).await;

    let page: serde_json::Value = app
        .get_as(&format!("/api/v1/fpo/{}/messages", fpo_id), &farmer.token)
        .await
        .json();
    assert_eq!(page["totalPages"], 0);
    assert_eq!(page["totalCount"], 0);
    assert_eq!(page["messages"], json!([]));
}

#[tokio::test]
async fn test_send_without_content_type() {
    let app = TestApp::new().await;
    let fpo_id = app.create_fpo("Hisar Cotton Producers").await;
    let member = app.register_user().await;
    app.join(&member, fpo_id).await;

    let response = app
        .post_raw_as(
            &format!("/api/v1/fpo/{}/messages", fpo_id),
            r#"{"content":"Pink bollworm traps are in"}"#,
            &member.token,
        )
        .await;
    response.assert_created();
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"]["content"], "Pink bollworm traps are in");
}

#[tokio::test]
async fn test_non_member_with_malformed_message_body_gets_forbidden() {
    let app = TestApp::new().await;
    let fpo_id = app.create_fpo("Sirsa Kinnow Growers").await;
    let outsider = app.register_user().await;

    let response = app
        .post_raw_as(&format!("/api/v1/fpo/{}/messages", fpo_id), "not json", &outsider.token)
        .await;
    response.assert_forbidden();
}
