//! Step definitions for group chat and read state

use cucumber::{then, when};
use serde_json::json;

use crate::features::TestWorld;

#[when(expr = "{string} posts {string} in {string}")]
async fn posts(world: &mut TestWorld, user: String, content: String, fpo: String) {
    let user = world.user(&user);
    let fpo_id = world.fpo(&fpo);
    let response = world
        .app()
        .post_json_as(
            &format!("/api/v1/fpo/{}/messages", fpo_id),
            json!({ "content": content }),
            &user.token,
        )
        .await;
    world.last_response = Some(response);
}

#[when(expr = "{string} marks {string} as read")]
async fn marks_read(world: &mut TestWorld, user: String, fpo: String) {
    let user = world.user(&user);
    let fpo_id = world.fpo(&fpo);
    let response = world
        .app()
        .post_json_as(
            &format!("/api/v1/fpo/{}/chat", fpo_id),
            json!({ "action": "mark_read" }),
            &user.token,
        )
        .await;
    world.last_response = Some(response);
}

#[then(expr = "{string} should have {int} unread message(s) in {string}")]
async fn unread_messages(world: &mut TestWorld, user: String, expected: i64, fpo: String) {
    let user = world.user(&user);
    let fpo_id = world.fpo(&fpo);
    let response = world
        .app()
        .get_as(&format!("/api/v1/fpo/{}/chat", fpo_id), &user.token)
        .await;
    response.assert_ok();

    let chat: serde_json::Value = response.json();
    assert_eq!(chat["unreadCount"], expected);
}

#[then(expr = "{int} message(s) should have been marked")]
async fn messages_marked(world: &mut TestWorld, expected: u64) {
    world.last_response().assert_ok();
    assert_eq!(world.last_json()["markedCount"], expected);
}

#[then(expr = "{string} should see {int} message(s) in {string}")]
async fn sees_messages(world: &mut TestWorld, user: String, expected: u64, fpo: String) {
    let user = world.user(&user);
    let fpo_id = world.fpo(&fpo);
    let page: serde_json::Value = world
        .app()
        .get_as(&format!("/api/v1/fpo/{}/messages", fpo_id), &user.token)
        .await
        .json();
    assert_eq!(page["totalCount"], expected);
}
