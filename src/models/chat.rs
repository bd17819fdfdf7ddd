//! Chat overview models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MemberDetail, Message};

/// Action name accepted by the chat mark-read endpoint
pub const MARK_READ_ACTION: &str = "mark_read";

/// Preview of one of the caller's FPO chats
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub fpo_id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub last_message: Option<Message>,
    pub unread_count: i64,
    pub joined_at: DateTime<Utc>,
    pub member_role: String,
    pub created_at: DateTime<Utc>,
}

impl ChatSummary {
    /// Timestamp used to order chat previews
    pub fn activity_at(&self) -> DateTime<Utc> {
        self.last_message
            .as_ref()
            .map(|m| m.created_at)
            .unwrap_or(self.created_at)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDetail {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub description: String,
    pub member_count: i64,
    pub members: Vec<MemberDetail>,
    pub last_message: Option<Message>,
    pub unread_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatActionRequest {
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub success: bool,
    pub marked_count: u64,
}
