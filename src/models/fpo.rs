//! Farmer Producer Organization models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{MemberDetail, Message};
use crate::utils::validation::not_blank;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fpo {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// FPO listing entry with its current member count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FpoSummary {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub member_count: i64,
}

/// Full FPO view; `messages` is only filled in for members
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FpoDetail {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub member_count: i64,
    pub members: Vec<MemberDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateFpoRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub location: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub description: String,
}
