//! Membership models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserSummary;

/// Roles the portal knows about. Any other label is stored and counted as-is.
pub const ROLE_MEMBER: &str = "Member";
pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_OWNER: &str = "Owner";

pub const KNOWN_ROLES: [&str; 3] = [ROLE_MEMBER, ROLE_ADMIN, ROLE_OWNER];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub fpo_id: Uuid,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn is_known_role(&self) -> bool {
        KNOWN_ROLES.contains(&self.role.as_str())
    }
}

/// A member of an FPO together with their profile details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetail {
    pub user: UserSummary,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCounts {
    pub total: i64,
    /// Open mapping from role label to member count
    pub by_role: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JoinFpoRequest {
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveFpoRequest {
    #[serde(default)]
    pub fpo_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaveFpoResponse {
    pub success: bool,
    pub removed: u64,
}
