//! Chat access gate
//!
//! Membership is checked against the store on every call and never cached.
//! Any lookup failure denies access.

use sqlx::{Pool, Sqlite};
use tracing::{error, warn};
use uuid::Uuid;

use crate::db::MembershipRepository;
use crate::utils::AppError;

#[derive(Clone)]
pub struct ChatAccessGate {
    db: Pool<Sqlite>,
}

impl ChatAccessGate {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// True iff a membership row exists for exactly this (user, FPO) pair
    pub async fn authorize(&self, user_id: Uuid, fpo_id: Uuid) -> bool {
        match MembershipRepository::new(&self.db).exists(user_id, fpo_id).await {
            Ok(is_member) => is_member,
            Err(e) => {
                let detail = format!("{:#}", e);
                error!(error = %detail, %user_id, %fpo_id, "Membership lookup failed, denying chat access");
                false
            }
        }
    }

    /// Fail with `AccessDenied` unless the user is a member of the FPO
    pub async fn require(&self, user_id: Uuid, fpo_id: Uuid) -> Result<(), AppError> {
        if self.authorize(user_id, fpo_id).await {
            Ok(())
        } else {
            warn!(%user_id, %fpo_id, "Chat access denied");
            Err(AppError::AccessDenied)
        }
    }
}
