//! Read-state tracker: unread counts, mark-all-read and chat previews

use sqlx::{Pool, Sqlite};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{store_error, ChatAccessGate, FpoService};
use crate::db::{FpoRepository, MembershipRepository, MessageRepository};
use crate::models::{ChatDetail, ChatSummary};
use crate::utils::AppError;

#[derive(Clone)]
pub struct ReadStateService {
    db: Pool<Sqlite>,
    fpos: FpoService,
    gate: ChatAccessGate,
}

impl ReadStateService {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self {
            fpos: FpoService::new(db.clone()),
            gate: ChatAccessGate::new(db.clone()),
            db,
        }
    }

    /// Messages in the FPO the user has not read yet
    pub async fn unread_count(&self, fpo_id: Uuid, user_id: Uuid) -> Result<i64, AppError> {
        self.gate.require(user_id, fpo_id).await?;

        MessageRepository::new(&self.db)
            .count_unread(fpo_id, user_id)
            .await
            .map_err(store_error)
    }

    /// Add the user to the read-set of every message in the FPO.
    ///
    /// Returns the number of messages newly marked; an immediate second call
    /// returns 0. Other users' read state is untouched.
    pub async fn mark_all_read(&self, fpo_id: Uuid, user_id: Uuid) -> Result<u64, AppError> {
        self.fpos.require_exists(fpo_id).await?;
        self.gate.require(user_id, fpo_id).await?;

        let marked = MessageRepository::new(&self.db)
            .mark_all_read(fpo_id, user_id)
            .await
            .map_err(store_error)?;

        info!(%fpo_id, %user_id, marked, "Marked chat as read");
        Ok(marked)
    }

    /// One preview per FPO the user belongs to, most recent activity first.
    ///
    /// Activity is the last message time, or the FPO creation time for a
    /// chat without messages.
    pub async fn chat_summaries(&self, user_id: Uuid) -> Result<Vec<ChatSummary>, AppError> {
        let memberships = MembershipRepository::new(&self.db)
            .list_for_user(user_id)
            .await
            .map_err(store_error)?;

        let fpo_repo = FpoRepository::new(&self.db);
        let message_repo = MessageRepository::new(&self.db);
        let mut summaries = Vec::with_capacity(memberships.len());

        for membership in memberships {
            let Some(fpo) = fpo_repo
                .get_by_id(membership.fpo_id)
                .await
                .map_err(store_error)?
            else {
                warn!(fpo_id = %membership.fpo_id, "Membership references a missing FPO");
                continue;
            };

            let last_message = message_repo.latest(fpo.id).await.map_err(store_error)?;
            let unread_count = message_repo
                .count_unread(fpo.id, user_id)
                .await
                .map_err(store_error)?;

            summaries.push(ChatSummary {
                fpo_id: fpo.id,
                name: fpo.name,
                description: fpo.description,
                location: fpo.location,
                last_message,
                unread_count,
                joined_at: membership.joined_at,
                member_role: membership.role,
                created_at: fpo.created_at,
            });
        }

        // Stable sort keeps join order for equal timestamps
        summaries.sort_by(|a, b| b.activity_at().cmp(&a.activity_at()));

        debug!(%user_id, chats = summaries.len(), "Built chat summaries");
        Ok(summaries)
    }

    /// Chat metadata for a member: roster, last message and unread count
    pub async fn chat_detail(&self, fpo_id: Uuid, user_id: Uuid) -> Result<ChatDetail, AppError> {
        let fpo = self.fpos.get(fpo_id).await?;
        let unread_count = self.unread_count(fpo_id, user_id).await?;

        let members = MembershipRepository::new(&self.db)
            .list_members(fpo_id)
            .await
            .map_err(store_error)?;
        let last_message = MessageRepository::new(&self.db)
            .latest(fpo_id)
            .await
            .map_err(store_error)?;

        Ok(ChatDetail {
            id: fpo.id,
            name: fpo.name,
            location: fpo.location,
            description: fpo.description,
            member_count: members.len() as i64,
            members,
            last_message,
            unread_count,
            created_at: fpo.created_at,
        })
    }
}
