//! Message store: sending and paging through FPO chat history

use sqlx::{Pool, Sqlite};
use tracing::{debug, info};
use uuid::Uuid;

use super::{store_error, ChatAccessGate, FpoService};
use crate::db::MessageRepository;
use crate::models::{Message, MessagePage};
use crate::utils::{validation::validate_message_content, AppError};

#[derive(Clone)]
pub struct MessageService {
    db: Pool<Sqlite>,
    fpos: FpoService,
    gate: ChatAccessGate,
}

impl MessageService {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self {
            fpos: FpoService::new(db.clone()),
            gate: ChatAccessGate::new(db.clone()),
            db,
        }
    }

    /// Post a message as `author_id`.
    ///
    /// The content is stored exactly as given; it only has to contain some
    /// non-whitespace text.
    pub async fn send(&self, fpo_id: Uuid, author_id: Uuid, content: &str) -> Result<Message, AppError> {
        self.fpos.require_exists(fpo_id).await?;
        self.gate.require(author_id, fpo_id).await?;
        validate_message_content(content)?;

        let message = MessageRepository::new(&self.db)
            .insert(fpo_id, author_id, content)
            .await
            .map_err(store_error)?;

        info!(%fpo_id, user_id = %author_id, message_id = %message.id, "Message sent");
        Ok(message)
    }

    /// Page `page` (1-based) of size `limit`.
    ///
    /// Pages are cut from the newest message backwards, and each page is
    /// returned oldest first.
    pub async fn list(
        &self,
        fpo_id: Uuid,
        requester_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<MessagePage, AppError> {
        self.fpos.require_exists(fpo_id).await?;
        self.gate.require(requester_id, fpo_id).await?;

        let page = page.max(1);
        let limit = limit.max(1);
        let repo = MessageRepository::new(&self.db);

        let total_count = repo.count(fpo_id).await.map_err(store_error)?;
        let offset = i64::from(page - 1).saturating_mul(i64::from(limit));

        let mut messages = repo
            .list_page(fpo_id, i64::from(limit), offset)
            .await
            .map_err(store_error)?;
        messages.reverse();

        let total_pages = (total_count + i64::from(limit) - 1) / i64::from(limit);
        debug!(%fpo_id, page, limit, total_count, "Listed messages");

        Ok(MessagePage {
            messages,
            current_page: page,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
            total_count,
        })
    }

    /// Full history, oldest first, when `viewer` is a member; `None` otherwise.
    ///
    /// Membership is checked once, so a viewer who leaves mid-request simply
    /// gets no history instead of an error.
    pub async fn visible_history(
        &self,
        fpo_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<Option<Vec<Message>>, AppError> {
        let Some(viewer) = viewer else {
            return Ok(None);
        };
        if !self.gate.authorize(viewer, fpo_id).await {
            return Ok(None);
        }

        MessageRepository::new(&self.db)
            .list_all(fpo_id)
            .await
            .map(Some)
            .map_err(store_error)
    }
}
