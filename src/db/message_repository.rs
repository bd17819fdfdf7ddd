//! Message repository
//!
//! Messages are append-only. The read-set of a message is the set of
//! `message_reads` rows that reference it.

use std::collections::HashMap;

use anyhow::{Context, Result};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use super::{now_timestamp, parse_db_timestamp, parse_db_uuid};
use crate::models::{Message, UserSummary};

const MESSAGE_COLUMNS: &str = r#"
    SELECT m.id, m.fpo_id, m.author_id, p.email AS author_email,
           p.display_name AS author_display_name, m.content, m.created_at
    FROM messages m
    JOIN profiles p ON p.id = m.author_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: String,
    fpo_id: String,
    author_id: String,
    author_email: String,
    author_display_name: String,
    content: String,
    created_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ReadRow {
    message_id: String,
    user_id: String,
}

pub struct MessageRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MessageRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a message with an empty read-set
    pub async fn insert(&self, fpo_id: Uuid, author_id: Uuid, content: &str) -> Result<Message> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO messages (id, fpo_id, author_id, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(fpo_id.to_string())
        .bind(author_id.to_string())
        .bind(content)
        .bind(now_timestamp())
        .execute(self.pool)
        .await
        .context("Failed to insert message")?;

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve inserted message")
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Message>> {
        let sql = format!("{} WHERE m.id = ?", MESSAGE_COLUMNS);
        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(self.pool)
            .await
            .context("Failed to get message")?;

        match row {
            Some(row) => Ok(self.with_readers(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// One page of messages, newest first
    pub async fn list_page(&self, fpo_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Message>> {
        let sql = format!(
            "{} WHERE m.fpo_id = ? ORDER BY m.created_at DESC, m.rowid DESC LIMIT ? OFFSET ?",
            MESSAGE_COLUMNS
        );
        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(fpo_id.to_string())
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await
            .context("Failed to list messages")?;

        self.with_readers(rows).await
    }

    /// Full history of an FPO, oldest first
    pub async fn list_all(&self, fpo_id: Uuid) -> Result<Vec<Message>> {
        let sql = format!(
            "{} WHERE m.fpo_id = ? ORDER BY m.created_at ASC, m.rowid ASC",
            MESSAGE_COLUMNS
        );
        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(fpo_id.to_string())
            .fetch_all(self.pool)
            .await
            .context("Failed to list messages")?;

        self.with_readers(rows).await
    }

    pub async fn latest(&self, fpo_id: Uuid) -> Result<Option<Message>> {
        Ok(self.list_page(fpo_id, 1, 0).await?.pop())
    }

    pub async fn count(&self, fpo_id: Uuid) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE fpo_id = ?")
            .bind(fpo_id.to_string())
            .fetch_one(self.pool)
            .await
            .context("Failed to count messages")?;

        Ok(count)
    }

    /// Messages in the FPO whose read-set does not contain the user
    pub async fn count_unread(&self, fpo_id: Uuid, user_id: Uuid) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM messages m
            WHERE m.fpo_id = ?
              AND NOT EXISTS (
                  SELECT 1 FROM message_reads r
                  WHERE r.message_id = m.id AND r.user_id = ?
              )
            "#,
        )
        .bind(fpo_id.to_string())
        .bind(user_id.to_string())
        .fetch_one(self.pool)
        .await
        .context("Failed to count unread messages")?;

        Ok(count)
    }

    /// Add the user to the read-set of every message in the FPO.
    ///
    /// Returns how many read-sets actually grew. Runs as one statement in one
    /// transaction, so a repeated or concurrent call reports only the rows it
    /// inserted itself.
    pub async fn mark_all_read(&self, fpo_id: Uuid, user_id: Uuid) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start mark-read transaction")?;

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO message_reads (message_id, user_id, read_at)
            SELECT m.id, ?, ?
            FROM messages m
            WHERE m.fpo_id = ?
              AND NOT EXISTS (
                  SELECT 1 FROM message_reads r
                  WHERE r.message_id = m.id AND r.user_id = ?
              )
            "#,
        )
        .bind(user_id.to_string())
        .bind(now_timestamp())
        .bind(fpo_id.to_string())
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to mark messages as read")?;

        tx.commit()
            .await
            .context("Failed to commit mark-read transaction")?;

        Ok(result.rows_affected())
    }

    async fn with_readers(&self, rows: Vec<MessageRow>) -> Result<Vec<Message>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT message_id, user_id FROM message_reads WHERE message_id IN (");
        let mut ids = builder.separated(", ");
        for row in &rows {
            ids.push_bind(row.id.clone());
        }
        ids.push_unseparated(") ORDER BY read_at ASC, rowid ASC");

        let reads = builder
            .build_query_as::<ReadRow>()
            .fetch_all(self.pool)
            .await
            .context("Failed to load message read-sets")?;

        let mut readers: HashMap<String, Vec<Uuid>> = HashMap::new();
        for read in reads {
            readers
                .entry(read.message_id)
                .or_default()
                .push(parse_db_uuid(&read.user_id)?);
        }

        rows.into_iter()
            .map(|row| {
                let read_by = readers.remove(&row.id).unwrap_or_default();
                row_to_message(row, read_by)
            })
            .collect()
    }
}

fn row_to_message(row: MessageRow, read_by: Vec<Uuid>) -> Result<Message> {
    Ok(Message {
        id: parse_db_uuid(&row.id)?,
        fpo_id: parse_db_uuid(&row.fpo_id)?,
        author: UserSummary {
            id: parse_db_uuid(&row.author_id)?,
            email: row.author_email,
            display_name: row.author_display_name,
        },
        content: row.content,
        created_at: parse_db_timestamp(&row.created_at)
            .with_context(|| format!("Message {} has a corrupt timestamp", row.id))?,
        read_by,
    })
}
