//! FPO repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{now_timestamp, parse_db_timestamp, parse_db_uuid};
use crate::models::{CreateFpoRequest, Fpo, FpoSummary};

#[derive(Debug, sqlx::FromRow)]
struct FpoRow {
    id: String,
    name: String,
    location: String,
    description: String,
    created_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct FpoSummaryRow {
    id: String,
    name: String,
    location: String,
    description: String,
    created_at: String,
    member_count: i64,
}

pub struct FpoRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FpoRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All FPOs with member counts, newest first
    pub async fn list_with_member_counts(&self) -> Result<Vec<FpoSummary>> {
        let rows = sqlx::query_as::<_, FpoSummaryRow>(
            r#"
            SELECT f.id, f.name, f.location, f.description, f.created_at,
                   (SELECT COUNT(*) FROM memberships m WHERE m.fpo_id = f.id) AS member_count
            FROM fpos f
            ORDER BY f.created_at DESC, f.rowid DESC
            "#,
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to list FPOs")?;

        rows.into_iter().map(row_to_summary).collect()
    }

    /// FPOs the user belongs to, newest FPO first
    pub async fn list_joined_by(&self, user_id: Uuid) -> Result<Vec<FpoSummary>> {
        let rows = sqlx::query_as::<_, FpoSummaryRow>(
            r#"
            SELECT f.id, f.name, f.location, f.description, f.created_at,
                   (SELECT COUNT(*) FROM memberships c WHERE c.fpo_id = f.id) AS member_count
            FROM fpos f
            JOIN memberships m ON m.fpo_id = f.id
            WHERE m.user_id = ?
            ORDER BY f.created_at DESC, f.rowid DESC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list joined FPOs")?;

        rows.into_iter().map(row_to_summary).collect()
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Fpo>> {
        let row = sqlx::query_as::<_, FpoRow>(
            r#"
            SELECT id, name, location, description, created_at
            FROM fpos
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get FPO")?;

        row.map(row_to_fpo).transpose()
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM fpos WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool)
            .await
            .context("Failed to check FPO")?;

        Ok(found.is_some())
    }

    pub async fn create(&self, req: &CreateFpoRequest) -> Result<Fpo> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO fpos (id, name, location, description, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(req.name.trim())
        .bind(req.location.trim())
        .bind(req.description.trim())
        .bind(now_timestamp())
        .execute(self.pool)
        .await
        .context("Failed to create FPO")?;

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created FPO")
    }
}

fn row_to_fpo(row: FpoRow) -> Result<Fpo> {
    Ok(Fpo {
        id: parse_db_uuid(&row.id)?,
        name: row.name,
        location: row.location,
        description: row.description,
        created_at: parse_db_timestamp(&row.created_at)?,
    })
}

fn row_to_summary(row: FpoSummaryRow) -> Result<FpoSummary> {
    Ok(FpoSummary {
        id: parse_db_uuid(&row.id)?,
        name: row.name,
        location: row.location,
        description: row.description,
        created_at: parse_db_timestamp(&row.created_at)?,
        member_count: row.member_count,
    })
}
