//! Membership repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{now_timestamp, parse_db_timestamp, parse_db_uuid};
use crate::models::{MemberDetail, Membership, UserSummary};

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    id: String,
    user_id: String,
    fpo_id: String,
    role: String,
    joined_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct MemberDetailRow {
    user_id: String,
    email: String,
    display_name: String,
    role: String,
    joined_at: String,
}

pub struct MembershipRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MembershipRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a membership; returns `None` when the pair already exists.
    ///
    /// The `UNIQUE(user_id, fpo_id)` constraint decides, so two concurrent
    /// joins cannot both succeed.
    pub async fn create(&self, user_id: Uuid, fpo_id: Uuid, role: &str) -> Result<Option<Membership>> {
        let id = Uuid::new_v4();

        let result = sqlx::query(
            r#"
            INSERT INTO memberships (id, user_id, fpo_id, role, joined_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (user_id, fpo_id) DO NOTHING
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(fpo_id.to_string())
        .bind(role)
        .bind(now_timestamp())
        .execute(self.pool)
        .await
        .context("Failed to create membership")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(user_id, fpo_id).await
    }

    pub async fn get(&self, user_id: Uuid, fpo_id: Uuid) -> Result<Option<Membership>> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, user_id, fpo_id, role, joined_at
            FROM memberships
            WHERE user_id = ? AND fpo_id = ?
            "#,
        )
        .bind(user_id.to_string())
        .bind(fpo_id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get membership")?;

        row.map(row_to_membership).transpose()
    }

    pub async fn exists(&self, user_id: Uuid, fpo_id: Uuid) -> Result<bool> {
        let found: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM memberships WHERE user_id = ? AND fpo_id = ?")
                .bind(user_id.to_string())
                .bind(fpo_id.to_string())
                .fetch_optional(self.pool)
                .await
                .context("Failed to check membership")?;

        Ok(found.is_some())
    }

    /// Delete every membership row for the pair; returns the number removed
    pub async fn delete(&self, user_id: Uuid, fpo_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM memberships WHERE user_id = ? AND fpo_id = ?")
            .bind(user_id.to_string())
            .bind(fpo_id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to delete membership")?;

        Ok(result.rows_affected())
    }

    /// Members of an FPO with profile details, earliest joiner first
    pub async fn list_members(&self, fpo_id: Uuid) -> Result<Vec<MemberDetail>> {
        let rows = sqlx::query_as::<_, MemberDetailRow>(
            r#"
            SELECT m.user_id, p.email, p.display_name, m.role, m.joined_at
            FROM memberships m
            JOIN profiles p ON p.id = m.user_id
            WHERE m.fpo_id = ?
            ORDER BY m.joined_at ASC, m.rowid ASC
            "#,
        )
        .bind(fpo_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list FPO members")?;

        rows.into_iter()
            .map(|row| -> Result<MemberDetail> {
                Ok(MemberDetail {
                    user: UserSummary {
                        id: parse_db_uuid(&row.user_id)?,
                        email: row.email,
                        display_name: row.display_name,
                    },
                    role: row.role,
                    joined_at: parse_db_timestamp(&row.joined_at)?,
                })
            })
            .collect()
    }

    /// `(role, count)` pairs for every role label present in the FPO
    pub async fn count_by_role(&self, fpo_id: Uuid) -> Result<Vec<(String, i64)>> {
        sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT role, COUNT(*)
            FROM memberships
            WHERE fpo_id = ?
            GROUP BY role
            ORDER BY role
            "#,
        )
        .bind(fpo_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to count FPO members by role")
    }

    /// The user's memberships, most recently joined first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Membership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, user_id, fpo_id, role, joined_at
            FROM memberships
            WHERE user_id = ?
            ORDER BY joined_at DESC, rowid DESC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list user memberships")?;

        rows.into_iter().map(row_to_membership).collect()
    }
}

fn row_to_membership(row: MembershipRow) -> Result<Membership> {
    Ok(Membership {
        id: parse_db_uuid(&row.id)?,
        user_id: parse_db_uuid(&row.user_id)?,
        fpo_id: parse_db_uuid(&row.fpo_id)?,
        role: row.role,
        joined_at: parse_db_timestamp(&row.joined_at)?,
    })
}
