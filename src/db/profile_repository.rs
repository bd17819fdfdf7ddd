//! Profile repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{now_timestamp, parse_db_timestamp, parse_db_uuid};
use crate::models::Profile;

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: String,
    email: String,
    display_name: String,
    created_at: String,
}

pub struct ProfileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, email: &str, display_name: &str) -> Result<Profile> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, display_name, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(email.trim())
        .bind(display_name.trim())
        .bind(now_timestamp())
        .execute(self.pool)
        .await
        .context("Failed to create profile")?;

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created profile")
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, email, display_name, created_at
            FROM profiles
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get profile")?;

        row.map(row_to_profile).transpose()
    }

    /// Case-insensitive lookup; the `email` column is declared `COLLATE NOCASE`
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, email, display_name, created_at
            FROM profiles
            WHERE email = ?
            "#,
        )
        .bind(email.trim())
        .fetch_optional(self.pool)
        .await
        .context("Failed to look up profile by email")?;

        row.map(row_to_profile).transpose()
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM profiles WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool)
            .await
            .context("Failed to check profile")?;

        Ok(found.is_some())
    }
}

fn row_to_profile(row: ProfileRow) -> Result<Profile> {
    Ok(Profile {
        id: parse_db_uuid(&row.id)?,
        email: row.email,
        display_name: row.display_name,
        created_at: parse_db_timestamp(&row.created_at)?,
    })
}
