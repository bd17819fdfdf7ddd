//! Membership store: joining, leaving and listing FPO members

use sqlx::{Pool, Sqlite};
use tracing::{debug, info};
use uuid::Uuid;

use super::{store_error, FpoService};
use crate::db::{FpoRepository, MembershipRepository, ProfileRepository};
use crate::models::{FpoSummary, MemberCounts, MemberDetail, Membership};
use crate::utils::{validation::normalize_role, AppError, Resource};

#[derive(Clone)]
pub struct MembershipService {
    db: Pool<Sqlite>,
    fpos: FpoService,
}

impl MembershipService {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self {
            fpos: FpoService::new(db.clone()),
            db,
        }
    }

    /// Add the user to the FPO.
    ///
    /// `role` defaults to `Member`. A second join for the same pair fails with
    /// `AlreadyMember`, including when two joins race.
    pub async fn join(
        &self,
        user_id: Uuid,
        fpo_id: Uuid,
        role: Option<&str>,
    ) -> Result<Membership, AppError> {
        self.fpos.require_exists(fpo_id).await?;

        let user_exists = ProfileRepository::new(&self.db)
            .exists(user_id)
            .await
            .map_err(store_error)?;
        if !user_exists {
            return Err(AppError::NotFound(Resource::User));
        }

        let role = normalize_role(role)?;

        let membership = MembershipRepository::new(&self.db)
            .create(user_id, fpo_id, &role)
            .await
            .map_err(store_error)?
            .ok_or(AppError::AlreadyMember)?;

        if !membership.is_known_role() {
            debug!(role = %membership.role, "Membership created with custom role");
        }
        info!(%user_id, %fpo_id, role = %membership.role, "User joined FPO");
        Ok(membership)
    }

    /// Remove the user from the FPO; succeeds even when nothing was removed
    pub async fn leave(&self, user_id: Uuid, fpo_id: Uuid) -> Result<u64, AppError> {
        let removed = MembershipRepository::new(&self.db)
            .delete(user_id, fpo_id)
            .await
            .map_err(store_error)?;

        info!(%user_id, %fpo_id, removed, "User left FPO");
        Ok(removed)
    }

    pub async fn list_members(&self, fpo_id: Uuid) -> Result<Vec<MemberDetail>, AppError> {
        self.fpos.require_exists(fpo_id).await?;

        MembershipRepository::new(&self.db)
            .list_members(fpo_id)
            .await
            .map_err(store_error)
    }

    /// FPOs the user belongs to, newest FPO first
    pub async fn list_joined_fpos(&self, user_id: Uuid) -> Result<Vec<FpoSummary>, AppError> {
        FpoRepository::new(&self.db)
            .list_joined_by(user_id)
            .await
            .map_err(store_error)
    }

    pub async fn count_members(&self, fpo_id: Uuid) -> Result<MemberCounts, AppError> {
        self.fpos.require_exists(fpo_id).await?;

        let by_role = MembershipRepository::new(&self.db)
            .count_by_role(fpo_id)
            .await
            .map_err(store_error)?;

        let mut counts = MemberCounts::default();
        for (role, count) in by_role {
            counts.total += count;
            *counts.by_role.entry(role).or_insert(0) += count;
        }
        Ok(counts)
    }
}
