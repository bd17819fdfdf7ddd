//! FPO directory

use sqlx::{Pool, Sqlite};
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::store_error;
use crate::db::FpoRepository;
use crate::models::{CreateFpoRequest, Fpo, FpoSummary};
use crate::utils::AppError;

#[derive(Clone)]
pub struct FpoService {
    db: Pool<Sqlite>,
}

impl FpoService {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Every FPO with its member count, newest first
    pub async fn list(&self) -> Result<Vec<FpoSummary>, AppError> {
        let fpos = FpoRepository::new(&self.db)
            .list_with_member_counts()
            .await
            .map_err(store_error)?;
        debug!(count = fpos.len(), "Listed FPOs");
        Ok(fpos)
    }

    pub async fn create(&self, req: &CreateFpoRequest) -> Result<Fpo, AppError> {
        req.validate()?;

        let fpo = FpoRepository::new(&self.db)
            .create(req)
            .await
            .map_err(store_error)?;
        info!(fpo_id = %fpo.id, name = %fpo.name, "FPO created");
        Ok(fpo)
    }

    pub async fn get(&self, fpo_id: Uuid) -> Result<Fpo, AppError> {
        FpoRepository::new(&self.db)
            .get_by_id(fpo_id)
            .await
            .map_err(store_error)?
            .ok_or_else(AppError::fpo_not_found)
    }

    pub async fn require_exists(&self, fpo_id: Uuid) -> Result<(), AppError> {
        let exists = FpoRepository::new(&self.db)
            .exists(fpo_id)
            .await
            .map_err(store_error)?;
        if exists {
            Ok(())
        } else {
            Err(AppError::fpo_not_found())
        }
    }
}
