//! Identity resolver: session email to internal profile

use sqlx::{Pool, Sqlite};
use tracing::{debug, info};

use super::store_error;
use crate::db::ProfileRepository;
use crate::models::{Profile, SessionUser};
use crate::utils::{AppError, Resource};

#[derive(Clone)]
pub struct IdentityResolver {
    db: Pool<Sqlite>,
}

impl IdentityResolver {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Resolve the profile behind a session.
    ///
    /// Email matching is case-insensitive everywhere.
    pub async fn resolve(&self, session: Option<&SessionUser>) -> Result<Profile, AppError> {
        let session = session.ok_or(AppError::Unauthenticated)?;

        let profile = ProfileRepository::new(&self.db)
            .find_by_email(&session.email)
            .await
            .map_err(store_error)?;

        match profile {
            Some(profile) => Ok(profile),
            None => {
                debug!(subject = %session.subject, "No profile for session email");
                Err(AppError::NotFound(Resource::Profile))
            }
        }
    }

    /// Like [`resolve`](Self::resolve) but anonymous callers and callers
    /// without a profile yield `None`.
    pub async fn resolve_optional(
        &self,
        session: Option<&SessionUser>,
    ) -> Result<Option<Profile>, AppError> {
        match self.resolve(session).await {
            Ok(profile) => Ok(Some(profile)),
            Err(AppError::Unauthenticated) | Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create the profile for a session if it does not exist yet.
    ///
    /// Returns the profile and whether it was created by this call.
    pub async fn ensure_profile(
        &self,
        session: &SessionUser,
        display_name: &str,
    ) -> Result<(Profile, bool), AppError> {
        let repo = ProfileRepository::new(&self.db);

        if let Some(existing) = repo.find_by_email(&session.email).await.map_err(store_error)? {
            return Ok((existing, false));
        }

        match repo.create(&session.email, display_name).await {
            Ok(profile) => {
                info!(user_id = %profile.id, "Profile created");
                Ok((profile, true))
            }
            // Lost a race against a concurrent registration for the same email
            Err(create_err) => match repo.find_by_email(&session.email).await.map_err(store_error)? {
                Some(existing) => Ok((existing, false)),
                None => Err(store_error(create_err)),
            },
        }
    }
}
