//! Current-user endpoints: profile registration and chat previews

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use validator::Validate;

use super::extract::ApiJson;
use crate::{
    middleware::CurrentProfile,
    models::{ChatSummary, CreateProfileRequest, Profile, SessionUser},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/chats", get(list_chats))
        .route("/user/profile", get(get_profile).post(register_profile))
}

async fn list_chats(
    State(state): State<AppState>,
    profile: CurrentProfile,
) -> Result<Json<Vec<ChatSummary>>, AppError> {
    Ok(Json(state.read_state.chat_summaries(profile.id()).await?))
}

async fn get_profile(profile: CurrentProfile) -> Json<Profile> {
    Json(profile.0)
}

/// Create the caller's profile on first sign-in; 200 if it already exists
async fn register_profile(
    State(state): State<AppState>,
    session: SessionUser,
    ApiJson(req): ApiJson<CreateProfileRequest>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    req.validate()?;

    let (profile, created) = state
        .identity
        .ensure_profile(&session, &req.display_name)
        .await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(profile)))
}
