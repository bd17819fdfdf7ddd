//! FPO directory and membership endpoints

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::extract::ApiJson;
use crate::{
    middleware::CurrentProfile,
    models::{
        CreateFpoRequest, Fpo, FpoDetail, FpoSummary, JoinFpoRequest, LeaveFpoRequest,
        LeaveFpoResponse, Membership,
    },
    utils::{validation::parse_fpo_path_id, AppError},
    AppState,
};

/// Routes open to anonymous callers
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/fpo", get(list_fpos))
        .route("/fpo/new", post(create_fpo))
        .route("/fpo/{id}", get(get_fpo))
}

/// Routes that need a session
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/fpo/joined", get(list_joined_fpos))
        .route("/fpo/leave", post(leave_fpo))
        .route("/fpo/{id}/join", post(join_fpo))
}

async fn list_fpos(State(state): State<AppState>) -> Result<Json<Vec<FpoSummary>>, AppError> {
    let fpos = state.fpos.list().await?;
    if fpos.is_empty() {
        return Err(AppError::fpo_not_found());
    }
    Ok(Json(fpos))
}

async fn create_fpo(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateFpoRequest>,
) -> Result<(StatusCode, Json<Fpo>), AppError> {
    let fpo = state.fpos.create(&req).await?;
    Ok((StatusCode::CREATED, Json(fpo)))
}

/// FPO details with its roster; chat history only for members
async fn get_fpo(
    State(state): State<AppState>,
    viewer: Option<CurrentProfile>,
    Path(id): Path<String>,
) -> Result<Json<FpoDetail>, AppError> {
    let fpo_id = parse_fpo_path_id(&id)?;
    let fpo = state.fpos.get(fpo_id).await?;
    let members = state.memberships.list_members(fpo_id).await?;

    let messages = state
        .messages
        .visible_history(fpo_id, viewer.map(|v| v.id()))
        .await?;

    Ok(Json(FpoDetail {
        id: fpo.id,
        name: fpo.name,
        location: fpo.location,
        description: fpo.description,
        created_at: fpo.created_at,
        member_count: members.len() as i64,
        members,
        messages,
    }))
}

async fn list_joined_fpos(
    State(state): State<AppState>,
    profile: CurrentProfile,
) -> Result<Json<Vec<FpoSummary>>, AppError> {
    let fpos = state.memberships.list_joined_fpos(profile.id()).await?;
    Ok(Json(fpos))
}

/// The body is optional; an empty body joins with the default role
async fn join_fpo(
    State(state): State<AppState>,
    profile: CurrentProfile,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Membership>), AppError> {
    let fpo_id = parse_fpo_path_id(&id)?;

    let req: JoinFpoRequest = if body.iter().all(u8::is_ascii_whitespace) {
        JoinFpoRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };

    let membership = state
        .memberships
        .join(profile.id(), fpo_id, req.role.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

async fn leave_fpo(
    State(state): State<AppState>,
    profile: CurrentProfile,
    ApiJson(req): ApiJson<LeaveFpoRequest>,
) -> Result<Json<LeaveFpoResponse>, AppError> {
    let raw = req
        .fpo_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::invalid_input("FPO ID is required"))?;
    let fpo_id =
        Uuid::parse_str(raw).map_err(|_| AppError::invalid_input("Invalid FPO ID"))?;

    let removed = state.memberships.leave(profile.id(), fpo_id).await?;
    Ok(Json(LeaveFpoResponse {
        success: true,
        removed,
    }))
}
