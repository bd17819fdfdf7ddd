//! Chat overview and read-state endpoints (members only)

use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::extract::parse_json_body;
use crate::{
    middleware::CurrentProfile,
    models::{ChatActionRequest, ChatDetail, MarkReadResponse, MARK_READ_ACTION},
    utils::{validation::parse_fpo_path_id, AppError},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/fpo/{id}/chat", get(get_chat).post(chat_action))
}

async fn get_chat(
    State(state): State<AppState>,
    profile: CurrentProfile,
    Path(id): Path<String>,
) -> Result<Json<ChatDetail>, AppError> {
    let fpo_id = parse_fpo_path_id(&id)?;
    Ok(Json(state.read_state.chat_detail(fpo_id, profile.id()).await?))
}

/// Only `{"action": "mark_read"}` is supported
async fn chat_action(
    State(state): State<AppState>,
    profile: CurrentProfile,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<MarkReadResponse>, AppError> {
    let fpo_id = parse_fpo_path_id(&id)?;
    state.fpos.require_exists(fpo_id).await?;
    state.access.require(profile.id(), fpo_id).await?;

    let req: ChatActionRequest = parse_json_body(&body)?;
    if req.action.as_deref() != Some(MARK_READ_ACTION) {
        return Err(AppError::invalid_input("Invalid action"));
    }

    let marked_count = state.read_state.mark_all_read(fpo_id, profile.id()).await?;
    Ok(Json(MarkReadResponse {
        success: true,
        marked_count,
    }))
}
