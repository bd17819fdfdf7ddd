//! FPO chat message endpoints (members only)

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::extract::parse_json_body;
use crate::{
    middleware::CurrentProfile,
    models::{MessagePage, PageQuery, SendMessageRequest, SendMessageResponse},
    utils::{
        validation::{parse_fpo_path_id, parse_positive_or, DEFAULT_PAGE, DEFAULT_PAGE_SIZE},
        AppError,
    },
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/fpo/{id}/messages", get(list_messages).post(send_message))
}

async fn list_messages(
    State(state): State<AppState>,
    profile: CurrentProfile,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MessagePage>, AppError> {
    let fpo_id = parse_fpo_path_id(&id)?;
    let page = parse_positive_or(query.page.as_deref(), DEFAULT_PAGE);
    let limit = parse_positive_or(query.limit.as_deref(), DEFAULT_PAGE_SIZE);

    let result = state
        .messages
        .list(fpo_id, profile.id(), page, limit)
        .await?;
    Ok(Json(result))
}

async fn send_message(
    State(state): State<AppState>,
    profile: CurrentProfile,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<SendMessageResponse>), AppError> {
    let fpo_id = parse_fpo_path_id(&id)?;
    state.fpos.require_exists(fpo_id).await?;
    state.access.require(profile.id(), fpo_id).await?;

    let req: SendMessageRequest = parse_json_body(&body)?;

    let message = state
        .messages
        .send(fpo_id, profile.id(), &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(SendMessageResponse { message })))
}
