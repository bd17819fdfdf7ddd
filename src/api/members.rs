//! FPO member listing endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{
    models::{MemberCounts, MemberDetail},
    utils::{validation::parse_fpo_path_id, AppError},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fpo/{id}/members", get(list_members))
        .route("/fpo/{id}/members/count", get(count_members))
}

async fn list_members(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MemberDetail>>, AppError> {
    let fpo_id = parse_fpo_path_id(&id)?;
    Ok(Json(state.memberships.list_members(fpo_id).await?))
}

async fn count_members(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MemberCounts>, AppError> {
    let fpo_id = parse_fpo_path_id(&id)?;
    Ok(Json(state.memberships.count_members(fpo_id).await?))
}
