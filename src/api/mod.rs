//! API routes and handlers
//!
//! This module defines all API endpoints and their routing. Everything is
//! mounted under `/api/v1` by [`crate::create_router`].

use axum::{middleware::from_fn_with_state, Router};

use crate::{
    middleware::{optional_session_middleware, session_middleware},
    utils::AppError,
    AppState,
};

mod chat;
mod extract;
mod fpo;
mod health;
mod members;
mod messages;
mod user;

pub use extract::ApiJson;
pub use health::{HealthResponse, ReadinessResponse};

/// Public API routes (no session required)
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(fpo::public_routes())
        .merge(members::routes())
}

/// Protected API routes (session required)
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .merge(fpo::protected_routes())
        .merge(messages::routes())
        .merge(chat::routes())
        .merge(user::routes())
}

/// Public and protected routes with their session middleware applied
pub fn routes(state: AppState) -> Router<AppState> {
    public_routes()
        .route_layer(from_fn_with_state(
            state.clone(),
            optional_session_middleware,
        ))
        .merge(
            protected_routes().route_layer(from_fn_with_state(state, session_middleware)),
        )
}

/// Fallback for paths no route matches
pub async fn not_found() -> AppError {
    AppError::RouteNotFound
}

/// Fallback for a known path requested with an unsupported method
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
