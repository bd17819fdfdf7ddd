//! Samuday Shakti library
//!
//! FPO membership and group chat for the Krishi Sahayak farmer portal:
//! identity resolution, membership, chat messages, membership-gated access
//! and per-user read state, served as a JSON API.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    Router,
};
use chrono::{DateTime, Utc};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
pub use middleware::{session_middleware, Claims, CurrentProfile};
use services::{
    ChatAccessGate, FpoService, IdentityResolver, MembershipService, MessageService,
    ReadStateService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
    pub identity: Arc<IdentityResolver>,
    pub fpos: Arc<FpoService>,
    pub memberships: Arc<MembershipService>,
    pub messages: Arc<MessageService>,
    pub access: Arc<ChatAccessGate>,
    pub read_state: Arc<ReadStateService>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wire every service to the shared pool
    pub fn new(config: AppConfig, db: DbPool) -> Self {
        Self {
            identity: Arc::new(IdentityResolver::new(db.clone())),
            fpos: Arc::new(FpoService::new(db.clone())),
            memberships: Arc::new(MembershipService::new(db.clone())),
            messages: Arc::new(MessageService::new(db.clone())),
            access: Arc::new(ChatAccessGate::new(db.clone())),
            read_state: Arc::new(ReadStateService::new(db.clone())),
            started_at: Utc::now(),
            config,
            db,
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let config = &state.config;

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let mut api = api::routes(state.clone());

    if config.rate_limit.enabled {
        let rate_limit =
            middleware::RateLimitState::new(middleware::RateLimitConfig::from(&config.rate_limit));
        middleware::rate_limit::spawn_rate_limit_cleanup(rate_limit.clone());
        api = api.layer(axum::middleware::from_fn_with_state(
            rate_limit,
            middleware::rate_limit_middleware,
        ));
    }

    Router::new()
        .nest("/api/v1", api)
        .fallback(api::not_found)
        .method_not_allowed_fallback(api::method_not_allowed)
        .with_state(state.clone())
        .layer(CompressionLayer::new())
        .layer(trace_layer)
        .layer(cors_layer(&state.config.server.cors_allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(origins)
}
