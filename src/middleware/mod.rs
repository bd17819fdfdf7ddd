//! Middleware components
//!
//! This module contains middleware for:
//! - Session authentication (provider-issued JWTs)
//! - Rate limiting

pub mod auth;
pub mod rate_limit;

pub use auth::{
    optional_session_middleware, session_middleware, AuthError, Claims, CurrentProfile,
};
pub use rate_limit::{rate_limit_middleware, RateLimitConfig, RateLimitState};
