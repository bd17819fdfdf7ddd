//! Per-client rate limiting
//!
//! One keyed `governor` limiter tracks every client address. Requests that
//! carry no peer address (in-process calls such as tests) are not limited.

use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};
use tracing::{debug, warn};

use crate::{config::RateLimitSettings, utils::ErrorResponse};

const PRUNE_INTERVAL: Duration = Duration::from_secs(600);

/// Quota applied to each client address
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Requests allowed in a single burst
    pub burst_size: u32,
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            requests_per_second: settings.requests_per_second,
            burst_size: settings.burst_size,
        }
    }
}

impl RateLimitConfig {
    fn quota(&self) -> Quota {
        let rate = NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst_size).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(rate).allow_burst(burst)
    }
}

type ClientLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Shared limiter state, cheap to clone into the middleware
#[derive(Clone)]
pub struct RateLimitState {
    limiter: Arc<ClientLimiter>,
}

impl RateLimitState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::keyed(config.quota())),
        }
    }

    /// Take one cell from the client's bucket; false once it is empty
    pub fn check(&self, ip: IpAddr) -> bool {
        self.limiter.check_key(&ip).is_ok()
    }

    /// Number of client addresses currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Forget clients whose buckets have fully refilled
    pub fn prune(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        debug!(before, after = self.limiter.len(), "Pruned rate limiter state");
    }
}

/// Rate limiting middleware for Axum
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match peer {
        Some(ip) if !rate_limit.check(ip) => {
            warn!(ip = %ip, path = %request.uri().path(), "Rate limit exceeded");
            RateLimitExceeded.into_response()
        }
        _ => next.run(request).await,
    }
}

/// 429 response with a JSON error body
pub struct RateLimitExceeded;

impl IntoResponse for RateLimitExceeded {
    fn into_response(self) -> Response {
        (
            StatusCode::TOO_MANY_REQUESTS,
            [(RETRY_AFTER, "1")],
            Json(ErrorResponse::new(
                "Too many requests. Please try again later.",
                "rate_limited",
            )),
        )
            .into_response()
    }
}

/// Periodically drop idle clients from the limiter
pub fn spawn_rate_limit_cleanup(state: RateLimitState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            state.prune();
        }
    });
}
