//! Session token authentication
//!
//! Sign-in is handled by the external auth provider, which issues HS256 JWT
//! access tokens. This module verifies those tokens, exposes the session as a
//! [`SessionUser`] request extension and resolves it to a [`Profile`] through
//! the [`CurrentProfile`] extractor.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    models::{Profile, SessionUser},
    utils::{AppError, ErrorResponse},
    AppState,
};

/// Claims read from (and written to) session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject assigned by the auth provider
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl TryFrom<Claims> for SessionUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let email = claims
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .ok_or(AuthError::MissingEmail)?;
        Ok(Self {
            subject: claims.sub,
            email,
        })
    }
}

/// Authentication error types
#[derive(Debug, PartialEq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenExpired,
    MissingEmail,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Unauthorized",
            AuthError::InvalidToken => "Invalid session token",
            AuthError::TokenExpired => "Session has expired",
            AuthError::MissingEmail => "Session has no email address",
        };

        let body = ErrorResponse::new(message, AppError::Unauthenticated.code());
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Mint a session token the way the auth provider does.
///
/// Used by `--issue-token` and by tests.
pub fn create_session_token(
    subject: &str,
    email: &str,
    config: &AuthConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::hours(config.token_expiry_hours as i64);

    let claims = Claims {
        sub: subject.to_string(),
        email: Some(email.to_string()),
        iat: now.timestamp(),
        exp: exp.timestamp(),
        nbf: Some(now.timestamp()),
        iss: config.issuer.clone(),
        aud: config.audience.clone(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_bytes()),
    )
}

/// Verify a session token and return the session it describes
pub fn validate_session_token(token: &str, config: &AuthConfig) -> Result<SessionUser, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = config.leeway_secs;

    if let Some(issuer) = &config.issuer {
        validation.set_issuer(&[issuer]);
    }
    match &config.audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.session_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    SessionUser::try_from(data.claims)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn session_from_request(request: &Request, config: &AuthConfig) -> Result<SessionUser, AuthError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or(AuthError::MissingToken)?;

    validate_session_token(token, config)
}

/// Session middleware for protected routes.
///
/// Rejects the request with 401 unless it carries a valid session token with
/// an email claim. On success the [`SessionUser`] is stored in the request
/// extensions.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let session = session_from_request(&request, &state.config.auth).inspect_err(|e| {
        debug!(reason = ?e, "Rejected unauthenticated request");
    })?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Like [`session_middleware`] but lets anonymous requests through
pub async fn optional_session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Ok(session) = session_from_request(&request, &state.config.auth) {
        request.extensions_mut().insert(session);
    }

    next.run(request).await
}

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }
}

/// The profile of the signed-in caller.
///
/// Rejects with 401 without a session and 404 when the session email has no
/// profile. `Option<CurrentProfile>` never rejects for those two cases.
#[derive(Debug, Clone)]
pub struct CurrentProfile(pub Profile);

impl CurrentProfile {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

impl FromRequestParts<AppState> for CurrentProfile {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<SessionUser>();
        state.identity.resolve(session).await.map(CurrentProfile)
    }
}

impl OptionalFromRequestParts<AppState> for CurrentProfile {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        let session = parts.extensions.get::<SessionUser>();
        Ok(state
            .identity
            .resolve_optional(session)
            .await?
            .map(CurrentProfile))
    }
}
