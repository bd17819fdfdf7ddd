//! Error types and handling
//!
//! Every failure a handler can produce is an [`AppError`]. Errors render as a
//! JSON body of the form `{"error": "...", "code": "..."}` with the matching
//! HTTP status.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Entities that can be reported as missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Fpo,
    User,
    Profile,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Fpo => write!(f, "FPO"),
            Resource::User => write!(f, "User"),
            Resource::Profile => write!(f, "Profile"),
        }
    }
}

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// No session, or the session token could not be verified (401)
    #[error("Unauthorized")]
    Unauthenticated,

    /// Authenticated but not a member of the FPO (403)
    #[error("Access denied. You must be a member of this FPO.")]
    AccessDenied,

    /// Referenced entity does not exist (404)
    #[error("{0} not found")]
    NotFound(Resource),

    /// No route matches the request path (404)
    #[error("No such endpoint")]
    RouteNotFound,

    /// The path exists but not for this HTTP method (405)
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Missing or malformed request input (400)
    #[error("{0}")]
    InvalidInput(String),

    /// Message content is empty after trimming (400)
    #[error("Message content is required")]
    InvalidContent,

    /// Membership already exists for the (user, FPO) pair (400)
    #[error("You are already a member of this FPO")]
    AlreadyMember,

    /// Store failure (500)
    #[error("Database error: {0}")]
    Database(String),

    /// Anything else unexpected (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn fpo_not_found() -> Self {
        AppError::NotFound(Resource::Fpo)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }

    /// Machine-readable code included in the response body
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "unauthenticated",
            AppError::AccessDenied => "access_denied",
            AppError::NotFound(Resource::Fpo) => "fpo_not_found",
            AppError::NotFound(Resource::User) => "user_not_found",
            AppError::NotFound(Resource::Profile) => "profile_not_found",
            AppError::RouteNotFound => "not_found",
            AppError::MethodNotAllowed => "method_not_allowed",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::InvalidContent => "invalid_content",
            AppError::AlreadyMember => "already_member",
            AppError::Database(_) => "database_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::InvalidInput(_) | AppError::InvalidContent | AppError::AlreadyMember => {
                StatusCode::BAD_REQUEST
            }
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Error code for programmatic handling
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        // Server errors are logged; their details never reach the client
        let message = if status.is_server_error() {
            error!(error = %self, error_code = code, "Request error");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse::new(message, code))).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{:#}", err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("Invalid JSON body: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}
