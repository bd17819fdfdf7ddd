//! Shared utilities: the error taxonomy and request input validation

pub mod error;
pub mod validation;

pub use error::{AppError, ErrorResponse, Resource};
