//! Input validation utilities

use uuid::Uuid;
use validator::ValidationError;

use super::error::AppError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Longest accepted membership role label
pub const MAX_ROLE_LENGTH: usize = 50;

/// Custom `validator` rule: the string must contain non-whitespace text
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Check chat message content.
///
/// Content is kept exactly as sent; only the emptiness check looks at the
/// trimmed form.
pub fn validate_message_content(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::InvalidContent);
    }
    Ok(())
}

/// Normalise an optional role label, defaulting to `Member`
pub fn normalize_role(role: Option<&str>) -> Result<String, AppError> {
    let Some(role) = role else {
        return Ok(crate::models::ROLE_MEMBER.to_string());
    };

    let role = role.trim();
    if role.is_empty() {
        return Err(AppError::invalid_input("Role must not be empty"));
    }
    if role.chars().count() > MAX_ROLE_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Role must be at most {} characters",
            MAX_ROLE_LENGTH
        )));
    }
    Ok(role.to_string())
}

/// Parse a positive pagination parameter, falling back to `default` when the
/// value is absent, non-numeric, or less than 1.
pub fn parse_positive_or(value: Option<&str>, default: u32) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

/// Parse an FPO id taken from a URL path; unknown shapes are reported as a
/// missing FPO.
pub fn parse_fpo_path_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::fpo_not_found())
}
