//! Input validation shared by the account and inventory services.
//!
//! Each check returns the normalized value or a [`ServiceError::Validation`]
//! naming the offending field.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ServiceError;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_USERNAME_LEN: usize = 100;
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_SKU_LEN: usize = 100;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
});

/// Emails are matched exactly as stored, so only surrounding whitespace is
/// stripped.
pub fn email(value: &str) -> Result<&str, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation("email is required"));
    }
    if trimmed.len() > MAX_NAME_LEN || !EMAIL_REGEX.is_match(trimmed) {
        return Err(ServiceError::validation("email is not a valid address"));
    }
    Ok(trimmed)
}

pub fn username(value: &str) -> Result<&str, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation("username is required"));
    }
    if trimmed.chars().count() > MAX_USERNAME_LEN {
        return Err(ServiceError::validation(format!(
            "username cannot exceed {MAX_USERNAME_LEN} characters"
        )));
    }
    Ok(trimmed)
}

/// Passwords are taken verbatim; only the length is checked.
pub fn password(value: &str) -> Result<&str, ServiceError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(value)
}

/// Non-blank display name for a category or item.
pub fn name(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ServiceError::validation(format!(
            "{field} cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Blank optional text collapses to `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn sku(value: Option<String>) -> Result<Option<String>, ServiceError> {
    let sku = optional_text(value);
    if sku
        .as_deref()
        .is_some_and(|s| s.chars().count() > MAX_SKU_LEN)
    {
        return Err(ServiceError::validation(format!(
            "sku cannot exceed {MAX_SKU_LEN} characters"
        )));
    }
    Ok(sku)
}

pub fn quantity(value: i32) -> Result<i32, ServiceError> {
    if value < 0 {
        return Err(ServiceError::validation("quantity cannot be negative"));
    }
    Ok(value)
}

pub fn price(value: f64) -> Result<f64, ServiceError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ServiceError::validation(
            "price must be a non-negative number",
        ));
    }
    Ok(value)
}
