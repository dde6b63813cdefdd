// ABOUTME: Field-level validation helpers shared by request models
// ABOUTME: Length limits, numeric ranges and pattern checks producing field-tagged AppErrors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use std::sync::OnceLock;

use foodgram_core::constants::limits::{
    EMAIL_MAX_LEN, PASSWORD_MAX_LEN, PASSWORD_MIN_LEN, USER_NAME_MAX_LEN,
};
use regex::Regex;

use crate::errors::{AppError, AppResult, ErrorCode};

static USERNAME_RE: OnceLock<Option<Regex>> = OnceLock::new();
static SLUG_RE: OnceLock<Option<Regex>> = OnceLock::new();
static COLOR_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn matches(cell: &'static OnceLock<Option<Regex>>, pattern: &str, value: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

/// Trim a required text field and enforce its maximum length (in characters)
///
/// # Errors
///
/// `MissingRequiredField` when blank, `InvalidInput` when too long
pub fn required_text(field: &str, value: &str, max_len: usize) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::field(
            ErrorCode::MissingRequiredField,
            field,
            format!("Field '{field}' may not be blank"),
        ));
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::field(
            ErrorCode::InvalidInput,
            field,
            format!("Field '{field}' must be at most {max_len} characters"),
        ));
    }
    Ok(trimmed.to_owned())
}

/// Ensure a numeric field lies within `min..=max`
///
/// # Errors
///
/// `ValueOutOfRange` when the value is outside the range
pub fn in_range(field: &str, value: i64, min: u16, max: u16) -> AppResult<u16> {
    if value < i64::from(min) || value > i64::from(max) {
        return Err(AppError::field(
            ErrorCode::ValueOutOfRange,
            field,
            format!("Field '{field}' must be between {min} and {max}"),
        ));
    }
    u16::try_from(value).map_err(|_| {
        AppError::field(ErrorCode::ValueOutOfRange, field, "Value does not fit")
    })
}

/// Validate a username: letters, digits and `.@+-_`
///
/// # Errors
///
/// Field-tagged validation error
pub fn username(value: &str) -> AppResult<String> {
    let name = required_text("username", value, USER_NAME_MAX_LEN)?;
    if !matches(&USERNAME_RE, r"^[\w.@+-]+$", &name) {
        return Err(AppError::field(
            ErrorCode::InvalidFormat,
            "username",
            "Username may contain only letters, digits and @/./+/-/_ characters",
        ));
    }
    Ok(name)
}

/// Validate and normalize an email address (domain part lower-cased)
///
/// # Errors
///
/// Field-tagged validation error
pub fn email(value: &str) -> AppResult<String> {
    let email = required_text("email", value, EMAIL_MAX_LEN)?;
    let invalid = || AppError::field(ErrorCode::InvalidFormat, "email", "Enter a valid email address");

    let (local, domain) = email.rsplit_once('@').ok_or_else(invalid)?;
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..");
    if local.is_empty() || local.contains('@') || !domain_ok || email.contains(char::is_whitespace)
    {
        return Err(invalid());
    }
    Ok(format!("{local}@{}", domain.to_lowercase()))
}

/// Validate a raw password before hashing
///
/// # Errors
///
/// Field-tagged validation error
pub fn password(field: &str, value: &str) -> AppResult<()> {
    let length = value.chars().count();
    if length < PASSWORD_MIN_LEN {
        return Err(AppError::field(
            ErrorCode::InvalidInput,
            field,
            format!("Password must contain at least {PASSWORD_MIN_LEN} characters"),
        ));
    }
    if length > PASSWORD_MAX_LEN {
        return Err(AppError::field(
            ErrorCode::InvalidInput,
            field,
            format!("Password must contain at most {PASSWORD_MAX_LEN} characters"),
        ));
    }
    if value.trim().is_empty() {
        return Err(AppError::field(
            ErrorCode::InvalidInput,
            field,
            "Password may not consist of whitespace only",
        ));
    }
    Ok(())
}

/// Validate a tag slug
///
/// # Errors
///
/// Field-tagged validation error
pub fn slug(value: &str, max_len: usize) -> AppResult<String> {
    let slug = required_text("slug", value, max_len)?;
    if !matches(&SLUG_RE, r"^[-a-zA-Z0-9_]+$", &slug) {
        return Err(AppError::field(
            ErrorCode::InvalidFormat,
            "slug",
            "Slug may contain only latin letters, digits, hyphens and underscores",
        ));
    }
    Ok(slug)
}

/// Validate a `#RRGGBB` color and normalize it to upper case
///
/// # Errors
///
/// Field-tagged validation error
pub fn hex_color(value: &str) -> AppResult<String> {
    let color = value.trim();
    if !matches(&COLOR_RE, r"^#[0-9a-fA-F]{6}$", color) {
        return Err(AppError::field(
            ErrorCode::InvalidFormat,
            "color",
            "Color must be a HEX code like #49B64E",
        ));
    }
    Ok(color.to_uppercase())
}
