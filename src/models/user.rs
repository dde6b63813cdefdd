// ABOUTME: User models for authentication and profiles
// ABOUTME: User, UserRole and the validated registration payload
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use foodgram_core::constants::limits::USER_NAME_MAX_LEN;
use foodgram_core::constants::roles;
use serde::{Deserialize, Serialize};

use super::validation;
use crate::errors::{AppError, AppResult};

/// Role of a user account
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular authenticated user
    #[default]
    User,
    /// Administrator with write access to every recipe
    Admin,
}

impl UserRole {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => roles::USER,
            Self::Admin => roles::ADMIN,
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            roles::USER => Ok(Self::User),
            roles::ADMIN => Ok(Self::Admin),
            _ => Err(AppError::invalid_input(format!("Invalid user role: {s}"))),
        }
    }
}

/// Stored user account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Database identifier
    pub id: i64,
    /// Unique email, used for login
    pub email: String,
    /// Unique public handle
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Account role
    pub role: UserRole,
    /// Inactive accounts cannot log in
    pub is_active: bool,
    /// Registration timestamp
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Whether this user may act on resources owned by others
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

/// Validated data for creating a user (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Normalized email
    pub email: String,
    /// Username
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// bcrypt hash
    pub password_hash: String,
    /// Account role
    pub role: UserRole,
}

/// Registration request body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegisterRequest {
    /// Email address
    pub email: String,
    /// Username
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Raw password
    pub password: String,
}

/// Registration fields after validation, before hashing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRegistration {
    /// Normalized email
    pub email: String,
    /// Username
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

impl RegisterRequest {
    /// Validate every field of the registration payload
    ///
    /// # Errors
    ///
    /// Returns the first field-tagged validation error
    pub fn validate(&self) -> AppResult<ValidatedRegistration> {
        let registration = ValidatedRegistration {
            email: validation::email(&self.email)?,
            username: validation::username(&self.username)?,
            first_name: validation::required_text("first_name", &self.first_name, USER_NAME_MAX_LEN)?,
            last_name: validation::required_text("last_name", &self.last_name, USER_NAME_MAX_LEN)?,
        };
        validation::password("password", &self.password)?;
        Ok(registration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn request() -> RegisterRequest {
        RegisterRequest {
            email: "vasya@Example.org".to_owned(),
            username: "vasya.pupkin".to_owned(),
            first_name: " Vasya ".to_owned(),
            last_name: "Pupkin".to_owned(),
            password: "Qwerty123!".to_owned(),
        }
    }

    #[test]
    fn test_valid_registration_is_normalized() {
        let validated = request().validate().unwrap();
        assert_eq!(validated.email, "vasya@example.org");
        assert_eq!(validated.first_name, "Vasya");
    }

    #[test]
    fn test_registration_reports_offending_field() {
        let mut bad = request();
        bad.last_name = String::new();
        let err = bad.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
        assert_eq!(err.details["field"], "last_name");
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!(UserRole::User.as_str(), "user");
        assert!("moderator".parse::<UserRole>().is_err());
    }
}
