// ABOUTME: Request authentication middleware for the REST API
// ABOUTME: Extracts Token/Bearer credentials, validates them and resolves the active user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::auth::{AuthManager, AuthResult};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;

/// Accepted authorization schemes: DRF style `Token` and `Bearer`
const AUTH_SCHEMES: [&str; 2] = ["Token ", "Bearer "];

/// Extract the raw token from an `Authorization` header value
fn extract_token(header: &str) -> Option<&str> {
    AUTH_SCHEMES.iter().find_map(|scheme| {
        header
            .get(..scheme.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(scheme))
            .map(|_| header[scheme.len()..].trim())
            .filter(|token| !token.is_empty())
    })
}

/// Middleware for API authentication
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: Arc<AuthManager>,
    database: Arc<Database>,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub const fn new(auth_manager: Arc<AuthManager>, database: Arc<Database>) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Authenticate a request, failing when no credentials are present
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` without an `Authorization` header, `AuthInvalid`
    /// for a malformed, expired or revoked token or an inactive user, and
    /// database errors
    #[tracing::instrument(
        skip(self, headers),
        fields(
            user_id = tracing::field::Empty,
            success = tracing::field::Empty,
        )
    )]
    pub async fn authenticate_request(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let header = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::auth_required)?;

        let result = self.authenticate_header(header).await;
        match &result {
            Ok(auth) => {
                tracing::Span::current()
                    .record("user_id", auth.user_id())
                    .record("success", true);
            }
            Err(e) => {
                tracing::Span::current().record("success", false);
                AppLogger::log_security_event("auth_failed", &e.message, None);
            }
        }
        result
    }

    /// Authenticate when credentials are present, allow anonymous otherwise
    ///
    /// Presented but invalid credentials are still an error.
    ///
    /// # Errors
    ///
    /// Same as [`Self::authenticate_request`] except for missing credentials
    pub async fn authenticate_optional(&self, headers: &HeaderMap) -> AppResult<Option<AuthResult>> {
        if headers.contains_key(AUTHORIZATION) {
            self.authenticate_request(headers).await.map(Some)
        } else {
            Ok(None)
        }
    }

    async fn authenticate_header(&self, header: &str) -> AppResult<AuthResult> {
        let token = extract_token(header).ok_or_else(|| {
            AppError::auth_invalid("Authorization header must be 'Token <token>' or 'Bearer <token>'")
        })?;

        let claims = self.auth_manager.validate_token_detailed(token)?;

        if self.database.revoked_tokens().is_revoked(&claims.jti).await? {
            return Err(AppError::auth_invalid("Token has been revoked"));
        }

        let user_id = claims.user_id()?;
        let user = self
            .database
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("User for this token no longer exists"))?;

        if !user.is_active {
            return Err(AppError::auth_invalid("User account is disabled"));
        }

        Ok(AuthResult {
            user,
            expires_at: claims.expires_at(),
            token_id: claims.jti,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_schemes() {
        assert_eq!(extract_token("Token abc"), Some("abc"));
        assert_eq!(extract_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_token("bearer  abc "), Some("abc"));
        assert_eq!(extract_token("Basic abc"), None);
        assert_eq!(extract_token("Token "), None);
        assert_eq!(extract_token("Tok"), None);
    }
}
