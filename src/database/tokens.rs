// ABOUTME: Revoked auth token storage
// ABOUTME: Logout records the token id here until the token would have expired anyway
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{format_timestamp, Database};
use crate::errors::{AppError, AppResult};

impl Database {
    /// Create the revoked tokens table
    pub(super) async fn migrate_tokens(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS revoked_tokens (
                jti TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                expires_at TEXT NOT NULL,
                revoked_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create revoked_tokens table: {e}")))?;
        Ok(())
    }
}

/// Revoked token database operations manager
pub struct RevokedTokenManager {
    pool: SqlitePool,
}

impl RevokedTokenManager {
    /// Create a new revoked token manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Revoke a token id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn revoke(&self, jti: &str, user_id: i64, expires_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO revoked_tokens (jti, user_id, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (jti) DO NOTHING
            ",
        )
        .bind(jti)
        .bind(user_id)
        .bind(format_timestamp(expires_at))
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to revoke token: {e}")))?;
        Ok(())
    }

    /// Whether a token id has been revoked
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn is_revoked(&self, jti: &str) -> AppResult<bool> {
        let found: Option<String> =
            sqlx::query_scalar("SELECT jti FROM revoked_tokens WHERE jti = $1")
                .bind(jti)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to check token: {e}")))?;
        Ok(found.is_some())
    }

    /// Drop revocations of tokens that have expired on their own
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < $1")
            .bind(format_timestamp(Utc::now()))
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to purge revoked tokens: {e}")))?;
        Ok(result.rows_affected())
    }
}
