// ABOUTME: SQLite persistence layer: connection pool, schema migration and per-aggregate managers
// ABOUTME: Database hands out thin managers (users, recipes, collections, ...) sharing one pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

//! # Database Management
//!
//! Every table is created by an idempotent migration at startup. Each
//! aggregate has a manager struct wrapping a clone of the pool; the managers
//! are cheap to create and are obtained from [`Database`].
//!
//! Invariants that matter under concurrency (unique favorites, no self
//! subscription, unique ingredient per recipe) are backed by table
//! constraints, not only by checks in the handlers.

mod collections;
mod ingredients;
mod recipes;
mod subscriptions;
mod tags;
mod tokens;
mod users;

pub use collections::CollectionManager;
pub use ingredients::IngredientManager;
pub use recipes::RecipeManager;
pub use subscriptions::SubscriptionManager;
pub use tags::TagManager;
pub use tokens::RevokedTokenManager;
pub use users::UserManager;

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::DatabaseUrl;
use crate::errors::{AppError, AppResult};

/// Database handle shared by all request handlers
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the database directory cannot be created, the
    /// connection fails, or a migration fails
    pub async fn new(url: &DatabaseUrl) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&url.to_connection_string())
            .map_err(|e| AppError::config(format!("Invalid database URL {url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = if url.is_memory() {
            // Every in-memory connection is its own database: keep exactly one alive
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            if let DatabaseUrl::SQLite { path } = url {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        AppError::database(format!(
                            "Failed to create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
            SqlitePoolOptions::new()
                .max_connections(8)
                .connect_with(options)
                .await
        }
        .map_err(|e| AppError::database(format!("Failed to connect to {url}: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        info!("Database ready at {url}");
        Ok(db)
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a table or index cannot be created
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_tags().await?;
        self.migrate_ingredients().await?;
        self.migrate_recipes().await?;
        self.migrate_collections().await?;
        self.migrate_subscriptions().await?;
        self.migrate_tokens().await?;
        Ok(())
    }

    /// Cheap liveness query used by the health endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the database does not answer
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    /// User accounts
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// Recipe tags
    #[must_use]
    pub fn tags(&self) -> TagManager {
        TagManager::new(self.pool.clone())
    }

    /// Ingredient catalogue
    #[must_use]
    pub fn ingredients(&self) -> IngredientManager {
        IngredientManager::new(self.pool.clone())
    }

    /// Recipes with their ingredient lines and tags
    #[must_use]
    pub fn recipes(&self) -> RecipeManager {
        RecipeManager::new(self.pool.clone())
    }

    /// Favorites and shopping carts
    #[must_use]
    pub fn collections(&self) -> CollectionManager {
        CollectionManager::new(self.pool.clone())
    }

    /// Author subscriptions
    #[must_use]
    pub fn subscriptions(&self) -> SubscriptionManager {
        SubscriptionManager::new(self.pool.clone())
    }

    /// Revoked auth tokens
    #[must_use]
    pub fn revoked_tokens(&self) -> RevokedTokenManager {
        RevokedTokenManager::new(self.pool.clone())
    }
}

/// Format a timestamp so that lexical order equals chronological order
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored RFC 3339 timestamp
pub(crate) fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid date '{value}': {e}")))
}

/// Convert a stored count to `u64`
pub(crate) fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

/// Whether an insert failed because of a UNIQUE constraint
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_migrates_twice() {
        let db = Database::new(&DatabaseUrl::Memory).await.unwrap();
        db.migrate().await.unwrap();
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_database_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("foodgram.db");
        let db = Database::new(&DatabaseUrl::SQLite { path: path.clone() })
            .await
            .unwrap();
        db.ping().await.unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_timestamp_format_sorts_lexically() {
        let earlier = DateTime::parse_from_rfc3339("2025-01-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = earlier + chrono::Duration::microseconds(1);
        assert!(format_timestamp(earlier) < format_timestamp(later));
        assert_eq!(parse_timestamp(&format_timestamp(later)).unwrap(), later);
    }
}
