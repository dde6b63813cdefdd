// ABOUTME: Author subscription database operations
// ABOUTME: Follow/unfollow, follow checks and the paginated list of followed authors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use chrono::Utc;
use sqlx::SqlitePool;

use super::{format_timestamp, to_count, Database, UserManager};
use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::pagination::PageParams;

impl Database {
    /// Create the subscriptions table
    pub(super) async fn migrate_subscriptions(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS subscriptions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, author_id),
                CHECK (user_id <> author_id)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create subscriptions table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_subscriptions_author ON subscriptions(author_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create subscription index: {e}")))?;
        Ok(())
    }
}

/// Subscription database operations manager
pub struct SubscriptionManager {
    pool: SqlitePool,
}

impl SubscriptionManager {
    /// Create a new subscription manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Subscribe `user_id` to `author_id`
    ///
    /// Returns `false` when the subscription already existed. Self
    /// subscriptions are rejected by the table CHECK constraint.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the CHECK constraint fires
    pub async fn subscribe(&self, user_id: i64, author_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO subscriptions (user_id, author_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, author_id) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(author_id)
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to subscribe: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a subscription, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn unsubscribe(&self, user_id: i64, author_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to unsubscribe: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether `user_id` follows `author_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn is_subscribed(&self, user_id: i64, author_id: i64) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM subscriptions WHERE user_id = $1 AND author_id = $2",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check subscription: {e}")))?;

        Ok(found.is_some())
    }

    /// Authors followed by `user_id`, most recent subscription first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn authors(&self, user_id: i64, page: &PageParams) -> AppResult<(Vec<User>, u64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count subscriptions: {e}")))?;

        let rows = sqlx::query(
            r"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.password_hash,
                   u.role, u.is_active, u.date_joined
            FROM subscriptions s
            JOIN users u ON u.id = s.author_id
            WHERE s.user_id = $1
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(page.sql_limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list subscriptions: {e}")))?;

        let authors = rows
            .iter()
            .map(UserManager::row_to_user)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((authors, to_count(total)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseUrl;
    use crate::models::{NewUser, UserRole};

    async fn users(db: &Database, count: usize) -> Vec<i64> {
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let user = db
                .users()
                .create(&NewUser {
                    email: format!("user{i}@example.com"),
                    username: format!("user{i}"),
                    first_name: "First".to_owned(),
                    last_name: "Last".to_owned(),
                    password_hash: "hash".to_owned(),
                    role: UserRole::User,
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        ids
    }

    #[tokio::test]
    async fn test_subscribe_once() {
        let db = Database::new(&DatabaseUrl::Memory).await.unwrap();
        let ids = users(&db, 2).await;
        let subs = db.subscriptions();

        assert!(subs.subscribe(ids[0], ids[1]).await.unwrap());
        assert!(!subs.subscribe(ids[0], ids[1]).await.unwrap());
        assert!(subs.is_subscribed(ids[0], ids[1]).await.unwrap());
        assert!(!subs.is_subscribed(ids[1], ids[0]).await.unwrap());

        let (authors, total) = subs.authors(ids[0], &PageParams::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(authors[0].id, ids[1]);
    }

    #[tokio::test]
    async fn test_self_subscription_violates_check() {
        let db = Database::new(&DatabaseUrl::Memory).await.unwrap();
        let ids = users(&db, 1).await;
        assert!(db.subscriptions().subscribe(ids[0], ids[0]).await.is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let db = Database::new(&DatabaseUrl::Memory).await.unwrap();
        let ids = users(&db, 2).await;
        let subs = db.subscriptions();
        assert!(!subs.unsubscribe(ids[0], ids[1]).await.unwrap());
        subs.subscribe(ids[0], ids[1]).await.unwrap();
        assert!(subs.unsubscribe(ids[0], ids[1]).await.unwrap());
    }
}
