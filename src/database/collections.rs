// ABOUTME: Favorites and shopping cart database operations
// ABOUTME: Idempotent add/remove on the per-user recipe collections and raw cart lines for aggregation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use super::{format_timestamp, Database};
use crate::errors::{AppError, AppResult};
use crate::models::RecipeCollection;
use crate::services::shopping_list::CartLine;

impl Database {
    /// Create the favorites and shopping cart tables
    pub(super) async fn migrate_collections(&self) -> AppResult<()> {
        for collection in [RecipeCollection::Favorites, RecipeCollection::ShoppingCart] {
            let table = collection.table();
            sqlx::query(&format!(
                r"
                CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                    created_at TEXT NOT NULL,
                    UNIQUE (user_id, recipe_id)
                )
                "
            ))
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create {table} table: {e}")))?;
        }
        Ok(())
    }
}

/// Favorites and shopping cart database operations manager
pub struct CollectionManager {
    pool: SqlitePool,
}

impl CollectionManager {
    /// Create a new collection manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a recipe to a user's collection
    ///
    /// Returns `false` when the recipe was already there; the UNIQUE
    /// constraint keeps concurrent requests from inserting twice.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn add(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> AppResult<bool> {
        let result = sqlx::query(&format!(
            "INSERT INTO {} (user_id, recipe_id, created_at) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, recipe_id) DO NOTHING",
            collection.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to add to {collection}: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a recipe from a user's collection, returning whether it was there
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn remove(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> AppResult<bool> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
            collection.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to remove from {collection}: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether a recipe is in a user's collection
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn contains(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(&format!(
            "SELECT id FROM {} WHERE user_id = $1 AND recipe_id = $2",
            collection.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check {collection}: {e}")))?;

        Ok(found.is_some())
    }

    /// Number of entries in a user's collection
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count(&self, collection: RecipeCollection, user_id: i64) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE user_id = $1",
            collection.table()
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count {collection}: {e}")))?;

        Ok(super::to_count(total))
    }

    /// Every ingredient line of every recipe in the user's shopping cart, unaggregated
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn cart_lines(&self, user_id: i64) -> AppResult<Vec<CartLine>> {
        let rows = sqlx::query(
            r"
            SELECT i.name, i.measurement_unit, ri.amount
            FROM shopping_carts sc
            JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE sc.user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load shopping cart: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| CartLine {
                name: row.get("name"),
                measurement_unit: row.get("measurement_unit"),
                amount: row.get("amount"),
            })
            .collect())
    }
}
