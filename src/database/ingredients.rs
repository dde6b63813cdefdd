// ABOUTME: Ingredient catalogue database operations
// ABOUTME: Prefix search by name, lookup by id and idempotent fixture inserts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Ingredient, NewIngredient};

impl Database {
    /// Create the ingredients table
    pub(super) async fn migrate_ingredients(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                measurement_unit TEXT NOT NULL,
                UNIQUE (name, measurement_unit)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create ingredients table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_ingredients_name ON ingredients(name)")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create ingredient index: {e}")))?;
        Ok(())
    }
}

/// Escape `LIKE` wildcards so user input matches literally
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Ingredient catalogue database operations manager
pub struct IngredientManager {
    pool: SqlitePool,
}

impl IngredientManager {
    /// Create a new ingredient manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List ingredients ordered by name, optionally restricted to a name prefix
    ///
    /// SQLite `LIKE` folds ASCII letters only, so the prefix match is
    /// case-insensitive for latin names.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn search(&self, name_prefix: Option<&str>) -> AppResult<Vec<Ingredient>> {
        let pattern = format!(
            "{}%",
            escape_like(name_prefix.map(str::trim).unwrap_or_default())
        );

        let rows = sqlx::query(
            r"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE name LIKE $1 ESCAPE '\'
            ORDER BY name, measurement_unit
            ",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to search ingredients: {e}")))?;

        Ok(rows.iter().map(Self::row_to_ingredient).collect())
    }

    /// Get an ingredient by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, id: i64) -> AppResult<Option<Ingredient>> {
        let row = sqlx::query("SELECT id, name, measurement_unit FROM ingredients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get ingredient: {e}")))?;

        Ok(row.as_ref().map(Self::row_to_ingredient))
    }

    /// Insert an ingredient unless the (name, unit) pair exists
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn insert_if_absent(&self, ingredient: &NewIngredient) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(&ingredient.name)
        .bind(&ingredient.measurement_unit)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert ingredient: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    fn row_to_ingredient(row: &SqliteRow) -> Ingredient {
        Ingredient {
            id: row.get("id"),
            name: row.get("name"),
            measurement_unit: row.get("measurement_unit"),
        }
    }
}
