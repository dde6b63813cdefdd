// ABOUTME: Tag database operations
// ABOUTME: Read access for the API and idempotent inserts for fixture loading
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{is_unique_violation, Database};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{NewTag, Tag};

impl Database {
    /// Create the tags table
    pub(super) async fn migrate_tags(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                color TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL UNIQUE
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create tags table: {e}")))?;
        Ok(())
    }
}

/// Tag database operations manager
pub struct TagManager {
    pool: SqlitePool,
}

impl TagManager {
    /// Create a new tag manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List every tag ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(&self) -> AppResult<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name, color, slug FROM tags ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list tags: {e}")))?;

        Ok(rows.iter().map(Self::row_to_tag).collect())
    }

    /// Get a tag by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, id: i64) -> AppResult<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, color, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get tag: {e}")))?;

        Ok(row.as_ref().map(Self::row_to_tag))
    }

    /// Tags attached to a recipe, ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn for_recipe(&self, recipe_id: i64) -> AppResult<Vec<Tag>> {
        let rows = sqlx::query(
            r"
            SELECT t.id, t.name, t.color, t.slug
            FROM tags t
            JOIN recipe_tags rt ON rt.tag_id = t.id
            WHERE rt.recipe_id = $1
            ORDER BY t.name, t.id
            ",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recipe tags: {e}")))?;

        Ok(rows.iter().map(Self::row_to_tag).collect())
    }

    /// Insert a tag unless one with the same slug exists
    ///
    /// Returns whether a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if another tag already uses the name
    /// or color, or a database error if the query fails
    pub async fn insert_if_absent(&self, tag: &NewTag) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO tags (name, color, slug) VALUES ($1, $2, $3) ON CONFLICT (slug) DO NOTHING",
        )
        .bind(&tag.name)
        .bind(&tag.color)
        .bind(&tag.slug)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(e) if is_unique_violation(&e) => Err(AppError::new(
                ErrorCode::ResourceAlreadyExists,
                format!(
                    "Tag '{}' clashes with an existing tag name or color",
                    tag.slug
                ),
            )),
            Err(e) => Err(AppError::database(format!("Failed to insert tag: {e}"))),
        }
    }

    fn row_to_tag(row: &SqliteRow) -> Tag {
        Tag {
            id: row.get("id"),
            name: row.get("name"),
            color: row.get("color"),
            slug: row.get("slug"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseUrl;

    #[tokio::test]
    async fn test_insert_if_absent_skips_existing_slug() {
        let db = Database::new(&DatabaseUrl::Memory).await.unwrap();
        let tags = db.tags();
        let breakfast = NewTag {
            name: "Breakfast".to_owned(),
            color: "#E26C2D".to_owned(),
            slug: "breakfast".to_owned(),
        };

        assert!(tags.insert_if_absent(&breakfast).await.unwrap());
        assert!(!tags.insert_if_absent(&breakfast).await.unwrap());

        let all = tags.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(tags.get(all[0].id).await.unwrap().unwrap().slug, "breakfast");
    }

    #[tokio::test]
    async fn test_insert_if_absent_reports_color_clash() {
        let db = Database::new(&DatabaseUrl::Memory).await.unwrap();
        let tags = db.tags();
        let breakfast = NewTag {
            name: "Breakfast".to_owned(),
            color: "#E26C2D".to_owned(),
            slug: "breakfast".to_owned(),
        };
        let brunch = NewTag {
            name: "Brunch".to_owned(),
            color: "#E26C2D".to_owned(),
            slug: "brunch".to_owned(),
        };

        assert!(tags.insert_if_absent(&breakfast).await.unwrap());
        let err = tags.insert_if_absent(&brunch).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
        assert_eq!(tags.list().await.unwrap().len(), 1);
    }
}
