// ABOUTME: Recipe database operations: filtered listing, transactional create/update, deletion
// ABOUTME: Also owns the recipe_ingredients and recipe_tags relation tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use super::{format_timestamp, parse_timestamp, to_count, Database};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{NewRecipe, Recipe, RecipeFilter, RecipeIngredient, RecipePatch, ValidAmount};
use crate::pagination::PageParams;

const RECIPE_COLUMNS: &str =
    "r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.pub_date";

impl Database {
    /// Create recipe tables
    pub(super) async fn migrate_recipes(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                image TEXT NOT NULL,
                text TEXT NOT NULL,
                cooking_time INTEGER NOT NULL CHECK (cooking_time BETWEEN 1 AND 32767),
                pub_date TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipes table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipe_ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                ingredient_id INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
                amount INTEGER NOT NULL CHECK (amount BETWEEN 1 AND 32767),
                UNIQUE (recipe_id, ingredient_id)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to create recipe_ingredients table: {e}"))
        })?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipe_tags (
                recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                PRIMARY KEY (recipe_id, tag_id)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipe_tags table: {e}")))?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_recipes_pub_date ON recipes(pub_date DESC, id DESC)",
            "CREATE INDEX IF NOT EXISTS idx_recipes_author ON recipes(author_id)",
            "CREATE INDEX IF NOT EXISTS idx_recipe_ingredients_recipe ON recipe_ingredients(recipe_id)",
            "CREATE INDEX IF NOT EXISTS idx_recipe_tags_tag ON recipe_tags(tag_id)",
        ] {
            sqlx::query(index)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to create recipe index: {e}")))?;
        }
        Ok(())
    }
}

/// Append the `WHERE` clause of a filtered recipe query
fn push_filters<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &'a RecipeFilter) {
    builder.push(" WHERE 1 = 1");

    if let Some(author) = filter.author {
        builder.push(" AND r.author_id = ").push_bind(author);
    }

    if !filter.tags.is_empty() {
        builder.push(
            " AND r.id IN (SELECT rt.recipe_id FROM recipe_tags rt \
             JOIN tags t ON t.id = rt.tag_id WHERE t.slug IN (",
        );
        let mut slugs = builder.separated(", ");
        for slug in &filter.tags {
            slugs.push_bind(slug.as_str());
        }
        slugs.push_unseparated("))");
    }

    if let Some(user_id) = filter.favorited_by {
        builder
            .push(" AND r.id IN (SELECT recipe_id FROM favorites WHERE user_id = ")
            .push_bind(user_id)
            .push(")");
    }

    if let Some(user_id) = filter.in_cart_of {
        builder
            .push(" AND r.id IN (SELECT recipe_id FROM shopping_carts WHERE user_id = ")
            .push_bind(user_id)
            .push(")");
    }
}

/// Recipe database operations manager
pub struct RecipeManager {
    pool: SqlitePool,
}

impl RecipeManager {
    /// Create a new recipe manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List recipes matching `filter`, newest first, returning one page and the total count
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(
        &self,
        filter: &RecipeFilter,
        page: &PageParams,
    ) -> AppResult<(Vec<Recipe>, u64)> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM recipes r");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count recipes: {e}")))?;

        let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {RECIPE_COLUMNS} FROM recipes r"));
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY r.pub_date DESC, r.id DESC LIMIT ")
            .push_bind(page.sql_limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list recipes: {e}")))?;

        let recipes = rows
            .iter()
            .map(Self::row_to_recipe)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((recipes, to_count(total)))
    }

    /// Get a recipe by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, id: i64) -> AppResult<Option<Recipe>> {
        let row = sqlx::query(&format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get recipe: {e}")))?;

        row.map(|r| Self::row_to_recipe(&r)).transpose()
    }

    /// Recipes of one author, newest first, optionally truncated
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn by_author(&self, author_id: i64, limit: Option<u32>) -> AppResult<Vec<Recipe>> {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map_or(-1, i64::from);
        let rows = sqlx::query(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.author_id = $1 \
             ORDER BY r.pub_date DESC, r.id DESC LIMIT $2"
        ))
        .bind(author_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get author recipes: {e}")))?;

        rows.iter().map(Self::row_to_recipe).collect()
    }

    /// Number of recipes published by an author
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_by_author(&self, author_id: i64) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count author recipes: {e}")))?;
        Ok(to_count(total))
    }

    /// Ingredient lines of a recipe, in insertion order
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn ingredients(&self, recipe_id: i64) -> AppResult<Vec<RecipeIngredient>> {
        let rows = sqlx::query(
            r"
            SELECT i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY ri.id
            ",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recipe ingredients: {e}")))?;

        rows.iter()
            .map(|row| {
                Ok(RecipeIngredient {
                    id: row.get("id"),
                    name: row.get("name"),
                    measurement_unit: row.get("measurement_unit"),
                    amount: small_int(row.get("amount"))?,
                })
            })
            .collect()
    }

    /// Insert a recipe with its ingredient lines and tags in one transaction
    ///
    /// # Errors
    ///
    /// Returns a field-tagged `InvalidInput` error for unknown ingredient or
    /// tag ids, or a database error
    pub async fn create(&self, author_id: i64, recipe: &NewRecipe, image: &str) -> AppResult<i64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        ensure_ingredients_exist(&mut tx, &recipe.ingredients).await?;
        ensure_tags_exist(&mut tx, &recipe.tags).await?;

        let recipe_id = sqlx::query(
            r"
            INSERT INTO recipes (author_id, name, image, text, cooking_time, pub_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(author_id)
        .bind(&recipe.name)
        .bind(image)
        .bind(&recipe.text)
        .bind(i64::from(recipe.cooking_time))
        .bind(format_timestamp(Utc::now()))
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipe: {e}")))?
        .last_insert_rowid();

        replace_ingredients(&mut tx, recipe_id, &recipe.ingredients).await?;
        replace_tags(&mut tx, recipe_id, &recipe.tags).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipe: {e}")))?;

        debug!(recipe_id, author_id, "Recipe created");
        Ok(recipe_id)
    }

    /// Apply a partial update; given ingredient or tag lists replace the old ones
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the recipe is gone, a field-tagged
    /// `InvalidInput` for unknown ids, or a database error
    pub async fn update(&self, id: i64, patch: &RecipePatch, image: Option<&str>) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        if let Some(lines) = &patch.ingredients {
            ensure_ingredients_exist(&mut tx, lines).await?;
        }
        if let Some(tags) = &patch.tags {
            ensure_tags_exist(&mut tx, tags).await?;
        }

        let updated = sqlx::query(
            r"
            UPDATE recipes
            SET name = COALESCE($1, name),
                text = COALESCE($2, text),
                cooking_time = COALESCE($3, cooking_time),
                image = COALESCE($4, image)
            WHERE id = $5
            ",
        )
        .bind(patch.name.as_deref())
        .bind(patch.text.as_deref())
        .bind(patch.cooking_time.map(i64::from))
        .bind(image)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update recipe: {e}")))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Recipe {id}")));
        }

        if let Some(lines) = &patch.ingredients {
            replace_ingredients(&mut tx, id, lines).await?;
        }
        if let Some(tags) = &patch.tags {
            replace_tags(&mut tx, id, tags).await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipe update: {e}")))?;
        Ok(())
    }

    /// Delete a recipe; relations cascade
    ///
    /// Returns the stored image path of the deleted recipe, `None` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete(&self, id: i64) -> AppResult<Option<String>> {
        let image: Option<String> =
            sqlx::query_scalar("DELETE FROM recipes WHERE id = $1 RETURNING image")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to delete recipe: {e}")))?;
        Ok(image)
    }

    fn row_to_recipe(row: &SqliteRow) -> AppResult<Recipe> {
        let pub_date: String = row.get("pub_date");
        Ok(Recipe {
            id: row.get("id"),
            author_id: row.get("author_id"),
            name: row.get("name"),
            image: row.get("image"),
            text: row.get("text"),
            cooking_time: small_int(row.get("cooking_time"))?,
            pub_date: parse_timestamp(&pub_date)?,
        })
    }
}

fn small_int(value: i64) -> AppResult<u16> {
    u16::try_from(value).map_err(|_| AppError::database(format!("Stored value {value} out of range")))
}

async fn ensure_ingredients_exist(
    conn: &mut SqliteConnection,
    lines: &[ValidAmount],
) -> AppResult<()> {
    for line in lines {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM ingredients WHERE id = $1")
            .bind(line.ingredient_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to check ingredient: {e}")))?;
        if exists.is_none() {
            return Err(AppError::field(
                ErrorCode::InvalidInput,
                "ingredients",
                format!("Ingredient {} does not exist", line.ingredient_id),
            ));
        }
    }
    Ok(())
}

async fn ensure_tags_exist(conn: &mut SqliteConnection, tags: &[i64]) -> AppResult<()> {
    for tag_id in tags {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM tags WHERE id = $1")
            .bind(*tag_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to check tag: {e}")))?;
        if exists.is_none() {
            return Err(AppError::field(
                ErrorCode::InvalidInput,
                "tags",
                format!("Tag {tag_id} does not exist"),
            ));
        }
    }
    Ok(())
}

async fn replace_ingredients(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    lines: &[ValidAmount],
) -> AppResult<()> {
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to clear recipe ingredients: {e}")))?;

    for line in lines {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES ($1, $2, $3)",
        )
        .bind(recipe_id)
        .bind(line.ingredient_id)
        .bind(i64::from(line.amount))
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to add recipe ingredient: {e}")))?;
    }
    Ok(())
}

async fn replace_tags(conn: &mut SqliteConnection, recipe_id: i64, tags: &[i64]) -> AppResult<()> {
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to clear recipe tags: {e}")))?;

    for tag_id in tags {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)")
            .bind(recipe_id)
            .bind(*tag_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to add recipe tag: {e}")))?;
    }
    Ok(())
}
