// ABOUTME: Route handlers for recipes, favorites, the shopping cart and its download
// ABOUTME: Filtered listing, author-only writes and per-user recipe collections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

//! Recipe routes
//!
//! Reads are public; `is_favorited` / `is_in_shopping_cart` in the
//! representation are always `false` for anonymous requests. Writes need a
//! token, and changing or deleting a recipe needs its author or an admin.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use foodgram_core::constants::shopping_list::FILENAME;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::users::UserResponse;
use super::{is_truthy, page_params, parse_number, query_pairs};
use crate::{
    auth::AuthResult,
    errors::{AppError, AppResult},
    logging::AppLogger,
    media::MediaStore,
    models::{
        CreateRecipeRequest, Recipe, RecipeCollection, RecipeFilter, RecipeIngredient, Tag,
        UpdateRecipeRequest,
    },
    pagination::Page,
    resources::ServerResources,
    services::shopping_list,
};

// ============================================================================
// Response Types
// ============================================================================

/// Short recipe representation used by collections and subscriptions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortRecipeResponse {
    /// Recipe ID
    pub id: i64,
    /// Title
    pub name: String,
    /// Image URL
    pub image: String,
    /// Minutes
    pub cooking_time: u16,
}

impl ShortRecipeResponse {
    /// Build from a stored recipe
    #[must_use]
    pub fn new(recipe: Recipe, media: &MediaStore) -> Self {
        Self {
            image: media.url(&recipe.image),
            id: recipe.id,
            name: recipe.name,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Full recipe representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeResponse {
    /// Recipe ID
    pub id: i64,
    /// Tags
    pub tags: Vec<Tag>,
    /// Author
    pub author: UserResponse,
    /// Ingredient lines
    pub ingredients: Vec<RecipeIngredient>,
    /// Whether the requester favorited the recipe
    pub is_favorited: bool,
    /// Whether the recipe is in the requester's shopping cart
    pub is_in_shopping_cart: bool,
    /// Title
    pub name: String,
    /// Image URL
    pub image: String,
    /// Description
    pub text: String,
    /// Minutes
    pub cooking_time: u16,
    /// Publication time (RFC 3339)
    pub pub_date: String,
}

// ============================================================================
// Routes
// ============================================================================

/// Recipe routes handler
pub struct RecipeRoutes;

impl RecipeRoutes {
    /// Create all recipe routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/recipes/",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/recipes/download_shopping_cart/",
                get(Self::handle_download_shopping_cart),
            )
            .route(
                "/api/recipes/:id/",
                get(Self::handle_get)
                    .patch(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route(
                "/api/recipes/:id/favorite/",
                post(Self::handle_add_favorite).delete(Self::handle_remove_favorite),
            )
            .route(
                "/api/recipes/:id/shopping_cart/",
                post(Self::handle_add_to_cart).delete(Self::handle_remove_from_cart),
            )
            .with_state(resources)
    }

    async fn authenticate(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        resources.auth_middleware.authenticate_request(headers).await
    }

    async fn find_recipe(resources: &ServerResources, id: i64) -> AppResult<Recipe> {
        resources
            .database
            .recipes()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {id}")))
    }

    /// Only the author or an admin may change a recipe
    fn ensure_can_edit(auth: &AuthResult, recipe: &Recipe) -> AppResult<()> {
        if recipe.author_id == auth.user_id() || auth.user.is_admin() {
            return Ok(());
        }
        AppLogger::log_security_event(
            "recipe_edit_denied",
            &format!("recipe {} belongs to user {}", recipe.id, recipe.author_id),
            Some(auth.user_id()),
        );
        Err(AppError::permission_denied(
            "Only the author can change this recipe",
        ))
    }

    /// Build the full representation as seen by `viewer`
    async fn recipe_response(
        recipe: Recipe,
        viewer: Option<i64>,
        resources: &ServerResources,
    ) -> AppResult<RecipeResponse> {
        let database = &resources.database;

        let author = database
            .users()
            .get_by_id(recipe.author_id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Author of recipe {} missing", recipe.id)))?;
        let tags = database.tags().for_recipe(recipe.id).await?;
        let ingredients = database.recipes().ingredients(recipe.id).await?;

        let (is_favorited, is_in_shopping_cart) = match viewer {
            Some(user_id) => {
                let collections = database.collections();
                (
                    collections
                        .contains(RecipeCollection::Favorites, user_id, recipe.id)
                        .await?,
                    collections
                        .contains(RecipeCollection::ShoppingCart, user_id, recipe.id)
                        .await?,
                )
            }
            None => (false, false),
        };

        Ok(RecipeResponse {
            id: recipe.id,
            tags,
            author: UserResponse::for_viewer(author, viewer, resources).await?,
            ingredients,
            is_favorited,
            is_in_shopping_cart,
            image: resources.media.url(&recipe.image),
            name: recipe.name,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
            pub_date: recipe.pub_date.to_rfc3339(),
        })
    }

    /// Parse recipe filters; `None` means the result is empty for this requester
    fn parse_filter(raw_query: Option<&str>, viewer: Option<i64>) -> AppResult<Option<RecipeFilter>> {
        let mut filter = RecipeFilter::default();
        let mut wants_favorites = false;
        let mut wants_cart = false;

        for (key, value) in query_pairs(raw_query) {
            match key.as_str() {
                "author" => filter.author = Some(parse_number("author", &value)?),
                "tags" if !value.trim().is_empty() => filter.tags.push(value.trim().to_owned()),
                "is_favorited" | "is_favorite" => wants_favorites = is_truthy(&value),
                "is_in_shopping_cart" => wants_cart = is_truthy(&value),
                _ => {}
            }
        }

        if (wants_favorites || wants_cart) && viewer.is_none() {
            return Ok(None);
        }
        if wants_favorites {
            filter.favorited_by = viewer;
        }
        if wants_cart {
            filter.in_cart_of = viewer;
        }
        Ok(Some(filter))
    }

    // ========================================================================
    // Recipes
    // ========================================================================

    /// Handle GET /api/recipes/ - Filtered, paginated list
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        uri: Uri,
    ) -> Result<Response, AppError> {
        let viewer = resources
            .auth_middleware
            .authenticate_optional(&headers)
            .await?
            .map(|auth| auth.user_id());
        let params = page_params(uri.query(), &resources)?;

        let (recipes, count) = match Self::parse_filter(uri.query(), viewer)? {
            Some(filter) => resources.database.recipes().list(&filter, &params).await?,
            None => (Vec::new(), 0),
        };

        let mut results = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            results.push(Self::recipe_response(recipe, viewer, &resources).await?);
        }

        let page = Page::new(results, count, params, uri.path(), uri.query())?;
        Ok((StatusCode::OK, Json(page)).into_response())
    }

    /// Handle GET /api/recipes/:id/
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let viewer = resources
            .auth_middleware
            .authenticate_optional(&headers)
            .await?
            .map(|auth| auth.user_id());
        let recipe = Self::find_recipe(&resources, id).await?;

        let response = Self::recipe_response(recipe, viewer, &resources).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/recipes/ - Publish a recipe
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateRecipeRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;
        let recipe = body.validate()?;

        let image = resources.media.save_recipe_image(&body.image).await?;
        let created = resources
            .database
            .recipes()
            .create(auth.user_id(), &recipe, &image)
            .await;
        let recipe_id = match created {
            Ok(id) => id,
            Err(e) => {
                resources.media.remove(&image).await;
                return Err(e);
            }
        };

        info!(recipe.id = recipe_id, user.id = auth.user_id(), "Recipe published");
        let stored = Self::find_recipe(&resources, recipe_id).await?;
        let response = Self::recipe_response(stored, Some(auth.user_id()), &resources).await?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle PATCH /api/recipes/:id/ - Partial update
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(body): Json<UpdateRecipeRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;
        let existing = Self::find_recipe(&resources, id).await?;
        Self::ensure_can_edit(&auth, &existing)?;

        let patch = body.validate()?;
        let new_image = match body.image.as_deref() {
            Some(data_url) => Some(resources.media.save_recipe_image(data_url).await?),
            None => None,
        };

        if !patch.is_empty() || new_image.is_some() {
            if let Err(e) = resources
                .database
                .recipes()
                .update(id, &patch, new_image.as_deref())
                .await
            {
                if let Some(image) = &new_image {
                    resources.media.remove(image).await;
                }
                return Err(e);
            }
        }
        if new_image.is_some() {
            resources.media.remove(&existing.image).await;
        }

        let stored = Self::find_recipe(&resources, id).await?;
        let response = Self::recipe_response(stored, Some(auth.user_id()), &resources).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/recipes/:id/
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;
        let existing = Self::find_recipe(&resources, id).await?;
        Self::ensure_can_edit(&auth, &existing)?;

        if let Some(image) = resources.database.recipes().delete(id).await? {
            resources.media.remove(&image).await;
        }

        info!(recipe.id = id, user.id = auth.user_id(), "Recipe deleted");
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    // ========================================================================
    // Favorites and shopping cart
    // ========================================================================

    async fn add_to_collection(
        collection: RecipeCollection,
        resources: &Arc<ServerResources>,
        headers: &HeaderMap,
        recipe_id: i64,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(headers, resources).await?;
        let recipe = Self::find_recipe(resources, recipe_id).await?;

        let added = resources
            .database
            .collections()
            .add(collection, auth.user_id(), recipe.id)
            .await?;
        if !added {
            return Err(AppError::invalid_input(format!(
                "Recipe is already in {}",
                collection.label()
            )));
        }

        let response = ShortRecipeResponse::new(recipe, &resources.media);
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    async fn remove_from_collection(
        collection: RecipeCollection,
        resources: &Arc<ServerResources>,
        headers: &HeaderMap,
        recipe_id: i64,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(headers, resources).await?;
        let recipe = Self::find_recipe(resources, recipe_id).await?;

        let removed = resources
            .database
            .collections()
            .remove(collection, auth.user_id(), recipe.id)
            .await?;
        if !removed {
            return Err(AppError::invalid_input(format!(
                "Recipe is not in {}",
                collection.label()
            )));
        }

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/recipes/:id/favorite/
    async fn handle_add_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        Self::add_to_collection(RecipeCollection::Favorites, &resources, &headers, id).await
    }

    /// Handle DELETE /api/recipes/:id/favorite/
    async fn handle_remove_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        Self::remove_from_collection(RecipeCollection::Favorites, &resources, &headers, id).await
    }

    /// Handle POST /api/recipes/:id/shopping_cart/
    async fn handle_add_to_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        Self::add_to_collection(RecipeCollection::ShoppingCart, &resources, &headers, id).await
    }

    /// Handle DELETE /api/recipes/:id/shopping_cart/
    async fn handle_remove_from_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        Self::remove_from_collection(RecipeCollection::ShoppingCart, &resources, &headers, id)
            .await
    }

    /// Handle GET /api/recipes/download_shopping_cart/
    async fn handle_download_shopping_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;

        let lines = resources
            .database
            .collections()
            .cart_lines(auth.user_id())
            .await?;
        let items = shopping_list::aggregate(lines);
        let document = shopping_list::render_text(&items);

        let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{FILENAME}\""))
            .map_err(|e| AppError::internal(format!("Invalid Content-Disposition: {e}")))?;

        Ok((
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                ),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            document,
        )
            .into_response())
    }
}
