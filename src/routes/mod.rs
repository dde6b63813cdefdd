// ABOUTME: REST route modules of the Foodgram API
// ABOUTME: One route struct per resource plus helpers shared by the handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

//! # Routes
//!
//! Every module exposes a unit struct with `routes(resources)` returning an
//! axum `Router` with state applied; [`crate::server::build_router`] merges them.

/// Token login and logout
pub mod auth;
/// Health check
pub mod health;
/// Ingredient catalogue
pub mod ingredients;
/// Recipes, favorites and shopping cart
pub mod recipes;
/// Tags
pub mod tags;
/// Users and subscriptions
pub mod users;

pub use auth::AuthRoutes;
pub use health::HealthRoutes;
pub use ingredients::IngredientRoutes;
pub use recipes::RecipeRoutes;
pub use tags::TagRoutes;
pub use users::UserRoutes;

use url::form_urlencoded;

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::pagination::{PageParams, PageQuery};
use crate::resources::ServerResources;

/// Parse `page` and `limit` from a raw query string
///
/// # Errors
///
/// Returns a field-tagged validation error for non-numeric or zero values
pub(crate) fn page_params(
    raw_query: Option<&str>,
    resources: &ServerResources,
) -> AppResult<PageParams> {
    let mut query = PageQuery::default();
    for (key, value) in query_pairs(raw_query) {
        match key.as_str() {
            "page" => query.page = Some(parse_number("page", &value)?),
            "limit" => query.limit = Some(parse_number("limit", &value)?),
            _ => {}
        }
    }
    PageParams::from_query(&query, resources.config.default_page_size)
}

/// Decoded `key=value` pairs of a query string
pub(crate) fn query_pairs(raw_query: Option<&str>) -> Vec<(String, String)> {
    raw_query
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Parse a numeric query parameter
///
/// # Errors
///
/// Returns `InvalidFormat` tagged with `field`
pub(crate) fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> AppResult<T> {
    value.trim().parse().map_err(|_| {
        AppError::field(
            ErrorCode::InvalidFormat,
            field,
            format!("'{field}' must be a number"),
        )
    })
}

/// Interpret a boolean-ish query flag (`1`, `true`)
pub(crate) fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
