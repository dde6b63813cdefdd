// ABOUTME: Social relation models: author subscriptions and per-user recipe collections
// ABOUTME: RecipeCollection names the favorites and shopping-cart join tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Directed follow relation: `user_id` follows `author_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Database identifier
    pub id: i64,
    /// Follower
    pub user_id: i64,
    /// Followed author
    pub author_id: i64,
    /// When the subscription was created
    pub created_at: DateTime<Utc>,
}

/// Per-user set of bookmarked recipes
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecipeCollection {
    /// Favorite recipes
    Favorites,
    /// Recipes staged for the shopping list
    ShoppingCart,
}

impl RecipeCollection {
    /// String representation used in logs and URLs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Favorites => "favorite",
            Self::ShoppingCart => "shopping_cart",
        }
    }

    /// Join table backing this collection
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::ShoppingCart => "shopping_carts",
        }
    }

    /// Human readable collection name for error messages
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::ShoppingCart => "the shopping cart",
        }
    }
}

impl Display for RecipeCollection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecipeCollection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "favorite" | "favorites" => Ok(Self::Favorites),
            "shopping_cart" => Ok(Self::ShoppingCart),
            _ => Err(AppError::invalid_input(format!(
                "Invalid recipe collection: {s}"
            ))),
        }
    }
}
