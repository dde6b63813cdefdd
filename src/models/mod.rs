// ABOUTME: Core domain models for users, recipes and social relations
// ABOUTME: Re-exports User, Recipe, Tag, Ingredient, Subscription and request payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

//! # Data Models
//!
//! Plain data types shared by the database managers and the HTTP routes.
//! Request payloads validate themselves into checked values (`NewRecipe`,
//! `RecipePatch`, `ValidatedRegistration`) before anything is written.

/// Recipes, tags and ingredients
pub mod recipe;
/// Subscriptions and recipe collections
pub mod social;
/// User accounts
pub mod user;
/// Field validation helpers
pub mod validation;

pub use recipe::{
    CreateRecipeRequest, Ingredient, IngredientAmount, NewIngredient, NewRecipe, NewTag, Recipe,
    RecipeFilter, RecipeIngredient, RecipePatch, Tag, UpdateRecipeRequest, ValidAmount,
};
pub use social::{RecipeCollection, Subscription};
pub use user::{NewUser, RegisterRequest, User, UserRole, ValidatedRegistration};
