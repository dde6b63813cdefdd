// ABOUTME: Recipe catalogue models: tags, ingredients, recipes and their request payloads
// ABOUTME: Request validation turns raw JSON bodies into checked NewRecipe / RecipePatch values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use foodgram_core::constants::limits::{
    COLOR_LEN, MAX_POSITIVE_SMALL, MIN_POSITIVE_SMALL, NAME_MAX_LEN, RECIPE_TEXT_MAX_LEN,
    SLUG_MAX_LEN,
};
use serde::{Deserialize, Serialize};

use super::validation;
use crate::errors::{AppError, AppResult, ErrorCode};

// ============================================================================
// Catalogue
// ============================================================================

/// Recipe tag (breakfast, lunch, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Database identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// `#RRGGBB` color
    pub color: String,
    /// URL slug used by the recipe filter
    pub slug: String,
}

/// Tag to be inserted by the admin tooling
#[derive(Debug, Clone, Deserialize)]
pub struct NewTag {
    /// Display name
    pub name: String,
    /// `#RRGGBB` color
    pub color: String,
    /// URL slug
    pub slug: String,
}

impl NewTag {
    /// Validate and normalize the tag fields
    ///
    /// # Errors
    ///
    /// Returns a field-tagged validation error
    pub fn validate(&self) -> AppResult<Self> {
        let color = validation::hex_color(&self.color)?;
        debug_assert_eq!(color.len(), COLOR_LEN);
        Ok(Self {
            name: validation::required_text("name", &self.name, NAME_MAX_LEN)?,
            color,
            slug: validation::slug(&self.slug, SLUG_MAX_LEN)?,
        })
    }
}

/// Ingredient with its unit of measurement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Database identifier
    pub id: i64,
    /// Name
    pub name: String,
    /// Unit of measurement (g, ml, pcs, ...)
    pub measurement_unit: String,
}

/// Ingredient to be inserted by the admin tooling
#[derive(Debug, Clone, Deserialize)]
pub struct NewIngredient {
    /// Name
    pub name: String,
    /// Unit of measurement
    pub measurement_unit: String,
}

impl NewIngredient {
    /// Validate and trim the ingredient fields
    ///
    /// # Errors
    ///
    /// Returns a field-tagged validation error
    pub fn validate(&self) -> AppResult<Self> {
        Ok(Self {
            name: validation::required_text("name", &self.name, NAME_MAX_LEN)?,
            measurement_unit: validation::required_text(
                "measurement_unit",
                &self.measurement_unit,
                NAME_MAX_LEN,
            )?,
        })
    }
}

// ============================================================================
// Recipes
// ============================================================================

/// Stored recipe row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Database identifier
    pub id: i64,
    /// Owner
    pub author_id: i64,
    /// Title
    pub name: String,
    /// Media-relative image path
    pub image: String,
    /// Description / cooking steps
    pub text: String,
    /// Minutes
    pub cooking_time: u16,
    /// Publication timestamp
    pub pub_date: DateTime<Utc>,
}

/// Ingredient line of a recipe, as shown to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// Ingredient identifier
    pub id: i64,
    /// Ingredient name
    pub name: String,
    /// Unit of measurement
    pub measurement_unit: String,
    /// Quantity in `measurement_unit`
    pub amount: u16,
}

/// `{id, amount}` pair in recipe write requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    /// Ingredient identifier
    pub id: i64,
    /// Requested quantity (validated to 1..=32767)
    pub amount: i64,
}

/// `POST /api/recipes/` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecipeRequest {
    /// Ingredient lines
    pub ingredients: Vec<IngredientAmount>,
    /// Tag identifiers
    #[serde(default)]
    pub tags: Vec<i64>,
    /// Base64 data URL
    pub image: String,
    /// Title
    pub name: String,
    /// Description
    pub text: String,
    /// Minutes
    pub cooking_time: i64,
}

/// `PATCH /api/recipes/{id}/` body; absent fields stay unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRecipeRequest {
    /// Replacement ingredient lines
    pub ingredients: Option<Vec<IngredientAmount>>,
    /// Replacement tag identifiers
    pub tags: Option<Vec<i64>>,
    /// New base64 data URL
    pub image: Option<String>,
    /// New title
    pub name: Option<String>,
    /// New description
    pub text: Option<String>,
    /// New cooking time
    pub cooking_time: Option<i64>,
}

/// Validated ingredient line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidAmount {
    /// Ingredient identifier
    pub ingredient_id: i64,
    /// Quantity
    pub amount: u16,
}

/// Validated recipe content ready for insertion (image stored separately)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    /// Title
    pub name: String,
    /// Description
    pub text: String,
    /// Minutes
    pub cooking_time: u16,
    /// Ingredient lines, unique by ingredient
    pub ingredients: Vec<ValidAmount>,
    /// Tag identifiers, unique
    pub tags: Vec<i64>,
}

/// Validated partial update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipePatch {
    /// New title
    pub name: Option<String>,
    /// New description
    pub text: Option<String>,
    /// New cooking time
    pub cooking_time: Option<u16>,
    /// Replacement ingredient lines
    pub ingredients: Option<Vec<ValidAmount>>,
    /// Replacement tags
    pub tags: Option<Vec<i64>>,
}

impl RecipePatch {
    /// Whether the patch touches no stored column or relation
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.text.is_none()
            && self.cooking_time.is_none()
            && self.ingredients.is_none()
            && self.tags.is_none()
    }
}

fn validate_ingredients(lines: &[IngredientAmount]) -> AppResult<Vec<ValidAmount>> {
    if lines.is_empty() {
        return Err(AppError::field(
            ErrorCode::MissingRequiredField,
            "ingredients",
            "A recipe needs at least one ingredient",
        ));
    }

    let mut seen = HashSet::with_capacity(lines.len());
    lines
        .iter()
        .map(|line| {
            if !seen.insert(line.id) {
                return Err(AppError::field(
                    ErrorCode::InvalidInput,
                    "ingredients",
                    format!("Ingredient {} is listed more than once", line.id),
                ));
            }
            Ok(ValidAmount {
                ingredient_id: line.id,
                amount: validation::in_range(
                    "amount",
                    line.amount,
                    MIN_POSITIVE_SMALL,
                    MAX_POSITIVE_SMALL,
                )?,
            })
        })
        .collect()
}

fn validate_tags(tags: &[i64]) -> AppResult<Vec<i64>> {
    let mut seen = HashSet::with_capacity(tags.len());
    for tag in tags {
        if !seen.insert(*tag) {
            return Err(AppError::field(
                ErrorCode::InvalidInput,
                "tags",
                format!("Tag {tag} is listed more than once"),
            ));
        }
    }
    Ok(tags.to_vec())
}

fn validate_cooking_time(minutes: i64) -> AppResult<u16> {
    validation::in_range("cooking_time", minutes, MIN_POSITIVE_SMALL, MAX_POSITIVE_SMALL)
}

fn validate_name(name: &str) -> AppResult<String> {
    validation::required_text("name", name, NAME_MAX_LEN)
}

fn validate_text(text: &str) -> AppResult<String> {
    validation::required_text("text", text, RECIPE_TEXT_MAX_LEN)
}

impl CreateRecipeRequest {
    /// Validate the body; ingredient and tag existence is checked by the database layer
    ///
    /// # Errors
    ///
    /// Returns a field-tagged validation error
    pub fn validate(&self) -> AppResult<NewRecipe> {
        Ok(NewRecipe {
            name: validate_name(&self.name)?,
            text: validate_text(&self.text)?,
            cooking_time: validate_cooking_time(self.cooking_time)?,
            ingredients: validate_ingredients(&self.ingredients)?,
            tags: validate_tags(&self.tags)?,
        })
    }
}

impl UpdateRecipeRequest {
    /// Validate the fields present in the body
    ///
    /// # Errors
    ///
    /// Returns a field-tagged validation error
    pub fn validate(&self) -> AppResult<RecipePatch> {
        Ok(RecipePatch {
            name: self.name.as_deref().map(validate_name).transpose()?,
            text: self.text.as_deref().map(validate_text).transpose()?,
            cooking_time: self.cooking_time.map(validate_cooking_time).transpose()?,
            ingredients: self
                .ingredients
                .as_deref()
                .map(validate_ingredients)
                .transpose()?,
            tags: self.tags.as_deref().map(validate_tags).transpose()?,
        })
    }
}

/// Query filters of `GET /api/recipes/`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Only recipes by this author
    pub author: Option<i64>,
    /// Any-of tag slugs
    pub tags: Vec<String>,
    /// Only recipes favorited by this user
    pub favorited_by: Option<i64>,
    /// Only recipes in this user's shopping cart
    pub in_cart_of: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateRecipeRequest {
        CreateRecipeRequest {
            ingredients: vec![
                IngredientAmount { id: 1, amount: 200 },
                IngredientAmount { id: 2, amount: 5 },
            ],
            tags: vec![1, 2],
            image: "data:image/png;base64,iVBORw0KGgo=".to_owned(),
            name: "Pancakes".to_owned(),
            text: "Mix and fry".to_owned(),
            cooking_time: 20,
        }
    }

    #[test]
    fn test_valid_create_request() {
        let recipe = create_request().validate().unwrap();
        assert_eq!(recipe.cooking_time, 20);
        assert_eq!(
            recipe.ingredients[0],
            ValidAmount {
                ingredient_id: 1,
                amount: 200
            }
        );
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut request = create_request();
        request.ingredients[1].amount = 0;
        let err = request.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert_eq!(err.details["field"], "amount");
    }

    #[test]
    fn test_duplicate_ingredient_rejected() {
        let mut request = create_request();
        request.ingredients.push(IngredientAmount { id: 1, amount: 10 });
        assert_eq!(request.validate().unwrap_err().details["field"], "ingredients");
    }

    #[test]
    fn test_empty_ingredients_rejected() {
        let mut request = create_request();
        request.ingredients.clear();
        assert_eq!(
            request.validate().unwrap_err().code,
            ErrorCode::MissingRequiredField
        );
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let mut request = create_request();
        request.tags = vec![3, 3];
        assert_eq!(request.validate().unwrap_err().details["field"], "tags");
    }

    #[test]
    fn test_cooking_time_must_be_positive() {
        let mut request = create_request();
        request.cooking_time = 0;
        assert_eq!(
            request.validate().unwrap_err().details["field"],
            "cooking_time"
        );
    }

    #[test]
    fn test_patch_validates_only_present_fields() {
        let patch = UpdateRecipeRequest {
            name: Some("  Crepes ".to_owned()),
            ..UpdateRecipeRequest::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.name.as_deref(), Some("Crepes"));
        assert!(patch.ingredients.is_none());
        assert!(!patch.is_empty());

        let empty = UpdateRecipeRequest::default().validate().unwrap();
        assert!(empty.is_empty());

        let bad = UpdateRecipeRequest {
            ingredients: Some(Vec::new()),
            ..UpdateRecipeRequest::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_new_tag_validation() {
        let tag = NewTag {
            name: "Breakfast".to_owned(),
            color: "#e26c2d".to_owned(),
            slug: "breakfast".to_owned(),
        }
        .validate()
        .unwrap();
        assert_eq!(tag.color, "#E26C2D");
    }
}
