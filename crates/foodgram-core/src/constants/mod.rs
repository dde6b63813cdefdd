// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Field limits, pagination defaults, route paths and service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

//! Constants grouped by domain.

/// Field length and value limits mirrored by the database schema
pub mod limits {
    /// Maximum email length
    pub const EMAIL_MAX_LEN: usize = 254;
    /// Maximum username, first name and last name length
    pub const USER_NAME_MAX_LEN: usize = 150;
    /// Minimum password length
    pub const PASSWORD_MIN_LEN: usize = 8;
    /// Maximum password length accepted before hashing
    pub const PASSWORD_MAX_LEN: usize = 128;
    /// Maximum tag, ingredient, unit and recipe name length
    pub const NAME_MAX_LEN: usize = 200;
    /// Maximum tag slug length
    pub const SLUG_MAX_LEN: usize = 100;
    /// Tag color length (`#RRGGBB`)
    pub const COLOR_LEN: usize = 7;
    /// Maximum recipe description length
    pub const RECIPE_TEXT_MAX_LEN: usize = 1000;
    /// Minimum cooking time and ingredient amount
    pub const MIN_POSITIVE_SMALL: u16 = 1;
    /// Maximum cooking time and ingredient amount (positive small integer)
    pub const MAX_POSITIVE_SMALL: u16 = 32_767;
}

/// Pagination defaults
pub mod pagination {
    /// Default page size for paginated endpoints
    pub const DEFAULT_PAGE_SIZE: u32 = 6;
    /// Upper bound for the `limit` parameter
    pub const MAX_PAGE_SIZE: u32 = 100;
}

/// Service identification
pub mod service_names {
    /// Server binary / tracing target name
    pub const FOODGRAM_SERVER: &str = "foodgram_server";
    /// JWT audience claim
    pub const TOKEN_AUDIENCE: &str = "foodgram-api";
}

/// Shopping list download
pub mod shopping_list {
    /// Attachment filename
    pub const FILENAME: &str = "shopping_cart.txt";
    /// Document heading
    pub const TITLE: &str = "Shopping list";
    /// Placeholder for an empty cart
    pub const EMPTY_PLACEHOLDER: &str = "Shopping list is empty.";
}

/// User roles stored in the database
pub mod roles {
    /// Regular authenticated user
    pub const USER: &str = "user";
    /// Administrator, may edit any recipe
    pub const ADMIN: &str = "admin";
}
