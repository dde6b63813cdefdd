// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Pure computations kept free of HTTP and database concerns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

//! Domain service layer
//!
//! Services take plain data loaded by the database managers and return plain
//! data, so they are unit tested without any I/O.

/// Shopping list aggregation and rendering
pub mod shopping_list;
