// ABOUTME: Core types and constants for the Foodgram recipe-sharing service
// ABOUTME: Foundation crate with error handling, pagination and domain limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

#![deny(unsafe_code)]

//! # Foodgram Core
//!
//! Foundation crate shared by the server and the admin tooling. It changes
//! rarely, which keeps incremental builds of the main crate fast.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode` and the JSON error envelope
//! - **pagination**: page-number pagination (`page` / `limit`)
//! - **constants**: field limits and defaults mirrored by the schema

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Page-number pagination for list endpoints
pub mod pagination;
