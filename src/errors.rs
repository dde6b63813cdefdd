// ABOUTME: Re-exports error types from foodgram-core for unified type identity
// ABOUTME: Lets the server crate write crate::errors::AppError like every other module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

pub use foodgram_core::errors::*;
