// ABOUTME: Re-exports pagination types from foodgram-core for unified type identity
// ABOUTME: Ensures PageParams/Page are the same type across all workspace crates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

pub use foodgram_core::pagination::*;
