// ABOUTME: Page-number pagination for list endpoints
// ABOUTME: Parses page/limit parameters and builds count/next/previous/results envelopes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::constants::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::errors::{AppError, AppResult, ErrorCode};

/// Raw pagination query parameters (`?page=2&limit=6`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<u32>,
    /// Page size
    pub limit: Option<u32>,
}

/// Validated pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// 1-based page number
    pub page: u32,
    /// Page size, at least 1
    pub limit: u32,
}

impl PageParams {
    /// Validate raw query parameters against the configured default page size
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` when `page` or `limit` is zero
    pub fn from_query(query: &PageQuery, default_limit: u32) -> AppResult<Self> {
        let page = query.page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::field(
                ErrorCode::ValueOutOfRange,
                "page",
                "Page numbers start at 1",
            ));
        }

        let limit = query.limit.unwrap_or(default_limit);
        if limit == 0 {
            return Err(AppError::field(
                ErrorCode::ValueOutOfRange,
                "limit",
                "Limit must be a positive number",
            ));
        }

        Ok(Self {
            page,
            limit: limit.min(MAX_PAGE_SIZE),
        })
    }

    /// SQL `OFFSET` for this page
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    /// SQL `LIMIT` for this page
    #[must_use]
    pub fn sql_limit(&self) -> i64 {
        i64::from(self.limit)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of items across all pages
    pub count: u64,
    /// Relative link to the next page
    pub next: Option<String>,
    /// Relative link to the previous page
    pub previous: Option<String>,
    /// Items on this page
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page envelope
    ///
    /// `path` and `raw_query` are the request path and query string; the
    /// generated links keep every query parameter except `page`.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the requested page lies past the last one
    pub fn new(
        results: Vec<T>,
        count: u64,
        params: PageParams,
        path: &str,
        raw_query: Option<&str>,
    ) -> AppResult<Self> {
        let last_page = count.div_ceil(u64::from(params.limit)).max(1);
        if u64::from(params.page) > last_page {
            return Err(AppError::new(ErrorCode::ResourceNotFound, "Invalid page"));
        }

        let link = |page: u32| page_link(path, raw_query, page);
        let next = (u64::from(params.page) < last_page).then(|| link(params.page + 1));
        let previous = (params.page > 1).then(|| link(params.page - 1));

        Ok(Self {
            count,
            next,
            previous,
            results,
        })
    }
}

fn page_link(path: &str, raw_query: Option<&str>, page: u32) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    if let Some(query) = raw_query {
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key != "page" {
                serializer.append_pair(&key, &value);
            }
        }
    }
    serializer.append_pair("page", &page.to_string());
    format!("{path}?{}", serializer.finish())
}
