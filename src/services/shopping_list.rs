// ABOUTME: Shopping list aggregation over the ingredient lines of a user's cart
// ABOUTME: Pure functions: sum amounts per (name, unit) and render the downloadable text document
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use std::collections::BTreeMap;
use std::fmt;

use foodgram_core::constants::shopping_list::{EMPTY_PLACEHOLDER, TITLE};
use serde::Serialize;

/// One ingredient line of one recipe in the cart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Ingredient name
    pub name: String,
    /// Unit of measurement
    pub measurement_unit: String,
    /// Amount in this recipe
    pub amount: i64,
}

/// Aggregated shopping list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingItem {
    /// Ingredient name
    pub name: String,
    /// Unit of measurement
    pub measurement_unit: String,
    /// Total amount across the cart
    pub total: u64,
}

impl fmt::Display for ShoppingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \u{2014} {} {}", self.name, self.total, self.measurement_unit)
    }
}

/// Sum amounts per distinct (name, unit) pair, sorted by name then unit
///
/// Non-positive amounts cannot be stored and are ignored.
#[must_use]
pub fn aggregate<I>(lines: I) -> Vec<ShoppingItem>
where
    I: IntoIterator<Item = CartLine>,
{
    let mut totals: BTreeMap<(String, String), u64> = BTreeMap::new();
    for line in lines {
        let Ok(amount) = u64::try_from(line.amount) else {
            continue;
        };
        let total = totals.entry((line.name, line.measurement_unit)).or_insert(0);
        *total = total.saturating_add(amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), total)| ShoppingItem {
            name,
            measurement_unit,
            total,
        })
        .collect()
}

/// Render the plain text document served as the shopping list download
#[must_use]
pub fn render_text(items: &[ShoppingItem]) -> String {
    let mut document = format!("{TITLE}\n\n");
    if items.is_empty() {
        document.push_str(EMPTY_PLACEHOLDER);
        document.push('\n');
        return document;
    }

    for item in items {
        document.push_str(&item.to_string());
        document.push('\n');
    }
    document
}
