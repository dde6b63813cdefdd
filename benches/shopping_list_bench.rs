// ABOUTME: Criterion benchmarks for shopping list aggregation and rendering
// ABOUTME: Measures summing cart lines per (name, unit) for carts of increasing size
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

//! Criterion benchmarks for the shopping list service.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::cast_possible_wrap,
    clippy::unwrap_used,
    missing_docs
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use foodgram_server::services::shopping_list::{aggregate, render_text, CartLine};

const UNITS: [&str; 4] = ["g", "ml", "pcs", "tbsp"];

/// `recipes` recipes with `per_recipe` lines each, drawn from a catalogue of 50 ingredients
fn cart(recipes: usize, per_recipe: usize) -> Vec<CartLine> {
    (0..recipes)
        .flat_map(|recipe| {
            (0..per_recipe).map(move |line| {
                let ingredient = (recipe * 7 + line * 3) % 50;
                CartLine {
                    name: format!("ingredient-{ingredient:02}"),
                    measurement_unit: UNITS[ingredient % UNITS.len()].to_owned(),
                    amount: ((recipe + line) % 500 + 1) as i64,
                }
            })
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("shopping_list_aggregate");

    for recipes in [1_usize, 10, 100] {
        let lines = cart(recipes, 12);
        group.throughput(Throughput::Elements(lines.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(recipes), &lines, |b, lines| {
            b.iter(|| aggregate(black_box(lines.clone())));
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let items = aggregate(cart(100, 12));

    c.bench_function("shopping_list_render", |b| {
        b.iter(|| render_text(black_box(&items)));
    });
}

criterion_group!(benches, bench_aggregate, bench_render);
criterion_main!(benches);
