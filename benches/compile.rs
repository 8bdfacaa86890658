//! Layout compilation throughput.
//!
//! Run with: `cargo bench --bench compile`

#![allow(clippy::expect_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;

use seat_inventory::layout::compile;
use seat_inventory::models::{LayoutDescriptor, PricingPolicy};

fn descriptor(value: serde_json::Value) -> LayoutDescriptor {
    serde_json::from_value(value).expect("valid descriptor")
}

fn bench_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_grid");
    let policy = PricingPolicy::default().with_tier_price("Premium", 120.0);

    for (rows, cols) in [(20u32, 30u32), (60, 100), (140, 140)] {
        let layout = descriptor(json!({
            "type": "grid_rows",
            "rows": rows,
            "cols": cols,
            "aisle_every": 11,
            "bands": [{ "start_row_index": 0, "end_row_index": 4, "tier": "Premium" }],
        }));
        group.throughput(Throughput::Elements(u64::from(rows * cols)));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", rows, cols)),
            &layout,
            |b, layout| b.iter(|| compile(black_box(layout), &policy, 20_000)),
        );
    }
    group.finish();
}

fn bench_rings(c: &mut Criterion) {
    let rings: Vec<_> = (1..=20)
        .map(|i| json!({ "radius": 50.0 * i as f64, "sector_count": 8, "seats_per_sector": 10 + i }))
        .collect();
    let layout = descriptor(json!({ "type": "concentric_rings", "rings": rings }));
    let policy = PricingPolicy::default();

    c.bench_function("compile_rings_20", |b| {
        b.iter(|| compile(black_box(&layout), &policy, 20_000))
    });
}

criterion_group!(benches, bench_grid, bench_rings);
criterion_main!(benches);
