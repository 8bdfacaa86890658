#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;

use seat_inventory::layout::{compile, GRID_UNIT};
use seat_inventory::models::{LayoutDescriptor, PricingPolicy};

fn descriptor(value: serde_json::Value) -> LayoutDescriptor {
    serde_json::from_value(value).unwrap()
}

fn grid(rows: u32, cols: u32, aisle_every: u32) -> LayoutDescriptor {
    descriptor(json!({
        "type": "grid_rows",
        "rows": rows,
        "cols": cols,
        "aisle_every": aisle_every,
        "default_price": 50.0,
    }))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn grid_emits_every_non_aisle_cell_once(rows in 1u32..30, cols in 1u32..40, aisle in 0u32..8) {
        let compiled = compile(&grid(rows, cols, aisle), &PricingPolicy::default(), 100_000);

        let per_row = if aisle > 0 { cols - cols / aisle } else { cols };
        prop_assert_eq!(compiled.seats.len() as u32, rows * per_row);
        prop_assert!(!compiled.truncated);

        let addresses: HashSet<_> = compiled.seats.iter().map(|s| s.address()).collect();
        prop_assert_eq!(addresses.len(), compiled.seats.len());
    }

    #[test]
    fn grid_positions_follow_the_unit(rows in 1u32..10, cols in 1u32..10) {
        let compiled = compile(&grid(rows, cols, 0), &PricingPolicy::default(), 100_000);
        for seat in &compiled.seats {
            prop_assert_eq!(seat.x % GRID_UNIT, 0.0);
            prop_assert_eq!(seat.y % GRID_UNIT, 0.0);
            prop_assert!(seat.x >= GRID_UNIT);
            prop_assert!(seat.y < rows as f64 * GRID_UNIT);
        }
    }

    #[test]
    fn ring_seats_are_equidistant_from_center(
        cx in -500.0f64..500.0,
        cy in -500.0f64..500.0,
        radius in 1.0f64..400.0,
        sectors in 1u32..8,
        per_sector in 1u32..12,
    ) {
        let layout = descriptor(json!({
            "type": "concentric_rings",
            "center_x": cx,
            "center_y": cy,
            "rings": [{ "radius": radius, "sector_count": sectors, "seats_per_sector": per_sector }],
        }));
        let compiled = compile(&layout, &PricingPolicy::default(), 100_000);

        prop_assert_eq!(compiled.seats.len() as u32, sectors * per_sector);
        for seat in &compiled.seats {
            let distance = ((seat.x - cx).powi(2) + (seat.y - cy).powi(2)).sqrt();
            prop_assert!((distance - radius).abs() < 1e-6);
        }
    }

    #[test]
    fn output_never_exceeds_the_cap(rows in 1u32..60, cols in 1u32..60, cap in 1usize..500) {
        let compiled = compile(&grid(rows, cols, 0), &PricingPolicy::default(), cap);

        let full = (rows * cols) as usize;
        prop_assert_eq!(compiled.seats.len(), full.min(cap));
        prop_assert_eq!(compiled.truncated, full > cap);
    }

    #[test]
    fn compilation_is_deterministic(rows in 1u32..20, cols in 1u32..20, aisle in 0u32..5) {
        let layout = grid(rows, cols, aisle);
        let policy = PricingPolicy::default().with_tier_price("General", 12.5);
        prop_assert_eq!(compile(&layout, &policy, 10_000), compile(&layout, &policy, 10_000));
    }

    #[test]
    fn unusable_table_shapes_are_skipped_not_fatal(seat_count in -5i32..1, good in 1u32..10) {
        let layout = descriptor(json!({
            "type": "cluster_tables",
            "tables": [
                { "x": 0.0, "y": 0.0, "seat_count": seat_count, "radius": 30.0 },
                { "x": 100.0, "y": 0.0, "seat_count": good, "radius": 30.0 },
            ],
        }));
        let compiled = compile(&layout, &PricingPolicy::default(), 10_000);

        prop_assert_eq!(compiled.skipped_units, 1);
        prop_assert_eq!(compiled.seats.len() as u32, good);
        prop_assert!(compiled.seats.iter().all(|s| s.row_label == "T2"));
    }
}
