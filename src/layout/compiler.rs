use std::collections::HashSet;
use std::f64::consts::TAU;

use serde::Serialize;

use crate::models::layout::{
    ClusterTables, ConcentricRings, FreeformObject, FreeformObjects, GridRows, LegacySections,
    RowBand,
};
use crate::models::{LayoutDescriptor, PricingPolicy, SeatSpec};

use super::labels::{given, row_label, seat_label};
use super::pricing::Resolver;

/// Distance between neighbouring seats in grid and legacy layouts.
pub const GRID_UNIT: f64 = 40.0;
/// Gap between a freeform cluster's outline and the seats placed around it.
pub const CLUSTER_MARGIN: f64 = 20.0;

const GRID_SECTION: &str = "Main";
const RING_SECTION: &str = "Arena";
const TABLE_SECTION: &str = "Floor";
const FREEFORM_SECTION: &str = "General";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledLayout {
    pub seats: Vec<SeatSpec>,
    /// Emission stopped at the safety cap.
    pub truncated: bool,
    /// Rows, rings, tables or objects dropped because their shape was unusable.
    pub skipped_units: usize,
    /// Seats dropped because their address was already taken.
    pub duplicates: usize,
}

/// Compiles a descriptor into seat specs, emitting at most `safety_cap` seats.
///
/// Pure and deterministic. Unusable units (NaN radius, negative counts, objects
/// without a seat count) are skipped and counted instead of failing the whole
/// layout.
pub fn compile(
    descriptor: &LayoutDescriptor,
    policy: &PricingPolicy,
    safety_cap: usize,
) -> CompiledLayout {
    let resolver = Resolver::new(descriptor.defaults(), policy);
    let mut out = Emitter::new(safety_cap);

    match descriptor {
        LayoutDescriptor::GridRows(grid) => compile_grid(grid, &resolver, &mut out),
        LayoutDescriptor::ConcentricRings(rings) => compile_rings(rings, &resolver, &mut out),
        LayoutDescriptor::ClusterTables(tables) => compile_tables(tables, &resolver, &mut out),
        LayoutDescriptor::FreeformObjects(objects) => {
            compile_freeform(objects, &resolver, &mut out)
        }
        LayoutDescriptor::LegacySections(sections) => {
            compile_legacy(sections, &resolver, &mut out)
        }
    }

    out.finish()
}

/// Collects specs, enforces the cap and drops repeated addresses.
struct Emitter {
    seats: Vec<SeatSpec>,
    seen: HashSet<(String, String, String)>,
    rows: HashSet<(String, String)>,
    cap: usize,
    truncated: bool,
    skipped_units: usize,
    duplicates: usize,
}

impl Emitter {
    fn new(cap: usize) -> Self {
        Self {
            seats: Vec::new(),
            seen: HashSet::new(),
            rows: HashSet::new(),
            cap,
            truncated: false,
            skipped_units: 0,
            duplicates: 0,
        }
    }

    /// Returns `false` once the cap is hit; callers stop emitting.
    fn push(&mut self, spec: SeatSpec) -> bool {
        if self.seats.len() >= self.cap {
            self.truncated = true;
            return false;
        }
        let key = (
            spec.section.clone(),
            spec.row_label.clone(),
            spec.seat_label.clone(),
        );
        if self.seen.insert(key) {
            self.seats.push(spec);
        } else {
            self.duplicates += 1;
        }
        true
    }

    /// Claims a row label within a section for one unit. A unit whose row is
    /// already taken could only repeat addresses, so it is dropped whole.
    fn claim_row(&mut self, section: &str, row: &str, seats: u64) -> bool {
        if self.rows.insert((section.to_string(), row.to_string())) {
            return true;
        }
        self.duplicates = self.duplicates.saturating_add(seats as usize);
        false
    }

    fn skip(&mut self) {
        self.skipped_units += 1;
    }

    fn finish(self) -> CompiledLayout {
        CompiledLayout {
            seats: self.seats,
            truncated: self.truncated,
            skipped_units: self.skipped_units,
            duplicates: self.duplicates,
        }
    }
}

// NaN, бесконечность и отрицательные значения дают 0
fn count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.floor().min(u32::MAX as f64) as u64
    } else {
        0
    }
}

fn length(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn point(x: f64, y: f64) -> Option<(f64, f64)> {
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

fn band_for(bands: &[RowBand], row: u64) -> Option<&RowBand> {
    let row = row as f64;
    bands.iter().rev().find(|band| {
        row >= band.start_row_index
            && band
                .end_row_index
                .map_or(true, |end| !end.is_nan() && row <= end)
    })
}

fn seat(section: &str, row: &str, index: u64, tier: &str, price: f64, x: f64, y: f64) -> SeatSpec {
    SeatSpec {
        section: section.to_string(),
        row_label: row.to_string(),
        seat_label: seat_label(row, index as u32),
        tier: tier.to_string(),
        base_price: price,
        x,
        y,
        is_available: true,
    }
}

/// Emits `total` seats evenly spaced on a circle, starting at angle 0.
#[allow(clippy::too_many_arguments)]
fn emit_circle(
    out: &mut Emitter,
    section: &str,
    row: &str,
    tier: &str,
    price: f64,
    center: (f64, f64),
    radius: f64,
    total: u64,
) -> bool {
    for i in 0..total {
        let angle = TAU * i as f64 / total as f64;
        let x = center.0 + radius * angle.cos();
        let y = center.1 + radius * angle.sin();
        if !out.push(seat(section, row, i + 1, tier, price, x, y)) {
            return false;
        }
    }
    true
}

fn compile_grid(grid: &GridRows, resolver: &Resolver<'_>, out: &mut Emitter) {
    let rows = count(grid.rows);
    let cols = count(grid.cols);
    let aisle = count(grid.aisle_every);
    let usable_cols = if aisle > 0 { cols - cols / aisle } else { cols };
    if rows == 0 || usable_cols == 0 {
        out.skip();
        return;
    }

    let section = given(grid.section.as_deref()).unwrap_or(GRID_SECTION);
    for row in 0..rows {
        let label = row_label(row as u32);
        let band = band_for(&grid.bands, row);
        let tier = resolver.tier(band.and_then(|b| b.tier.as_deref()), None);
        let price = resolver.price(band.and_then(|b| b.price), None, &tier);

        let mut index = 0;
        for col in 1..=cols {
            if aisle > 0 && col % aisle == 0 {
                continue;
            }
            index += 1;
            let (x, y) = (col as f64 * GRID_UNIT, row as f64 * GRID_UNIT);
            if !out.push(seat(section, &label, index, &tier, price, x, y)) {
                return;
            }
        }
    }
}

fn compile_rings(layout: &ConcentricRings, resolver: &Resolver<'_>, out: &mut Emitter) {
    let Some(center) = point(layout.center_x, layout.center_y) else {
        out.skipped_units += layout.rings.len().max(1);
        return;
    };
    let section = given(layout.section.as_deref()).unwrap_or(RING_SECTION);

    for (i, ring) in layout.rings.iter().enumerate() {
        let total = count(ring.sector_count).saturating_mul(count(ring.seats_per_sector));
        let Some(radius) = length(ring.radius).filter(|_| total > 0) else {
            out.skip();
            continue;
        };
        let label = given(ring.name.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("R{}", i + 1));
        if !out.claim_row(section, &label, total) {
            continue;
        }
        let tier = resolver.tier(ring.tier.as_deref(), None);
        let price = resolver.price(ring.price, None, &tier);

        if !emit_circle(out, section, &label, &tier, price, center, radius, total) {
            return;
        }
    }
}

fn compile_tables(layout: &ClusterTables, resolver: &Resolver<'_>, out: &mut Emitter) {
    let section = given(layout.section.as_deref()).unwrap_or(TABLE_SECTION);

    for (i, table) in layout.tables.iter().enumerate() {
        let total = count(table.seat_count);
        let (Some(center), Some(radius)) = (point(table.x, table.y), length(table.radius)) else {
            out.skip();
            continue;
        };
        if total == 0 {
            out.skip();
            continue;
        }
        let label = given(table.name.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("T{}", i + 1));
        if !out.claim_row(section, &label, total) {
            continue;
        }
        let tier = resolver.tier(table.tier.as_deref(), None);
        let price = resolver.price(table.price, None, &tier);

        if !emit_circle(out, section, &label, &tier, price, center, radius, total) {
            return;
        }
    }
}

fn compile_freeform(layout: &FreeformObjects, resolver: &Resolver<'_>, out: &mut Emitter) {
    for (i, object) in layout.objects.iter().enumerate() {
        match object {
            FreeformObject::SeatingCluster(cluster) => {
                let total = cluster.total_seats.map_or(0, count);
                let Some((x, y)) = point(cluster.x, cluster.y).filter(|_| total > 0) else {
                    out.skip();
                    continue;
                };
                let width = length(cluster.width).unwrap_or(0.0);
                let height = length(cluster.height).unwrap_or(0.0);
                let center = (x + width / 2.0, y + height / 2.0);
                let radius = width.max(height) / 2.0 + CLUSTER_MARGIN;

                let section = given(cluster.section.as_deref()).unwrap_or(FREEFORM_SECTION);
                let label = given(cluster.label.as_deref())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("C{}", i + 1));
                if !out.claim_row(section, &label, total) {
                    continue;
                }
                let tier = resolver.tier(cluster.tier.as_deref(), None);
                let price = resolver.price(cluster.price, None, &tier);

                if !emit_circle(out, section, &label, &tier, price, center, radius, total) {
                    return;
                }
            }
            FreeformObject::Seat(single) => {
                let Some((x, y)) = point(single.x, single.y) else {
                    out.skip();
                    continue;
                };
                let section = given(single.section.as_deref()).unwrap_or(FREEFORM_SECTION);
                let label = given(single.label.as_deref())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("S{}", i + 1));
                if !out.claim_row(section, &label, 1) {
                    continue;
                }
                let tier = resolver.tier(single.tier.as_deref(), None);
                let price = resolver.price(single.price, None, &tier);

                if !out.push(seat(section, &label, 1, &tier, price, x, y)) {
                    return;
                }
            }
        }
    }
}

fn compile_legacy(layout: &LegacySections, resolver: &Resolver<'_>, out: &mut Emitter) {
    for (s, section) in layout.sections.iter().enumerate() {
        let name = given(Some(section.name.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Section {}", s + 1));

        for (r, row) in section.rows.iter().enumerate() {
            let total = count(row.seat_count);
            let Some((x0, y0)) = point(row.x_offset, row.y_offset).filter(|_| total > 0) else {
                out.skip();
                continue;
            };
            let label = given(Some(row.label.as_str()))
                .map(str::to_string)
                .unwrap_or_else(|| row_label(r as u32));
            if !out.claim_row(&name, &label, total) {
                continue;
            }
            let tier = resolver.tier(row.tier.as_deref(), section.tier.as_deref());
            let price = resolver.price(None, section.base_price, &tier);

            for i in 0..total {
                let x = x0 + i as f64 * GRID_UNIT;
                if !out.push(seat(&name, &label, i + 1, &tier, price, x, y0)) {
                    return;
                }
            }
        }
    }
}
