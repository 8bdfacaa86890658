//! Venue layout descriptors.
//!
//! A descriptor is one of five layout dialects. The JSON form carries the dialect
//! in a `type` tag, e.g. `{"type": "grid_rows", "rows": 10, "cols": 20, ...}`.
//! Numeric fields are plain `f64` so that whatever the floor-plan editor sends
//! still deserializes; the compiler decides what is usable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::TenantId;

/// Tier/price defaults declared at descriptor level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDefaults {
    #[serde(default)]
    pub default_tier: Option<String>,
    #[serde(default)]
    pub default_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutDescriptor {
    GridRows(GridRows),
    ConcentricRings(ConcentricRings),
    ClusterTables(ClusterTables),
    FreeformObjects(FreeformObjects),
    LegacySections(LegacySections),
}

impl LayoutDescriptor {
    pub fn dialect(&self) -> &'static str {
        match self {
            LayoutDescriptor::GridRows(_) => "grid_rows",
            LayoutDescriptor::ConcentricRings(_) => "concentric_rings",
            LayoutDescriptor::ClusterTables(_) => "cluster_tables",
            LayoutDescriptor::FreeformObjects(_) => "freeform_objects",
            LayoutDescriptor::LegacySections(_) => "legacy_sections",
        }
    }

    pub fn defaults(&self) -> &LayoutDefaults {
        match self {
            LayoutDescriptor::GridRows(d) => &d.defaults,
            LayoutDescriptor::ConcentricRings(d) => &d.defaults,
            LayoutDescriptor::ClusterTables(d) => &d.defaults,
            LayoutDescriptor::FreeformObjects(d) => &d.defaults,
            LayoutDescriptor::LegacySections(d) => &d.defaults,
        }
    }
}

// Ряды и колонки; полосы рядов переопределяют тир/цену
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRows {
    #[serde(default)]
    pub section: Option<String>,
    pub rows: f64,
    pub cols: f64,
    /// Columns that are exact multiples of this value are left empty as aisles.
    /// Zero disables aisles.
    #[serde(default)]
    pub aisle_every: f64,
    #[serde(flatten)]
    pub defaults: LayoutDefaults,
    #[serde(default)]
    pub bands: Vec<RowBand>,
}

/// Tier/price override for an inclusive range of zero-based row indexes.
/// A missing `end_row_index` extends the band to the last row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowBand {
    pub start_row_index: f64,
    #[serde(default)]
    pub end_row_index: Option<f64>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentricRings {
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub center_x: f64,
    #[serde(default)]
    pub center_y: f64,
    #[serde(flatten)]
    pub defaults: LayoutDefaults,
    #[serde(default)]
    pub rings: Vec<Ring>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub radius: f64,
    pub sector_count: f64,
    pub seats_per_sector: f64,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterTables {
    #[serde(default)]
    pub section: Option<String>,
    #[serde(flatten)]
    pub defaults: LayoutDefaults,
    #[serde(default)]
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub x: f64,
    pub y: f64,
    pub seat_count: f64,
    pub radius: f64,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeformObjects {
    #[serde(flatten)]
    pub defaults: LayoutDefaults,
    #[serde(default)]
    pub objects: Vec<FreeformObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FreeformObject {
    SeatingCluster(SeatingCluster),
    Seat(StandaloneSeat),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatingCluster {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub total_seats: Option<f64>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandaloneSeat {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacySections {
    #[serde(flatten)]
    pub defaults: LayoutDefaults,
    #[serde(default)]
    pub sections: Vec<LegacySection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacySection {
    pub name: String,
    #[serde(default)]
    pub base_price: Option<f64>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub rows: Vec<LegacyRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyRow {
    pub label: String,
    pub seat_count: f64,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub x_offset: f64,
    #[serde(default)]
    pub y_offset: f64,
}

/// Global end of the tier/price precedence chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    #[serde(default = "PricingPolicy::fallback_tier")]
    pub default_tier: String,
    #[serde(default)]
    pub default_price: f64,
    /// Price per tier, consulted when nothing in the layout names a price.
    #[serde(default)]
    pub tier_prices: BTreeMap<String, f64>,
}

impl PricingPolicy {
    pub const GLOBAL_DEFAULT_TIER: &'static str = "General";

    fn fallback_tier() -> String {
        Self::GLOBAL_DEFAULT_TIER.to_string()
    }

    pub fn with_tier_price(mut self, tier: impl Into<String>, price: f64) -> Self {
        self.tier_prices.insert(tier.into(), price);
        self
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            default_tier: Self::fallback_tier(),
            default_price: 0.0,
            tier_prices: BTreeMap::new(),
        }
    }
}

/// A descriptor as configured for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLayout {
    pub event_id: i64,
    pub tenant_id: TenantId,
    pub descriptor: LayoutDescriptor,
    pub pricing: PricingPolicy,
}
