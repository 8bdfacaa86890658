use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::TenantId;

/// One compiled seat, before it is bound to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatSpec {
    pub section: String,
    pub row_label: String,
    pub seat_label: String,
    pub tier: String,
    pub base_price: f64,
    pub x: f64,
    pub y: f64,
    pub is_available: bool,
}

impl SeatSpec {
    /// `(section, row, seat)` address, unique within one generation run.
    pub fn address(&self) -> (&str, &str, &str) {
        (&self.section, &self.row_label, &self.seat_label)
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SeatRecord {
    pub id: i64,
    pub event_id: i64,
    #[sqlx(try_from = "String")]
    pub tenant_id: TenantId,
    pub section: String,
    pub row_label: String,
    pub seat_label: String,
    pub tier: String,
    pub base_price: f64,
    pub x: f64,
    pub y: f64,
    pub is_available: bool,
}

impl SeatRecord {
    pub fn from_spec(id: i64, event_id: i64, tenant_id: TenantId, spec: SeatSpec) -> Self {
        Self {
            id,
            event_id,
            tenant_id,
            section: spec.section,
            row_label: spec.row_label,
            seat_label: spec.seat_label,
            tier: spec.tier,
            base_price: spec.base_price,
            x: spec.x,
            y: spec.y,
            is_available: spec.is_available,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SeatFilter {
    pub section: Option<String>,
    pub row: Option<String>,
    pub tier: Option<String>,
    /// Only seats whose inventory flag is set; reservations are not consulted here.
    #[serde(default)]
    pub only_open: bool,
}

impl SeatFilter {
    pub fn is_empty(&self) -> bool {
        self.section.is_none() && self.row.is_none() && self.tier.is_none() && !self.only_open
    }

    pub fn matches(&self, seat: &SeatRecord) -> bool {
        self.section.as_deref().map_or(true, |s| seat.section == s)
            && self.row.as_deref().map_or(true, |r| seat.row_label == r)
            && self.tier.as_deref().map_or(true, |t| seat.tier == t)
            && (!self.only_open || seat.is_available)
    }
}
