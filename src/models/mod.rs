pub mod layout;
pub mod reservation;
pub mod seat;

pub use layout::{LayoutDescriptor, PricingPolicy, StoredLayout};
pub use reservation::{NewHold, ReservationRecord, ReservationStatus};
pub use seat::{SeatFilter, SeatRecord, SeatSpec};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tenant that owns an event's inventory. Only used to stamp seat rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TenantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
