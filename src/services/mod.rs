pub mod availability;
pub mod clock;
mod gates;
pub mod inventory;
pub mod reservations;

pub use availability::{AvailabilityService, AvailabilityView, FloorPlan, RowGroup, SeatAvailability};
pub use clock::{Clock, ManualClock, SystemClock};
pub use inventory::{InventorySettings, InventoryStore, RebuildReport};
pub use reservations::{ReservationManager, ReservationSettings};
