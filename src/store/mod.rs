//! Persistence seams.
//!
//! Services only talk to these traits. `MemoryStore` backs tests and local runs,
//! `PgStore` backs production.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    NewHold, ReservationRecord, ReservationStatus, SeatFilter, SeatRecord, SeatSpec,
    StoredLayout, TenantId,
};

#[async_trait]
pub trait SeatStore: Send + Sync {
    /// Deletes every seat of the event; reservations on those seats go with them.
    async fn delete_event_seats(&self, event_id: i64) -> EngineResult<u64>;

    async fn insert_seats(
        &self,
        event_id: i64,
        tenant: &TenantId,
        batch: &[SeatSpec],
    ) -> EngineResult<u64>;

    async fn has_seats(&self, event_id: i64) -> EngineResult<bool>;

    /// Seats of the event in insertion order.
    async fn list_seats(&self, event_id: i64, filter: &SeatFilter)
        -> EngineResult<Vec<SeatRecord>>;

    async fn find_seat(&self, seat_id: i64) -> EngineResult<Option<SeatRecord>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum HoldOutcome {
    Held(ReservationRecord),
    /// Seat has an active reservation or is closed in inventory.
    Taken,
    UnknownSeat,
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Creates a `Held` reservation only if no reservation is active on the seat
    /// at `now`. Check and insert happen as one atomic write; implementations
    /// must never split them into a read followed by a separate write.
    async fn insert_hold_if_free(&self, hold: &NewHold, now: DateTime<Utc>)
        -> EngineResult<HoldOutcome>;

    async fn find_reservation(&self, id: Uuid) -> EngineResult<Option<ReservationRecord>>;

    /// Compare-and-set on status. Applies only while the reservation is still in
    /// `from` and has not lapsed at `now`; returns `None` otherwise.
    async fn transition(
        &self,
        id: Uuid,
        from: ReservationStatus,
        to: ReservationStatus,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> EngineResult<Option<ReservationRecord>>;

    /// Marks `Held`/`Locked` reservations of the event whose TTL passed as `Expired`.
    async fn expire_due(&self, event_id: i64, now: DateTime<Utc>) -> EngineResult<u64>;

    async fn active_reservations(
        &self,
        event_id: i64,
        now: DateTime<Utc>,
    ) -> EngineResult<Vec<ReservationRecord>>;

    async fn reservations_for_holder(
        &self,
        event_id: i64,
        holder_ref: &str,
    ) -> EngineResult<Vec<ReservationRecord>>;
}

#[async_trait]
pub trait LayoutStore: Send + Sync {
    async fn save_layout(&self, layout: &StoredLayout) -> EngineResult<()>;
    async fn load_layout(&self, event_id: i64) -> EngineResult<Option<StoredLayout>>;
}
