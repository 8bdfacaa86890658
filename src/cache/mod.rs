//! Redis cache of per-event seat lists.
//!
//! Only inventory rows are cached; reservation state is always read from the
//! store, so a stale cache entry can never hide an active hold.

pub mod seats;

pub use seats::RedisSeatCache;

use async_trait::async_trait;

use crate::models::SeatRecord;

/// Cache faults are logged by implementations and never reach the caller.
#[async_trait]
pub trait SeatCache: Send + Sync {
    async fn get_seats(&self, event_id: i64) -> Option<Vec<SeatRecord>>;
    async fn put_seats(&self, event_id: i64, seats: &[SeatRecord]);
    async fn invalidate_seats(&self, event_id: i64);
}
