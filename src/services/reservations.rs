//! Hold → lock → confirm lifecycle for single seats.
//!
//! Expiry is lazy: nothing runs in the background. A hold whose TTL has passed
//! stops blocking new holds immediately, but it keeps its `Held`/`Locked`
//! status until the next [`ReservationManager::sweep_expired`] for its event.
//! Availability reads sweep first, so their answer is at most one read stale.

use chrono::Duration;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::models::{NewHold, ReservationRecord, ReservationStatus};
use crate::store::{HoldOutcome, ReservationStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationSettings {
    pub default_hold_ttl: Duration,
    pub max_hold_ttl: Duration,
    /// Payment window granted when a hold is locked.
    pub lock_ttl: Duration,
}

impl Default for ReservationSettings {
    fn default() -> Self {
        Self {
            default_hold_ttl: Duration::seconds(300),
            max_hold_ttl: Duration::seconds(3600),
            lock_ttl: Duration::seconds(900),
        }
    }
}

#[derive(Clone)]
pub struct ReservationManager {
    store: Arc<dyn ReservationStore>,
    clock: Arc<dyn Clock>,
    settings: ReservationSettings,
}

impl ReservationManager {
    pub fn new(
        store: Arc<dyn ReservationStore>,
        clock: Arc<dyn Clock>,
        settings: ReservationSettings,
    ) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> ReservationSettings {
        self.settings
    }

    /// Places a time-boxed hold on a seat.
    ///
    /// Fails with [`EngineError::SeatUnavailable`] when another reservation is
    /// active on the seat. That is a routine outcome; it is never retried here.
    pub async fn hold(
        &self,
        seat_id: i64,
        holder_ref: &str,
        ttl: Duration,
    ) -> EngineResult<ReservationRecord> {
        let holder_ref = holder_ref.trim();
        if holder_ref.is_empty() {
            return Err(EngineError::Validation("holder_ref must not be empty".into()));
        }
        if ttl <= Duration::zero() || ttl > self.settings.max_hold_ttl {
            return Err(EngineError::Validation(format!(
                "hold ttl must be between 1 and {} seconds",
                self.settings.max_hold_ttl.num_seconds()
            )));
        }

        let now = self.clock.now();
        let hold = NewHold {
            id: Uuid::new_v4(),
            seat_id,
            holder_ref: holder_ref.to_string(),
            expires_at: now + ttl,
        };

        match self.store.insert_hold_if_free(&hold, now).await? {
            HoldOutcome::Held(record) => {
                info!(
                    reservation_id = %record.id,
                    seat_id,
                    holder = %record.holder_ref,
                    "Seat held until {:?}",
                    record.expires_at
                );
                Ok(record)
            }
            HoldOutcome::Taken => {
                debug!(seat_id, holder = holder_ref, "Hold rejected: seat already reserved");
                Err(EngineError::SeatUnavailable { seat_id })
            }
            HoldOutcome::UnknownSeat => Err(EngineError::SeatNotFound(seat_id)),
        }
    }

    /// Hold with the configured default TTL.
    pub async fn hold_default(&self, seat_id: i64, holder_ref: &str) -> EngineResult<ReservationRecord> {
        self.hold(seat_id, holder_ref, self.settings.default_hold_ttl).await
    }

    /// Moves a reservation along the lifecycle.
    ///
    /// `Held→Locked`, `Held→Confirmed`, `Locked→Confirmed` and any active
    /// state `→Released` are legal. A hold past its TTL counts as `Expired`
    /// even if no sweep has run yet.
    pub async fn promote(
        &self,
        reservation_id: Uuid,
        to: ReservationStatus,
    ) -> EngineResult<ReservationRecord> {
        let now = self.clock.now();
        let current = self
            .store
            .find_reservation(reservation_id)
            .await?
            .ok_or(EngineError::ReservationNotFound(reservation_id))?;

        let effective = if current.is_due_for_expiry(now) {
            ReservationStatus::Expired
        } else {
            current.status
        };
        if !effective.can_transition_to(to) {
            return Err(EngineError::InvalidTransition {
                from: effective,
                to,
            });
        }

        let expires_at = match to {
            ReservationStatus::Locked => Some(now + self.settings.lock_ttl),
            ReservationStatus::Confirmed => None,
            _ => current.expires_at,
        };

        match self
            .store
            .transition(reservation_id, current.status, to, expires_at, now)
            .await?
        {
            Some(updated) => {
                info!(
                    reservation_id = %reservation_id,
                    seat_id = updated.seat_id,
                    "Reservation {} -> {}",
                    current.status,
                    to
                );
                Ok(updated)
            }
            None => {
                // Кто-то успел раньше; сообщаем актуальный статус
                let latest = self
                    .store
                    .find_reservation(reservation_id)
                    .await?
                    .ok_or(EngineError::ReservationNotFound(reservation_id))?;
                let from = if latest.is_due_for_expiry(now) {
                    ReservationStatus::Expired
                } else {
                    latest.status
                };
                Err(EngineError::InvalidTransition { from, to })
            }
        }
    }

    pub async fn release(&self, reservation_id: Uuid) -> EngineResult<ReservationRecord> {
        self.promote(reservation_id, ReservationStatus::Released).await
    }

    pub async fn get(&self, reservation_id: Uuid) -> EngineResult<ReservationRecord> {
        self.store
            .find_reservation(reservation_id)
            .await?
            .ok_or(EngineError::ReservationNotFound(reservation_id))
    }

    /// Marks lapsed `Held`/`Locked` reservations of the event as `Expired`.
    pub async fn sweep_expired(&self, event_id: i64) -> EngineResult<u64> {
        let expired = self.store.expire_due(event_id, self.clock.now()).await?;
        if expired > 0 {
            info!("Expired {} stale holds for event {}", expired, event_id);
        }
        Ok(expired)
    }

    /// Seats of the event that currently carry an active reservation.
    pub async fn reserved_seat_ids(&self, event_id: i64) -> EngineResult<HashSet<i64>> {
        let active = self
            .store
            .active_reservations(event_id, self.clock.now())
            .await?;
        Ok(active.into_iter().map(|r| r.seat_id).collect())
    }

    pub async fn holds_for(
        &self,
        event_id: i64,
        holder_ref: &str,
    ) -> EngineResult<Vec<ReservationRecord>> {
        self.store.reservations_for_holder(event_id, holder_ref).await
    }
}
