use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{HoldOutcome, LayoutStore, ReservationStore, SeatStore};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    NewHold, ReservationRecord, ReservationStatus, SeatFilter, SeatRecord, SeatSpec,
    StoredLayout, TenantId,
};

#[derive(Default)]
struct Inner {
    seats: BTreeMap<i64, SeatRecord>,
    next_seat_id: i64,
    reservations: HashMap<Uuid, ReservationRecord>,
    layouts: HashMap<i64, StoredLayout>,
}

/// In-process store. Every operation runs under one mutex, which is what makes
/// the conditional hold atomic here.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| EngineError::StorageFailure("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl SeatStore for MemoryStore {
    async fn delete_event_seats(&self, event_id: i64) -> EngineResult<u64> {
        let mut inner = self.lock()?;
        let before = inner.seats.len();
        inner.seats.retain(|_, seat| seat.event_id != event_id);
        let removed = (before - inner.seats.len()) as u64;

        // как ON DELETE CASCADE в Postgres
        let seats = &inner.seats;
        let orphaned: Vec<Uuid> = inner
            .reservations
            .values()
            .filter(|r| r.event_id == event_id && !seats.contains_key(&r.seat_id))
            .map(|r| r.id)
            .collect();
        for id in orphaned {
            inner.reservations.remove(&id);
        }
        Ok(removed)
    }

    async fn insert_seats(
        &self,
        event_id: i64,
        tenant: &TenantId,
        batch: &[SeatSpec],
    ) -> EngineResult<u64> {
        let mut inner = self.lock()?;
        let existing: HashSet<(&str, &str, &str)> = inner
            .seats
            .values()
            .filter(|s| s.event_id == event_id)
            .map(|s| (s.section.as_str(), s.row_label.as_str(), s.seat_label.as_str()))
            .collect();
        let duplicate = batch.iter().find(|spec| existing.contains(&spec.address()));
        drop(existing);
        if let Some(spec) = duplicate {
            return Err(EngineError::StorageFailure(format!(
                "seat {}/{}/{} already exists for event {}",
                spec.section, spec.row_label, spec.seat_label, event_id
            )));
        }

        for spec in batch {
            inner.next_seat_id += 1;
            let id = inner.next_seat_id;
            inner
                .seats
                .insert(id, SeatRecord::from_spec(id, event_id, tenant.clone(), spec.clone()));
        }
        Ok(batch.len() as u64)
    }

    async fn has_seats(&self, event_id: i64) -> EngineResult<bool> {
        Ok(self.lock()?.seats.values().any(|s| s.event_id == event_id))
    }

    async fn list_seats(
        &self,
        event_id: i64,
        filter: &SeatFilter,
    ) -> EngineResult<Vec<SeatRecord>> {
        Ok(self
            .lock()?
            .seats
            .values()
            .filter(|s| s.event_id == event_id && filter.matches(s))
            .cloned()
            .collect())
    }

    async fn find_seat(&self, seat_id: i64) -> EngineResult<Option<SeatRecord>> {
        Ok(self.lock()?.seats.get(&seat_id).cloned())
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn insert_hold_if_free(
        &self,
        hold: &NewHold,
        now: DateTime<Utc>,
    ) -> EngineResult<HoldOutcome> {
        let mut inner = self.lock()?;
        let Some(seat) = inner.seats.get(&hold.seat_id) else {
            return Ok(HoldOutcome::UnknownSeat);
        };
        let event_id = seat.event_id;
        if !seat.is_available {
            return Ok(HoldOutcome::Taken);
        }
        let taken = inner
            .reservations
            .values()
            .any(|r| r.seat_id == hold.seat_id && r.is_active_at(now));
        if taken {
            return Ok(HoldOutcome::Taken);
        }

        let record = ReservationRecord {
            id: hold.id,
            seat_id: hold.seat_id,
            event_id,
            holder_ref: hold.holder_ref.clone(),
            status: ReservationStatus::Held,
            expires_at: Some(hold.expires_at),
            created_at: now,
            updated_at: now,
        };
        inner.reservations.insert(record.id, record.clone());
        Ok(HoldOutcome::Held(record))
    }

    async fn find_reservation(&self, id: Uuid) -> EngineResult<Option<ReservationRecord>> {
        Ok(self.lock()?.reservations.get(&id).cloned())
    }

    async fn transition(
        &self,
        id: Uuid,
        from: ReservationStatus,
        to: ReservationStatus,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> EngineResult<Option<ReservationRecord>> {
        let mut inner = self.lock()?;
        let Some(record) = inner.reservations.get_mut(&id) else {
            return Ok(None);
        };
        let lapsed = record.expires_at.is_some_and(|at| at <= now);
        if record.status != from || lapsed {
            return Ok(None);
        }
        record.status = to;
        record.expires_at = expires_at;
        record.updated_at = now;
        Ok(Some(record.clone()))
    }

    async fn expire_due(&self, event_id: i64, now: DateTime<Utc>) -> EngineResult<u64> {
        let mut inner = self.lock()?;
        let mut expired = 0;
        for record in inner.reservations.values_mut() {
            if record.event_id == event_id && record.is_due_for_expiry(now) {
                record.status = ReservationStatus::Expired;
                record.updated_at = now;
                expired += 1;
            }
        }
        Ok(expired)
    }

    async fn active_reservations(
        &self,
        event_id: i64,
        now: DateTime<Utc>,
    ) -> EngineResult<Vec<ReservationRecord>> {
        Ok(self
            .lock()?
            .reservations
            .values()
            .filter(|r| r.event_id == event_id && r.is_active_at(now))
            .cloned()
            .collect())
    }

    async fn reservations_for_holder(
        &self,
        event_id: i64,
        holder_ref: &str,
    ) -> EngineResult<Vec<ReservationRecord>> {
        let mut found: Vec<ReservationRecord> = self
            .lock()?
            .reservations
            .values()
            .filter(|r| r.event_id == event_id && r.holder_ref == holder_ref)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.created_at);
        Ok(found)
    }
}

#[async_trait]
impl LayoutStore for MemoryStore {
    async fn save_layout(&self, layout: &StoredLayout) -> EngineResult<()> {
        self.lock()?.layouts.insert(layout.event_id, layout.clone());
        Ok(())
    }

    async fn load_layout(&self, event_id: i64) -> EngineResult<Option<StoredLayout>> {
        Ok(self.lock()?.layouts.get(&event_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn spec(row: &str, n: u32) -> SeatSpec {
        SeatSpec {
            section: "Main".into(),
            row_label: row.into(),
            seat_label: format!("{}{}", row, n),
            tier: "General".into(),
            base_price: 10.0,
            x: 0.0,
            y: 0.0,
            is_available: true,
        }
    }

    #[tokio::test]
    async fn delete_cascades_to_reservations() {
        let store = MemoryStore::new();
        let tenant = TenantId::new("t1");
        store.insert_seats(1, &tenant, &[spec("A", 1)]).await.unwrap();
        let seat = store.list_seats(1, &SeatFilter::default()).await.unwrap()[0].clone();

        let now = Utc::now();
        let hold = NewHold {
            id: Uuid::new_v4(),
            seat_id: seat.id,
            holder_ref: "u1".into(),
            expires_at: now + Duration::seconds(60),
        };
        assert!(matches!(
            store.insert_hold_if_free(&hold, now).await.unwrap(),
            HoldOutcome::Held(_)
        ));

        assert_eq!(store.delete_event_seats(1).await.unwrap(), 1);
        assert!(store.find_reservation(hold.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_address_is_rejected() {
        let store = MemoryStore::new();
        let tenant = TenantId::new("t1");
        store.insert_seats(1, &tenant, &[spec("A", 1)]).await.unwrap();

        let err = store.insert_seats(1, &tenant, &[spec("A", 1)]).await.unwrap_err();
        assert!(matches!(err, EngineError::StorageFailure(_)));
        // другое событие - не конфликт
        store.insert_seats(2, &tenant, &[spec("A", 1)]).await.unwrap();
    }

    #[tokio::test]
    async fn hold_on_closed_or_missing_seat() {
        let store = MemoryStore::new();
        let mut closed = spec("A", 1);
        closed.is_available = false;
        store.insert_seats(1, &TenantId::new("t1"), &[closed]).await.unwrap();
        let seat_id = store.list_seats(1, &SeatFilter::default()).await.unwrap()[0].id;

        let now = Utc::now();
        let mut hold = NewHold {
            id: Uuid::new_v4(),
            seat_id,
            holder_ref: "u1".into(),
            expires_at: now + Duration::seconds(60),
        };
        assert_eq!(store.insert_hold_if_free(&hold, now).await.unwrap(), HoldOutcome::Taken);

        hold.seat_id = 999;
        assert_eq!(
            store.insert_hold_if_free(&hold, now).await.unwrap(),
            HoldOutcome::UnknownSeat
        );
    }
}
