//! Seat inventory per event.
//!
//! A rebuild deletes every seat of the event and inserts the new specs in
//! fixed-size batches. It is not isolated from concurrent readers or holders:
//! run it before booking opens. Repeating it with the same layout yields the
//! same seat addresses, so a failed rebuild is retried by running it again.
//!
//! Readers never write a seat list into the cache while a rebuild of the same
//! event runs in this process, so a half-inserted list cannot outlive it.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::cache::SeatCache;
use crate::error::{EngineError, EngineResult};
use crate::layout::{self, CompiledLayout};
use crate::models::{SeatFilter, SeatRecord, SeatSpec, StoredLayout, TenantId};
use crate::store::SeatStore;

use super::gates::EventGates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventorySettings {
    /// Hard upper bound on seats per event.
    pub safety_cap: usize,
    /// Rows per insert statement during a rebuild.
    pub batch_size: usize,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            safety_cap: 20_000,
            batch_size: 2_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    pub event_id: i64,
    pub persisted: u64,
    pub truncated: bool,
    pub skipped_units: usize,
    pub duplicates: usize,
}

#[derive(Clone)]
pub struct InventoryStore {
    seats: Arc<dyn SeatStore>,
    cache: Option<Arc<dyn SeatCache>>,
    settings: InventorySettings,
    // запись: идёт пересборка; чтение: читатель кладёт список в кеш
    rebuilds: Arc<EventGates<RwLock<()>>>,
}

impl InventoryStore {
    pub fn new(seats: Arc<dyn SeatStore>, settings: InventorySettings) -> Self {
        Self {
            seats,
            cache: None,
            settings,
            rebuilds: Arc::new(EventGates::new()),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn SeatCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn settings(&self) -> InventorySettings {
        self.settings
    }

    /// Compiles a stored layout under this store's safety cap.
    pub fn compile(&self, layout: &StoredLayout) -> CompiledLayout {
        layout::compile(&layout.descriptor, &layout.pricing, self.settings.safety_cap)
    }

    /// Compiles the layout and replaces the event's seats with the result.
    pub async fn rebuild_from_layout(&self, layout: &StoredLayout) -> EngineResult<RebuildReport> {
        let compiled = self.compile(layout);
        self.rebuild_compiled(layout, compiled).await
    }

    /// Replaces the event's seats with an already compiled layout.
    pub async fn rebuild_compiled(
        &self,
        layout: &StoredLayout,
        compiled: CompiledLayout,
    ) -> EngineResult<RebuildReport> {
        if compiled.skipped_units > 0 {
            info!(
                event_id = layout.event_id,
                dialect = layout.descriptor.dialect(),
                skipped = compiled.skipped_units,
                "Skipped unusable layout units"
            );
        }
        if compiled.duplicates > 0 {
            info!(
                event_id = layout.event_id,
                dropped = compiled.duplicates,
                "Dropped seats with repeated addresses"
            );
        }
        if compiled.truncated {
            let err = EngineError::CapacityExceeded {
                cap: self.settings.safety_cap,
            };
            warn!(event_id = layout.event_id, "{}", err);
        }

        let persisted = self
            .rebuild(&layout.tenant_id, layout.event_id, compiled.seats)
            .await?;

        Ok(RebuildReport {
            event_id: layout.event_id,
            persisted,
            truncated: compiled.truncated,
            skipped_units: compiled.skipped_units,
            duplicates: compiled.duplicates,
        })
    }

    /// Deletes all seats of `event_id`, then inserts `specs` batch by batch.
    /// Returns how many seats were persisted, never more than the safety cap.
    pub async fn rebuild(
        &self,
        tenant: &TenantId,
        event_id: i64,
        mut specs: Vec<SeatSpec>,
    ) -> EngineResult<u64> {
        let cap = self.settings.safety_cap;
        if specs.len() > cap {
            warn!(
                event_id,
                offered = specs.len(),
                "{}",
                EngineError::CapacityExceeded { cap }
            );
            specs.truncate(cap);
        }

        let gate = self.rebuilds.get(event_id);
        let _rebuilding = gate.write().await;

        info!("Rebuilding inventory for event {} ({} seats)", event_id, specs.len());

        let removed = self.seats.delete_event_seats(event_id).await.map_err(|e| {
            error!("rebuild: failed to delete seats for event {}: {}", event_id, e);
            e
        })?;
        debug!(event_id, removed, "Old seats removed");

        // Кеш сбрасываем сразу: старые места уже удалены
        self.invalidate(event_id).await;

        let mut persisted = 0;
        for batch in specs.chunks(self.settings.batch_size.max(1)) {
            persisted += self
                .seats
                .insert_seats(event_id, tenant, batch)
                .await
                .map_err(|e| {
                    error!(
                        "rebuild: batch insert failed for event {} after {} seats: {}",
                        event_id, persisted, e
                    );
                    e
                })?;
        }
        // и ещё раз: читатель мог закешировать частичный список посреди вставки
        self.invalidate(event_id).await;

        info!("Inventory for event {} rebuilt: {} seats", event_id, persisted);
        Ok(persisted)
    }

    pub async fn exists(&self, event_id: i64) -> EngineResult<bool> {
        self.seats.has_seats(event_id).await
    }

    /// Seats of the event in layout order. Unfiltered reads go through the cache.
    pub async fn list(&self, event_id: i64, filter: &SeatFilter) -> EngineResult<Vec<SeatRecord>> {
        if !filter.is_empty() {
            return self.seats.list_seats(event_id, filter).await;
        }

        let Some(cache) = &self.cache else {
            return self.seats.list_seats(event_id, filter).await;
        };
        if let Some(seats) = cache.get_seats(event_id).await {
            return Ok(seats);
        }

        // Пока идёт пересборка, читаем мимо кеша
        let gate = self.rebuilds.get(event_id);
        let Ok(_reading) = gate.try_read() else {
            debug!(event_id, "Rebuild in progress, seat list not cached");
            return self.seats.list_seats(event_id, filter).await;
        };

        let seats = self.seats.list_seats(event_id, filter).await?;
        if !seats.is_empty() {
            cache.put_seats(event_id, &seats).await;
        }
        Ok(seats)
    }

    pub async fn find(&self, seat_id: i64) -> EngineResult<Option<SeatRecord>> {
        self.seats.find_seat(seat_id).await
    }

    async fn invalidate(&self, event_id: i64) {
        if let Some(cache) = &self.cache {
            cache.invalidate_seats(event_id).await;
        }
    }
}
