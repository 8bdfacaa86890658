use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::gates::EventGates;
use super::inventory::InventoryStore;
use super::reservations::ReservationManager;
use crate::error::{EngineError, EngineResult};
use crate::models::{SeatFilter, SeatRecord};
use crate::store::LayoutStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatAvailability {
    #[serde(flatten)]
    pub seat: SeatRecord,
    /// Inventory flag set and no active reservation on the seat.
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowGroup {
    pub row_label: String,
    pub seats: Vec<SeatAvailability>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloorPlan {
    pub seats: Vec<SeatAvailability>,
    /// Section name -> rows in layout order.
    pub grouped_by_section: BTreeMap<String, Vec<RowGroup>>,
    pub total: usize,
    pub available: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityView {
    pub event_id: i64,
    /// Inventory was compiled during this request.
    pub generated: bool,
    /// `None` when the event has no floor plan configured.
    pub floor_plan: Option<FloorPlan>,
}

impl AvailabilityView {
    fn no_floor_plan(event_id: i64) -> Self {
        Self {
            event_id,
            generated: false,
            floor_plan: None,
        }
    }
}

#[derive(Clone)]
pub struct AvailabilityService {
    inventory: InventoryStore,
    reservations: ReservationManager,
    layouts: Arc<dyn LayoutStore>,
    generating: Arc<EventGates<Mutex<()>>>,
}

impl AvailabilityService {
    pub fn new(
        inventory: InventoryStore,
        reservations: ReservationManager,
        layouts: Arc<dyn LayoutStore>,
    ) -> Self {
        Self {
            inventory,
            reservations,
            layouts,
            generating: Arc::new(EventGates::new()),
        }
    }

    /// Seat-by-seat availability for an event.
    ///
    /// Missing inventory is generated on the spot when a floor plan exists.
    /// Concurrent first reads of one event generate it once; the others wait
    /// and then read what was generated. Expired holds are swept before
    /// reservations are read.
    pub async fn get_availability(&self, event_id: i64) -> EngineResult<AvailabilityView> {
        let generated = if self.inventory.exists(event_id).await? {
            false
        } else {
            match self.generate(event_id).await? {
                Some(generated) => generated,
                None => return Ok(AvailabilityView::no_floor_plan(event_id)),
            }
        };

        self.reservations.sweep_expired(event_id).await?;

        let seats = self.inventory.list(event_id, &SeatFilter::default()).await?;
        let reserved = self.reservations.reserved_seat_ids(event_id).await?;

        let seats: Vec<SeatAvailability> = seats
            .into_iter()
            .map(|seat| {
                let available = seat.is_available && !reserved.contains(&seat.id);
                SeatAvailability { seat, available }
            })
            .collect();

        Ok(AvailabilityView {
            event_id,
            generated,
            floor_plan: Some(FloorPlan::from_seats(seats)),
        })
    }

    /// Builds inventory from the stored floor plan unless another reader got
    /// there first. `None` when the event has no floor plan.
    async fn generate(&self, event_id: i64) -> EngineResult<Option<bool>> {
        let gate = self.generating.get(event_id);
        let _generating = gate.lock().await;

        if self.inventory.exists(event_id).await? {
            return Ok(Some(false));
        }
        let Some(layout) = self.layouts.load_layout(event_id).await? else {
            return Ok(None);
        };

        info!("No seats for event {}, generating from floor plan", event_id);
        let report = match self.inventory.rebuild_from_layout(&layout).await {
            Ok(report) => report,
            Err(err) => {
                // другой инстанс мог собрать места параллельно
                if self.inventory.exists(event_id).await.unwrap_or(false) {
                    warn!(event_id, "Generation lost a race, using existing seats: {}", err);
                    return Ok(Some(false));
                }
                return Err(err);
            }
        };
        if report.persisted == 0 {
            warn!(
                event_id,
                dialect = layout.descriptor.dialect(),
                skipped = report.skipped_units,
                "Floor plan compiled to zero seats"
            );
            return Err(EngineError::EmptyLayout { event_id });
        }
        Ok(Some(true))
    }
}

impl FloorPlan {
    fn from_seats(seats: Vec<SeatAvailability>) -> Self {
        let mut grouped: BTreeMap<String, Vec<RowGroup>> = BTreeMap::new();
        for entry in &seats {
            let rows = grouped.entry(entry.seat.section.clone()).or_default();
            match rows.iter_mut().find(|r| r.row_label == entry.seat.row_label) {
                Some(row) => row.seats.push(entry.clone()),
                None => rows.push(RowGroup {
                    row_label: entry.seat.row_label.clone(),
                    seats: vec![entry.clone()],
                }),
            }
        }

        let available = seats.iter().filter(|s| s.available).count();
        Self {
            total: seats.len(),
            available,
            grouped_by_section: grouped,
            seats,
        }
    }
}
