use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::error::EngineError;
use crate::models::{SeatFilter, SeatRecord};
use crate::services::AvailabilityView;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events/{event_id}/availability", get(get_availability))
        .route("/events/{event_id}/seats", get(list_seats))
}

pub(crate) fn check_event_id(event_id: i64) -> Result<(), EngineError> {
    if event_id <= 0 {
        return Err(EngineError::Validation("event_id must be positive".into()));
    }
    Ok(())
}

// GET /api/events/{event_id}/availability
async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
) -> Result<Json<AvailabilityView>, EngineError> {
    check_event_id(event_id)?;
    let view = state.availability.get_availability(event_id).await?;
    Ok(Json(view))
}

// GET /api/events/{event_id}/seats?section=&row=&tier=&only_open=
// Сырые записи инвентаря, без учёта броней
async fn list_seats(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
    Query(filter): Query<SeatFilter>,
) -> Result<Json<Vec<SeatRecord>>, EngineError> {
    check_event_id(event_id)?;
    let seats = state.inventory.list(event_id, &filter).await?;
    Ok(Json(seats))
}
