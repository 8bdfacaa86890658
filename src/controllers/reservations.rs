use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Duration;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::availability::check_event_id;
use crate::error::EngineError;
use crate::models::{ReservationRecord, ReservationStatus};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seats/{seat_id}/hold", post(hold_seat))
        .route(
            "/reservations/{id}",
            get(get_reservation)
                .patch(update_reservation)
                .delete(release_reservation),
        )
        .route("/events/{event_id}/holds", get(holds_for_holder))
}

/* ---------- HOLD ---------- */

#[derive(Debug, Deserialize, Validate)]
struct HoldRequest {
    #[validate(length(min = 1, max = 128))]
    holder_ref: String,
    #[validate(range(min = 1))]
    ttl_seconds: Option<i64>,
}

// POST /api/seats/{seat_id}/hold
// 201 при успехе, 419 если место уже занято
async fn hold_seat(
    State(state): State<Arc<AppState>>,
    Path(seat_id): Path<i64>,
    Json(req): Json<HoldRequest>,
) -> Result<impl IntoResponse, EngineError> {
    req.validate()?;
    if seat_id <= 0 {
        return Err(EngineError::Validation("seat_id must be positive".into()));
    }

    let record = match req.ttl_seconds {
        Some(secs) => {
            state
                .reservations
                .hold(seat_id, &req.holder_ref, Duration::seconds(secs))
                .await?
        }
        None => state.reservations.hold_default(seat_id, &req.holder_ref).await?,
    };
    Ok((StatusCode::CREATED, Json(record)))
}

/* ---------- LIFECYCLE ---------- */

#[derive(Debug, Deserialize)]
struct UpdateReservationRequest {
    status: ReservationStatus,
}

// GET /api/reservations/{id}
async fn get_reservation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationRecord>, EngineError> {
    Ok(Json(state.reservations.get(id).await?))
}

// PATCH /api/reservations/{id}  {"status": "locked" | "confirmed" | "released"}
async fn update_reservation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateReservationRequest>,
) -> Result<Json<ReservationRecord>, EngineError> {
    let record = state.reservations.promote(id, req.status).await?;
    Ok(Json(record))
}

// DELETE /api/reservations/{id}
async fn release_reservation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationRecord>, EngineError> {
    Ok(Json(state.reservations.release(id).await?))
}

#[derive(Debug, Deserialize)]
struct HoldsQuery {
    holder_ref: String,
}

// GET /api/events/{event_id}/holds?holder_ref=
async fn holds_for_holder(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
    Query(query): Query<HoldsQuery>,
) -> Result<Json<Vec<ReservationRecord>>, EngineError> {
    check_event_id(event_id)?;
    let holds = state
        .reservations
        .holds_for(event_id, query.holder_ref.trim())
        .await?;
    Ok(Json(holds))
}
