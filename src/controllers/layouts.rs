use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::availability::check_event_id;
use crate::error::EngineError;
use crate::middleware::CurrentTenant;
use crate::models::{LayoutDescriptor, PricingPolicy, StoredLayout};
use crate::services::RebuildReport;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events/{event_id}/layout", get(get_layout).put(put_layout))
        .route("/events/{event_id}/inventory/rebuild", post(rebuild_inventory))
}

#[derive(Debug, Deserialize)]
struct PutLayoutRequest {
    descriptor: LayoutDescriptor,
    #[serde(default)]
    pricing: Option<PricingPolicy>,
}

// PUT /api/events/{event_id}/layout
// Сохраняет план зала и сразу пересобирает инвентарь
async fn put_layout(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
    tenant: CurrentTenant,
    Json(req): Json<PutLayoutRequest>,
) -> Result<Json<RebuildReport>, EngineError> {
    check_event_id(event_id)?;

    let layout = StoredLayout {
        event_id,
        tenant_id: tenant.current_tenant().clone(),
        descriptor: req.descriptor,
        pricing: req.pricing.unwrap_or_default(),
    };

    let compiled = state.inventory.compile(&layout);
    if compiled.seats.is_empty() {
        return Err(EngineError::InvalidDescriptor {
            reason: format!(
                "{} layout produces no seats ({} units skipped)",
                layout.descriptor.dialect(),
                compiled.skipped_units
            ),
            hint: "check counts and dimensions in the descriptor".into(),
        });
    }

    state.layouts.save_layout(&layout).await?;
    info!(
        event_id,
        tenant = %layout.tenant_id,
        dialect = layout.descriptor.dialect(),
        "Floor plan stored"
    );

    let report = state.inventory.rebuild_compiled(&layout, compiled).await?;
    Ok(Json(report))
}

// GET /api/events/{event_id}/layout
async fn get_layout(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
) -> Result<Json<StoredLayout>, EngineError> {
    check_event_id(event_id)?;
    state
        .layouts
        .load_layout(event_id)
        .await?
        .map(Json)
        .ok_or_else(|| no_floor_plan(event_id))
}

// POST /api/events/{event_id}/inventory/rebuild
async fn rebuild_inventory(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
) -> Result<Json<RebuildReport>, EngineError> {
    check_event_id(event_id)?;
    let layout = state
        .layouts
        .load_layout(event_id)
        .await?
        .ok_or_else(|| no_floor_plan(event_id))?;

    let report = state.inventory.rebuild_from_layout(&layout).await?;
    if report.persisted == 0 {
        return Err(EngineError::EmptyLayout { event_id });
    }
    Ok(Json(report))
}

fn no_floor_plan(event_id: i64) -> EngineError {
    EngineError::InvalidDescriptor {
        reason: format!("event {} has no floor plan", event_id),
        hint: format!("PUT /api/events/{}/layout first", event_id),
    }
}
