pub mod availability;
pub mod layouts;
pub mod reservations;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(availability::routes())
        .merge(layouts::routes())
        .merge(reservations::routes())
}

/// Full application router: `/health` plus everything under `/api`.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Seat Inventory API v0.1" }))
        .route("/health", get(health))
        .nest("/api", routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let Some(db) = &state.db else {
        return (StatusCode::OK, Json(json!({ "status": "ok", "storage": "memory" })));
    };
    match db.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok", "storage": "postgres" }))),
        Err(e) => {
            tracing::error!("health: database ping failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "storage": "postgres" })),
            )
        }
    }
}
