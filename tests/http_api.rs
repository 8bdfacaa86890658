#![allow(clippy::unwrap_used)]

//! Router-level checks over the in-memory store.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use seat_inventory::config::{AppConfig, Config, DatabaseConfig, InventoryConfig, RedisConfig};
use seat_inventory::services::ManualClock;
use seat_inventory::store::MemoryStore;
use seat_inventory::{controllers, AppState};

fn test_config() -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            environment: "test".into(),
            rust_log: "seat_inventory=debug".into(),
            log_format: "text".into(),
        },
        database: DatabaseConfig {
            url: String::new(),
            pool_size: 1,
        },
        redis: RedisConfig {
            url: None,
            seat_cache_ttl_seconds: 60,
        },
        inventory: InventoryConfig::default(),
    }
}

fn app() -> Router {
    let state = AppState::with_store(
        test_config(),
        Arc::new(MemoryStore::new()),
        Arc::new(ManualClock::new(Utc::now())),
        None,
    );
    controllers::app(Arc::new(state))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-tenant-id", "venue-42");
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn grid_layout() -> Value {
    json!({
        "descriptor": {
            "type": "grid_rows",
            "rows": 3,
            "cols": 5,
            "aisle_every": 0,
            "default_price": 40.0,
            "bands": [{ "start_row_index": 0, "end_row_index": 0, "tier": "Premium", "price": 90.0 }]
        }
    })
}

#[tokio::test]
async fn health_reports_memory_storage() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn put_layout_then_read_availability() {
    let app = app();

    let (status, report) = send(&app, "PUT", "/api/events/10/layout", Some(grid_layout())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["persisted"], 15);

    let (status, view) = send(&app, "GET", "/api/events/10/availability", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["generated"], false);
    assert_eq!(view["floor_plan"]["total"], 15);

    let (_, premium) = send(&app, "GET", "/api/events/10/seats?tier=Premium", None).await;
    let premium = premium.as_array().unwrap();
    assert_eq!(premium.len(), 5);
    assert!(premium.iter().all(|s| s["row_label"] == "A" && s["base_price"] == 90.0));
}

#[tokio::test]
async fn put_layout_without_tenant_is_rejected() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/events/10/layout")
                .header("content-type", "application/json")
                .body(Body::from(grid_layout().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn zero_seat_layout_is_refused() {
    let app = app();
    let body = json!({ "descriptor": { "type": "concentric_rings", "rings": [] } });

    let (status, error) = send(&app, "PUT", "/api/events/11/layout", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["code"], "INVALID_DESCRIPTOR");
    assert_eq!(error["retryable"], false);

    let (_, view) = send(&app, "GET", "/api/events/11/availability", None).await;
    assert_eq!(view["floor_plan"], Value::Null);
}

#[tokio::test]
async fn rebuild_without_layout_is_unprocessable() {
    let (status, error) = send(&app(), "POST", "/api/events/12/inventory/rebuild", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(error["hint"].as_str().unwrap().contains("/layout"));
}

#[tokio::test]
async fn hold_conflict_and_lifecycle() {
    let app = app();
    send(&app, "PUT", "/api/events/13/layout", Some(grid_layout())).await;
    let (_, seats) = send(&app, "GET", "/api/events/13/seats", None).await;
    let seat_id = seats[0]["id"].as_i64().unwrap();
    let hold_uri = format!("/api/seats/{}/hold", seat_id);

    let (status, hold) = send(
        &app,
        "POST",
        &hold_uri,
        Some(json!({ "holder_ref": "cart-1", "ttl_seconds": 120 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(hold["status"], "held");

    let (status, error) =
        send(&app, "POST", &hold_uri, Some(json!({ "holder_ref": "cart-2" }))).await;
    assert_eq!(status.as_u16(), 419);
    assert_eq!(error["code"], "SEAT_UNAVAILABLE");
    assert_eq!(error["retryable"], true);

    let reservation_uri = format!("/api/reservations/{}", hold["id"].as_str().unwrap());
    let (status, locked) =
        send(&app, "PATCH", &reservation_uri, Some(json!({ "status": "locked" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(locked["status"], "locked");

    let (status, released) = send(&app, "DELETE", &reservation_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(released["status"], "released");

    let (status, error) =
        send(&app, "PATCH", &reservation_uri, Some(json!({ "status": "confirmed" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn hold_body_is_validated() {
    let app = app();
    send(&app, "PUT", "/api/events/14/layout", Some(grid_layout())).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/seats/1/hold",
        Some(json!({ "holder_ref": "", "ttl_seconds": 60 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, error) =
        send(&app, "POST", "/api/seats/424242/hold", Some(json!({ "holder_ref": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "SEAT_NOT_FOUND");
}
