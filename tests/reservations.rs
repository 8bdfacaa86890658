#![allow(clippy::unwrap_used)]

//! Hold lifecycle against the in-memory store with a manual clock.

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;

use seat_inventory::error::EngineError;
use seat_inventory::models::{ReservationStatus, SeatFilter, StoredLayout, TenantId};
use seat_inventory::services::{
    Clock, InventorySettings, InventoryStore, ManualClock, ReservationManager,
    ReservationSettings,
};
use seat_inventory::store::MemoryStore;

const EVENT: i64 = 7;

struct Fixture {
    clock: Arc<ManualClock>,
    inventory: InventoryStore,
    reservations: ReservationManager,
}

async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap()));
    let inventory = InventoryStore::new(store.clone(), InventorySettings::default());
    let reservations =
        ReservationManager::new(store, clock.clone(), ReservationSettings::default());

    let layout = StoredLayout {
        event_id: EVENT,
        tenant_id: TenantId::new("venue-1"),
        descriptor: serde_json::from_value(json!({
            "type": "grid_rows", "rows": 2, "cols": 4, "default_price": 30.0
        }))
        .unwrap(),
        pricing: Default::default(),
    };
    inventory.rebuild_from_layout(&layout).await.unwrap();

    Fixture {
        clock,
        inventory,
        reservations,
    }
}

async fn first_seat(f: &Fixture) -> i64 {
    f.inventory.list(EVENT, &SeatFilter::default()).await.unwrap()[0].id
}

#[tokio::test]
async fn second_hold_on_same_seat_is_rejected() {
    let f = fixture().await;
    let seat = first_seat(&f).await;

    let held = f.reservations.hold(seat, "alice", Duration::seconds(60)).await.unwrap();
    assert_eq!(held.status, ReservationStatus::Held);

    let err = f.reservations.hold(seat, "bob", Duration::seconds(60)).await.unwrap_err();
    assert!(matches!(err, EngineError::SeatUnavailable { seat_id } if seat_id == seat));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn lapsed_hold_frees_the_seat() {
    let f = fixture().await;
    let seat = first_seat(&f).await;

    let first = f.reservations.hold(seat, "alice", Duration::seconds(60)).await.unwrap();
    f.clock.advance(Duration::seconds(61));

    let second = f.reservations.hold(seat, "bob", Duration::seconds(60)).await.unwrap();
    assert_eq!(second.holder_ref, "bob");

    // Old hold keeps its status until a sweep
    assert_eq!(
        f.reservations.get(first.id).await.unwrap().status,
        ReservationStatus::Held
    );
    assert_eq!(f.reservations.sweep_expired(EVENT).await.unwrap(), 1);
    assert_eq!(
        f.reservations.get(first.id).await.unwrap().status,
        ReservationStatus::Expired
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_holds_produce_exactly_one_winner() {
    let f = fixture().await;
    let seat = first_seat(&f).await;

    let attempts = (0..32).map(|i| {
        let reservations = f.reservations.clone();
        tokio::spawn(async move {
            reservations
                .hold(seat, &format!("holder-{}", i), Duration::seconds(120))
                .await
        })
    });
    let results = futures::future::join_all(attempts).await;

    let mut won = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => won += 1,
            Err(EngineError::SeatUnavailable { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(won, 1);
    assert_eq!(f.reservations.reserved_seat_ids(EVENT).await.unwrap().len(), 1);
}

#[tokio::test]
async fn hold_lock_confirm_lifecycle() {
    let f = fixture().await;
    let seat = first_seat(&f).await;
    let hold = f.reservations.hold(seat, "alice", Duration::seconds(60)).await.unwrap();

    let locked = f.reservations.promote(hold.id, ReservationStatus::Locked).await.unwrap();
    assert_eq!(locked.status, ReservationStatus::Locked);
    assert_eq!(
        locked.expires_at,
        Some(f.clock.now() + ReservationSettings::default().lock_ttl)
    );

    // The lock outlives the original hold TTL
    f.clock.advance(Duration::seconds(120));
    let confirmed = f.reservations.promote(hold.id, ReservationStatus::Confirmed).await.unwrap();
    assert_eq!(confirmed.status, ReservationStatus::Confirmed);
    assert_eq!(confirmed.expires_at, None);

    // Confirmed is final: no release through promote
    let err = f.reservations.release(hold.id).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidTransition {
            from: ReservationStatus::Confirmed,
            to: ReservationStatus::Released
        }
    ));

    // Confirmed never lapses
    f.clock.advance(Duration::days(30));
    f.reservations.sweep_expired(EVENT).await.unwrap();
    let err = f.reservations.hold(seat, "bob", Duration::seconds(60)).await.unwrap_err();
    assert!(matches!(err, EngineError::SeatUnavailable { .. }));
}

#[tokio::test]
async fn terminal_states_reject_transitions() {
    let f = fixture().await;
    let seat = first_seat(&f).await;
    let hold = f.reservations.hold(seat, "alice", Duration::seconds(60)).await.unwrap();

    let released = f.reservations.release(hold.id).await.unwrap();
    assert_eq!(released.status, ReservationStatus::Released);

    let err = f
        .reservations
        .promote(hold.id, ReservationStatus::Locked)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidTransition {
            from: ReservationStatus::Released,
            to: ReservationStatus::Locked
        }
    ));

    // Released seat is free again
    f.reservations.hold(seat, "bob", Duration::seconds(60)).await.unwrap();
}

#[tokio::test]
async fn lapsed_hold_cannot_be_promoted_before_sweep() {
    let f = fixture().await;
    let seat = first_seat(&f).await;
    let hold = f.reservations.hold(seat, "alice", Duration::seconds(60)).await.unwrap();

    f.clock.advance(Duration::seconds(60));
    let err = f
        .reservations
        .promote(hold.id, ReservationStatus::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidTransition {
            from: ReservationStatus::Expired,
            ..
        }
    ));
}

#[tokio::test]
async fn hold_input_is_validated() {
    let f = fixture().await;
    let seat = first_seat(&f).await;

    let err = f.reservations.hold(seat, "  ", Duration::seconds(60)).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = f.reservations.hold(seat, "alice", Duration::zero()).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = f.reservations.hold(seat, "alice", Duration::hours(2)).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = f.reservations.hold(999_999, "alice", Duration::seconds(60)).await.unwrap_err();
    assert!(matches!(err, EngineError::SeatNotFound(999_999)));
}

#[tokio::test]
async fn holds_for_lists_a_holders_reservations() {
    let f = fixture().await;
    let seats = f.inventory.list(EVENT, &SeatFilter::default()).await.unwrap();

    f.reservations.hold(seats[0].id, "alice", Duration::seconds(60)).await.unwrap();
    f.reservations.hold(seats[1].id, "alice", Duration::seconds(60)).await.unwrap();
    f.reservations.hold(seats[2].id, "bob", Duration::seconds(60)).await.unwrap();

    let alice = f.reservations.holds_for(EVENT, "alice").await.unwrap();
    assert_eq!(alice.len(), 2);
    assert!(alice.iter().all(|r| r.holder_ref == "alice"));
}
