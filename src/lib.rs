pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod layout;
pub mod middleware;
pub mod models;
pub mod redis_client;
pub mod services;
pub mod store;

use std::sync::Arc;
use tracing::{info, warn};

use cache::{RedisSeatCache, SeatCache};
use config::Config;
use database::Database;
use error::EngineResult;
use redis_client::RedisClient;
use services::{AvailabilityService, Clock, InventoryStore, ReservationManager, SystemClock};
use store::{LayoutStore, PgStore, ReservationStore, SeatStore};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when running on the in-memory store.
    pub db: Option<Database>,
    pub inventory: InventoryStore,
    pub reservations: ReservationManager,
    pub availability: AvailabilityService,
    pub layouts: Arc<dyn LayoutStore>,
}

impl AppState {
    /// Postgres-backed state. Redis is optional; if it is configured but
    /// unreachable the service starts without the seat cache.
    pub async fn new(config: Config) -> EngineResult<Arc<Self>> {
        let db = Database::new(&config.database.url, config.database.pool_size).await?;
        info!("Database connected");
        db.run_migrations().await?;

        let cache: Option<Arc<dyn SeatCache>> = match &config.redis.url {
            Some(url) => match RedisClient::new(url).await {
                Ok(redis) => Some(Arc::new(RedisSeatCache::new(
                    redis,
                    config.redis.seat_cache_ttl_seconds,
                ))),
                Err(e) => {
                    warn!("Redis unavailable, seat cache disabled: {}", e);
                    None
                }
            },
            None => None,
        };

        let store = Arc::new(PgStore::new(db.clone()));
        let mut state = Self::with_store(config, store, Arc::new(SystemClock), cache);
        state.db = Some(db);
        Ok(Arc::new(state))
    }

    /// Wires the services over any store implementing all three persistence seams.
    pub fn with_store<S>(
        config: Config,
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        cache: Option<Arc<dyn SeatCache>>,
    ) -> Self
    where
        S: SeatStore + ReservationStore + LayoutStore + 'static,
    {
        let seats: Arc<dyn SeatStore> = store.clone();
        let holds: Arc<dyn ReservationStore> = store.clone();
        let layouts: Arc<dyn LayoutStore> = store;

        let mut inventory = InventoryStore::new(seats, config.inventory.inventory_settings());
        if let Some(cache) = cache {
            inventory = inventory.with_cache(cache);
        }
        let reservations =
            ReservationManager::new(holds, clock, config.inventory.reservation_settings());
        let availability =
            AvailabilityService::new(inventory.clone(), reservations.clone(), layouts.clone());

        Self {
            config,
            db: None,
            inventory,
            reservations,
            availability,
            layouts,
        }
    }
}
