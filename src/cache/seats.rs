use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, info, warn};

use super::SeatCache;
use crate::models::SeatRecord;
use crate::redis_client::RedisClient;

#[derive(Clone)]
pub struct RedisSeatCache {
    redis: RedisClient,
    ttl_seconds: u64,
}

impl RedisSeatCache {
    pub fn new(redis: RedisClient, ttl_seconds: u64) -> Self {
        Self { redis, ttl_seconds }
    }

    fn key(event_id: i64) -> String {
        format!("seats:{}", event_id)
    }

    async fn read(&self, event_id: i64) -> Result<Option<Vec<SeatRecord>>, redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        let data: Option<String> = conn.get(Self::key(event_id)).await?;
        let Some(data) = data else {
            return Ok(None);
        };
        let seats = serde_json::from_str(&data).map_err(|_| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Parse error"))
        })?;
        Ok(Some(seats))
    }

    async fn write(&self, event_id: i64, seats: &[SeatRecord]) -> Result<(), redis::RedisError> {
        let data = serde_json::to_string(seats).map_err(|_| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Serialize error"))
        })?;
        let mut conn = self.redis.conn.clone();
        conn.set_ex(Self::key(event_id), data, self.ttl_seconds).await
    }
}

#[async_trait]
impl SeatCache for RedisSeatCache {
    async fn get_seats(&self, event_id: i64) -> Option<Vec<SeatRecord>> {
        match self.read(event_id).await {
            Ok(hit) => {
                debug!(event_id, hit = hit.is_some(), "seat cache lookup");
                hit
            }
            Err(e) => {
                warn!("seat cache read failed for event {}: {:?}", event_id, e);
                None
            }
        }
    }

    async fn put_seats(&self, event_id: i64, seats: &[SeatRecord]) {
        if let Err(e) = self.write(event_id, seats).await {
            warn!("seat cache write failed for event {}: {:?}", event_id, e);
        }
    }

    async fn invalidate_seats(&self, event_id: i64) {
        let mut conn = self.redis.conn.clone();
        let result: Result<(), _> = conn.del(Self::key(event_id)).await;
        match result {
            Ok(()) => info!("Invalidated seats cache for event {}", event_id),
            Err(e) => warn!("seat cache invalidation failed for event {}: {:?}", event_id, e),
        }
    }
}
