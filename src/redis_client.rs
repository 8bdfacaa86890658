use redis::{aio::ConnectionManager, Client};
use tracing::info;

/// Redis handle with automatic reconnects; cheap to clone.
#[derive(Clone)]
pub struct RedisClient {
    pub conn: ConnectionManager,
}

impl RedisClient {
    pub async fn new(redis_url: &str) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let mut conn = ConnectionManager::new(client).await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!("Redis connection established");
        Ok(RedisClient { conn })
    }
}
