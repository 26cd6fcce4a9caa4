use std::time::Duration;

use redis::AsyncCommands;
use redis::Client;

use super::PosterCache;
use crate::error::AppResult;

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Redis key under which a title's poster URL is stored
///
/// Titles match exactly, so the key keeps the title's case.
pub fn poster_key(title: &str) -> String {
    format!("poster:{}", title)
}

/// Poster cache shared between instances through Redis
///
/// Writes go through synchronously: `put` returns once `SET EX` has landed, so
/// a request queued behind the resolving one reads the fresh entry.
#[derive(Clone)]
pub struct RedisPosterCache {
    redis_client: Client,
}

impl RedisPosterCache {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }

    async fn write_to_redis(&self, key: &str, value: &str, ttl: u64) -> AppResult<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(key, value, ttl).await?;
        Ok(())
    }

    async fn read_from_redis(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key).await?;
        Ok(cached)
    }
}

#[async_trait::async_trait]
impl PosterCache for RedisPosterCache {
    async fn get(&self, title: &str) -> Option<String> {
        match self.read_from_redis(&poster_key(title)).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(error = %e, title = %title, "Redis read failed, treating as miss");
                None
            }
        }
    }

    async fn put(&self, title: &str, url: String, ttl: Duration) {
        // SET EX rejects a zero expiry
        let ttl = ttl.as_secs().max(1);

        if let Err(e) = self.write_to_redis(&poster_key(title), &url, ttl).await {
            tracing::error!(error = %e, title = %title, "Failed to write to Redis cache");
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
