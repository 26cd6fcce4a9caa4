use std::time::Duration;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryPosterCache;
pub use self::redis::{create_redis_client, RedisPosterCache};

/// Storage for resolved poster URLs, keyed by movie title
///
/// Backends never fail: a broken backend behaves like an empty cache.
#[async_trait::async_trait]
pub trait PosterCache: Send + Sync {
    /// Returns the cached URL if present and not yet expired
    async fn get(&self, title: &str) -> Option<String>;

    /// Stores a URL for `ttl`, replacing any previous entry
    async fn put(&self, title: &str, url: String, ttl: Duration);

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
