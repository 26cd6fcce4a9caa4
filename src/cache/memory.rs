use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use super::PosterCache;

struct Entry {
    url: String,
    expires_at: Instant,
}

/// Process-local poster cache with per-entry expiry
#[derive(Default)]
pub struct MemoryPosterCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryPosterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries; expired ones linger until the next `put`
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl PosterCache for MemoryPosterCache {
    async fn get(&self, title: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(title)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.url.clone())
    }

    async fn put(&self, title: &str, url: String, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        // Titles come from clients, so expired entries must not accumulate
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            title.to_string(),
            Entry {
                url,
                expires_at: now + ttl,
            },
        );
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
