use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use url::form_urlencoded;

use crate::{cache::PosterCache, services::posters::PosterSource};

/// Fallback image showing the title as text, spaces encoded as `+`
pub fn placeholder_url(base: &str, title: &str) -> String {
    let text: String = form_urlencoded::byte_serialize(title.as_bytes()).collect();
    format!("{}?text={}", base.trim_end_matches('/'), text)
}

/// Maps movie titles to poster image URLs
///
/// Sources are tried in order and the first poster wins. When every source
/// fails the title gets a placeholder image, so `resolve` always produces a
/// URL. Both outcomes are cached for `ttl`.
pub struct PosterResolver {
    sources: Vec<Arc<dyn PosterSource>>,
    cache: Arc<dyn PosterCache>,
    placeholder_base: String,
    ttl: Duration,
    /// One lock per title being resolved, so a title has at most one lookup in flight
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PosterResolver {
    pub fn new(
        sources: Vec<Arc<dyn PosterSource>>,
        cache: Arc<dyn PosterCache>,
        placeholder_base: String,
        ttl: Duration,
    ) -> Self {
        tracing::info!(
            sources = ?sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            cache = cache.name(),
            ttl_secs = ttl.as_secs(),
            "Poster resolver configured"
        );

        Self {
            sources,
            cache,
            placeholder_base,
            ttl,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a displayable poster URL for `title`; never fails
    pub async fn resolve(&self, title: &str) -> String {
        if let Some(url) = self.cache.get(title).await {
            tracing::debug!(title = %title, "Poster cache hit");
            return url;
        }

        let title_lock = self.title_lock(title).await;
        let url = {
            let _guard = title_lock.lock().await;

            // Another task may have filled the cache while we waited
            match self.cache.get(title).await {
                Some(url) => url,
                None => {
                    let url = self.lookup_sources(title).await;
                    self.cache.put(title, url.clone(), self.ttl).await;
                    url
                }
            }
        };
        self.release_title_lock(title, title_lock).await;

        url
    }

    async fn lookup_sources(&self, title: &str) -> String {
        for source in &self.sources {
            match source.lookup(title).await {
                Ok(Some(url)) => {
                    tracing::info!(title = %title, source = source.name(), "Poster resolved");
                    return url;
                }
                Ok(None) => {
                    tracing::debug!(title = %title, source = source.name(), "No poster from source");
                }
                Err(e) => {
                    tracing::warn!(
                        title = %title,
                        source = source.name(),
                        error = %e,
                        "Poster lookup failed"
                    );
                }
            }
        }

        tracing::info!(title = %title, "Using placeholder poster");
        self.placeholder(title)
    }

    /// Placeholder URL for `title` under this resolver's configured base
    pub fn placeholder(&self, title: &str) -> String {
        placeholder_url(&self.placeholder_base, title)
    }

    async fn title_lock(&self, title: &str) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().await;
        in_flight
            .entry(title.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn release_title_lock(&self, title: &str, title_lock: Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().await;
        // The map holds one reference and we hold another; anything more is a waiter
        if Arc::strong_count(&title_lock) <= 2 {
            in_flight.remove(title);
        }
    }
}
