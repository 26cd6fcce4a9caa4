/// Poster lookup
///
/// A title is mapped to an image URL by asking an ordered chain of metadata
/// sources (OMDb first, TMDB second) and falling back to a generated
/// placeholder image. Results are cached per title.
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::error::AppResult;

pub mod omdb;
pub mod resolver;
pub mod tmdb;

pub use omdb::OmdbSource;
pub use resolver::{placeholder_url, PosterResolver};
pub use tmdb::TmdbSource;

/// A metadata service that may know a poster for a title
///
/// `Ok(None)` means the service answered but had no usable poster; `Err` covers
/// transport, status and decoding failures. The resolver treats both as "try
/// the next source".
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterSource: Send + Sync {
    async fn lookup(&self, title: &str) -> AppResult<Option<String>>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// HTTP client shared by the poster sources, every request bounded by `timeout`
pub fn build_http_client(timeout: Duration) -> AppResult<HttpClient> {
    let client = HttpClient::builder().timeout(timeout).build()?;
    Ok(client)
}
