/// TMDB poster source
///
/// Uses `/3/search/movie` and takes the `poster_path` of the best (first)
/// match. TMDB returns paths only, so they are joined with the image host.
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    services::posters::PosterSource,
};

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    #[serde(default)]
    poster_path: Option<String>,
}

impl TmdbSearchResponse {
    fn first_poster_path(self) -> Option<String> {
        self.results
            .into_iter()
            .next()
            .and_then(|movie| movie.poster_path)
            .filter(|path| !path.trim().is_empty())
    }
}

#[derive(Clone)]
pub struct TmdbSource {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_base_url: String,
}

impl TmdbSource {
    pub fn new(
        http_client: HttpClient,
        api_key: String,
        api_url: String,
        image_base_url: String,
    ) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
            image_base_url,
        }
    }

    /// Full image URL for a TMDB `poster_path`
    fn image_url(&self, poster_path: &str) -> String {
        format!(
            "{}/{}",
            self.image_base_url.trim_end_matches('/'),
            poster_path.trim_start_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl PosterSource for TmdbSource {
    async fn lookup(&self, title: &str) -> AppResult<Option<String>> {
        let url = format!("{}/3/search/movie", self.api_url.trim_end_matches('/'));

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", title)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let data: TmdbSearchResponse = response.json().await?;

        Ok(data
            .first_poster_path()
            .map(|path| self.image_url(&path)))
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
