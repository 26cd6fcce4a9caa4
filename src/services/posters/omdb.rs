/// OMDb poster source
///
/// Looks a movie up by exact title (`?t=`). OMDb reports a missing poster as
/// the literal string `"N/A"`.
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    services::posters::PosterSource,
};

const MISSING_POSTER: &str = "N/A";

#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Poster", default)]
    poster: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

impl OmdbResponse {
    fn into_poster(self) -> Option<String> {
        self.poster
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty() && p != MISSING_POSTER)
    }
}

#[derive(Clone)]
pub struct OmdbSource {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OmdbSource {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
        }
    }
}

#[async_trait::async_trait]
impl PosterSource for OmdbSource {
    async fn lookup(&self, title: &str) -> AppResult<Option<String>> {
        let url = format!("{}/", self.api_url.trim_end_matches('/'));

        let response = self
            .http_client
            .get(&url)
            .query(&[("t", title), ("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OMDb API returned status {}: {}",
                status, body
            )));
        }

        let data: OmdbResponse = response.json().await?;
        if let Some(error) = &data.error {
            tracing::debug!(title = %title, error = %error, "OMDb has no match");
        }

        Ok(data.into_poster())
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}
