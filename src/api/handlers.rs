use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::models::Recommendation;

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub count: usize,
    pub titles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PosterQuery {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct PosterResponse {
    pub title: String,
    pub poster_url: String,
}

fn require_title(title: &str) -> AppResult<&str> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
    }
    Ok(title)
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "catalog_size": state.catalog().len()
        })),
    )
}

/// All selectable titles, in catalog order
pub async fn list_movies(State(state): State<AppState>) -> Json<MovieListResponse> {
    let titles: Vec<String> = state
        .catalog()
        .items()
        .iter()
        .map(|item| item.title.clone())
        .collect();

    Json(MovieListResponse {
        count: titles.len(),
        titles,
    })
}

/// Top recommendations for the selected title, with posters
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<Recommendation>> {
    let Json(request) = payload?;
    let title = require_title(&request.title)?;

    tracing::info!(
        request_id = %request_id,
        title = %title,
        "Processing recommendation request"
    );

    let recommendation = state.recommender.recommend(title).await.map_err(|e| {
        tracing::warn!(request_id = %request_id, error = %e, "Recommendation failed");
        e
    })?;

    Ok(Json(recommendation))
}

/// Poster URL for a single title
pub async fn poster(
    State(state): State<AppState>,
    params: Result<Query<PosterQuery>, QueryRejection>,
) -> AppResult<Json<PosterResponse>> {
    let Query(params) = params?;
    let title = require_title(&params.title)?;
    let poster_url = state.posters().resolve(title).await;

    Ok(Json(PosterResponse {
        title: title.to_string(),
        poster_url,
    }))
}
