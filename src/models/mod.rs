use serde::Serialize;

pub mod catalog;

pub use catalog::{Catalog, Item, SimilarityMatrix};

/// A ranked neighbor of the selected movie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub index: usize,
    pub title: String,
    pub score: f32,
}

/// One entry of a recommendation, ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedMovie {
    pub title: String,
    pub poster_url: String,
    pub score: f32,
}

/// Result of a recommendation request, ordered by descending similarity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub selected: String,
    pub recommendations: Vec<RecommendedMovie>,
}

impl Recommendation {
    pub fn titles(&self) -> Vec<&str> {
        self.recommendations.iter().map(|m| m.title.as_str()).collect()
    }

    pub fn poster_urls(&self) -> Vec<&str> {
        self.recommendations
            .iter()
            .map(|m| m.poster_url.as_str())
            .collect()
    }
}
