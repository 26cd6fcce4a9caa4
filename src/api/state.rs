use std::sync::Arc;

use crate::models::Catalog;
use crate::services::{PosterResolver, Recommender};

/// Shared application state
///
/// Everything here is read-only after startup except the poster cache, which
/// synchronizes itself.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Recommender,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, posters: Arc<PosterResolver>) -> Self {
        Self {
            recommender: Recommender::new(catalog, posters),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.recommender.catalog()
    }

    pub fn posters(&self) -> &PosterResolver {
        self.recommender.posters()
    }
}
