use std::cmp::Ordering;
use std::sync::Arc;

use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{Catalog, Neighbor, Recommendation, RecommendedMovie},
    services::posters::PosterResolver,
};

/// Number of movies returned per recommendation
pub const RECOMMENDATION_COUNT: usize = 5;

/// Smallest catalog that can fill a recommendation besides the selected movie
pub const MIN_CATALOG_SIZE: usize = RECOMMENDATION_COUNT + 1;

/// Recommends the movies most similar to a selected one
///
/// Ranking reads the immutable catalog only; posters come from the shared
/// resolver.
#[derive(Clone)]
pub struct Recommender {
    catalog: Arc<Catalog>,
    posters: Arc<PosterResolver>,
}

impl Recommender {
    pub fn new(catalog: Arc<Catalog>, posters: Arc<PosterResolver>) -> Self {
        Self { catalog, posters }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn posters(&self) -> &Arc<PosterResolver> {
        &self.posters
    }

    /// Ranks the nearest neighbors of `selected_title`
    ///
    /// Candidates are every other catalog entry, ordered by descending score and
    /// then by ascending catalog position. The selected entry is excluded by
    /// position, so a duplicate title elsewhere in the catalog can still appear.
    pub fn rank(&self, selected_title: &str) -> AppResult<Vec<Neighbor>> {
        if self.catalog.len() < MIN_CATALOG_SIZE {
            return Err(AppError::InsufficientCatalogSize {
                required: MIN_CATALOG_SIZE,
                actual: self.catalog.len(),
            });
        }

        let selected = self
            .catalog
            .position_of(selected_title)
            .ok_or_else(|| AppError::ItemNotFound(selected_title.to_string()))?;

        let mut candidates: Vec<(usize, f32)> = self
            .catalog
            .similarity_row(selected)
            .iter()
            .copied()
            .enumerate()
            .filter(|(index, _)| *index != selected)
            .collect();

        candidates.sort_by(|a, b| by_score_then_index(*a, *b));

        let neighbors = candidates
            .into_iter()
            .take(RECOMMENDATION_COUNT)
            .filter_map(|(index, score)| {
                self.catalog.item(index).map(|item| Neighbor {
                    index,
                    title: item.title.clone(),
                    score,
                })
            })
            .collect();

        Ok(neighbors)
    }

    /// Ranks neighbors of `selected_title` and attaches a poster to each
    ///
    /// Posters are resolved concurrently and reassembled in rank order. Ranking
    /// errors return before any poster lookup starts.
    #[instrument(skip(self))]
    pub async fn recommend(&self, selected_title: &str) -> AppResult<Recommendation> {
        let neighbors = self.rank(selected_title)?;

        let tasks: Vec<_> = neighbors
            .iter()
            .map(|neighbor| {
                let posters = self.posters.clone();
                let title = neighbor.title.clone();
                tokio::spawn(async move { posters.resolve(&title).await })
            })
            .collect();

        let mut recommendations = Vec::with_capacity(neighbors.len());
        for (neighbor, task) in neighbors.into_iter().zip(tasks) {
            let poster_url = match task.await {
                Ok(url) => url,
                Err(e) => {
                    tracing::error!(error = %e, title = %neighbor.title, "Poster task join error");
                    self.posters.placeholder(&neighbor.title)
                }
            };

            recommendations.push(RecommendedMovie {
                title: neighbor.title,
                poster_url,
                score: neighbor.score,
            });
        }

        tracing::info!(
            selected = %selected_title,
            results = recommendations.len(),
            "Recommendation completed"
        );

        Ok(Recommendation {
            selected: selected_title.to_string(),
            recommendations,
        })
    }
}

/// Descending score, ties by ascending index; NaN scores sort last
///
/// Scores compare numerically, so `-0.0` and `0.0` tie.
fn by_score_then_index(a: (usize, f32), b: (usize, f32)) -> Ordering {
    match (a.1.is_nan(), b.1.is_nan()) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        _ => b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal),
    }
    .then_with(|| a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryPosterCache;
    use crate::services::posters::{MockPosterSource, PosterSource};
    use std::time::Duration;

    const PLACEHOLDER: &str = "https://via.placeholder.com/300x450/1a1a1a/ffffff";

    /// Catalog A..G where A's row is [1.0, 0.8, 0.9, 0.3, 0.2, 0.5, 0.1]
    fn scenario_catalog() -> Catalog {
        let titles = ["A", "B", "C", "D", "E", "F", "G"];
        let a_row = [1.0, 0.8, 0.9, 0.3, 0.2, 0.5, 0.1];
        let rows = (0..titles.len())
            .map(|i| {
                (0..titles.len())
                    .map(|j| match (i, j) {
                        (0, j) => a_row[j],
                        (i, 0) => a_row[i],
                        (i, j) if i == j => 1.0,
                        (i, j) => 1.0 / (1.0 + (i as f32 - j as f32).abs()),
                    })
                    .collect()
            })
            .collect();
        Catalog::from_titles(titles, rows).unwrap()
    }

    fn uniform_catalog(n: usize, score: f32) -> Catalog {
        let titles: Vec<String> = (0..n).map(|i| format!("Movie {}", i)).collect();
        let rows = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { score }).collect())
            .collect();
        Catalog::from_titles(titles, rows).unwrap()
    }

    fn placeholder_resolver() -> Arc<PosterResolver> {
        Arc::new(PosterResolver::new(
            vec![],
            Arc::new(MemoryPosterCache::new()),
            PLACEHOLDER.to_string(),
            Duration::from_secs(3600),
        ))
    }

    fn recommender(catalog: Catalog) -> Recommender {
        Recommender::new(Arc::new(catalog), placeholder_resolver())
    }

    #[test]
    fn test_rank_scenario_order() {
        let recommender = recommender(scenario_catalog());
        let titles: Vec<String> = recommender
            .rank("A")
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["C", "B", "F", "D", "E"]);
    }

    #[test]
    fn test_rank_returns_five_distinct_titles_excluding_selection() {
        let catalog = scenario_catalog();
        let titles: Vec<String> = catalog.items().iter().map(|i| i.title.clone()).collect();
        let recommender = recommender(catalog);

        for title in &titles {
            let neighbors = recommender.rank(title).unwrap();
            assert_eq!(neighbors.len(), RECOMMENDATION_COUNT);
            assert!(neighbors.iter().all(|n| &n.title != title));

            let mut distinct: Vec<&str> = neighbors.iter().map(|n| n.title.as_str()).collect();
            distinct.sort();
            distinct.dedup();
            assert_eq!(distinct.len(), RECOMMENDATION_COUNT);

            assert!(neighbors.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }

    #[test]
    fn test_ties_break_by_catalog_position() {
        let recommender = recommender(uniform_catalog(8, 0.5));
        let indices: Vec<usize> = recommender
            .rank("Movie 3")
            .unwrap()
            .into_iter()
            .map(|n| n.index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 4, 5]);
    }

    #[test]
    fn test_self_excluded_even_when_not_maximal() {
        let titles = ["A", "B", "C", "D", "E", "F"];
        let mut rows = vec![vec![0.0_f32; 6]; 6];
        rows[0] = vec![0.1, 0.9, 0.8, 0.7, 0.6, 0.5];
        let recommender = recommender(Catalog::from_titles(titles, rows).unwrap());

        let titles: Vec<String> = recommender
            .rank("A")
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["B", "C", "D", "E", "F"]);
    }

    #[test]
    fn test_duplicate_title_uses_first_match() {
        let titles = ["Heat", "B", "C", "D", "E", "Heat", "G"];
        let mut rows = vec![vec![0.0_f32; 7]; 7];
        rows[0] = vec![1.0, 0.2, 0.3, 0.4, 0.5, 0.9, 0.1];
        rows[5] = vec![0.9, 0.6, 0.6, 0.6, 0.6, 1.0, 0.6];
        let recommender = recommender(Catalog::from_titles(titles, rows).unwrap());

        let neighbors = recommender.rank("Heat").unwrap();
        assert_eq!(neighbors[0].index, 5);
        assert_eq!(neighbors[1].title, "E");
    }

    #[test]
    fn test_nan_scores_sort_last() {
        let titles = ["A", "B", "C", "D", "E", "F", "G"];
        let mut rows = vec![vec![0.0_f32; 7]; 7];
        rows[0] = vec![1.0, f32::NAN, 0.2, 0.3, 0.4, 0.5, 0.6];
        let recommender = recommender(Catalog::from_titles(titles, rows).unwrap());

        let titles: Vec<String> = recommender
            .rank("A")
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["G", "F", "E", "D", "C"]);
    }

    #[test]
    fn test_signed_zero_scores_tie_by_position() {
        let titles = ["A", "B", "C", "D", "E", "F", "G"];
        let mut rows = vec![vec![0.0_f32; 7]; 7];
        rows[0] = vec![1.0, -0.0, 0.0, 0.0, -0.0, 0.0, 0.0];
        let recommender = recommender(Catalog::from_titles(titles, rows).unwrap());

        let indices: Vec<usize> = recommender
            .rank("A")
            .unwrap()
            .into_iter()
            .map(|n| n.index)
            .collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_multiple_nan_scores_tie_by_position() {
        let titles = ["A", "B", "C", "D", "E", "F", "G"];
        let mut rows = vec![vec![0.0_f32; 7]; 7];
        rows[0] = vec![1.0, f32::NAN, 0.9, f32::NAN, 0.8, 0.7, f32::NAN];
        let recommender = recommender(Catalog::from_titles(titles, rows).unwrap());

        let indices: Vec<usize> = recommender
            .rank("A")
            .unwrap()
            .into_iter()
            .map(|n| n.index)
            .collect();
        assert_eq!(indices, vec![2, 4, 5, 1, 3]);
    }

    #[test]
    fn test_unknown_title() {
        let recommender = recommender(scenario_catalog());
        let result = recommender.rank("Z");
        assert!(matches!(result, Err(AppError::ItemNotFound(title)) if title == "Z"));
    }

    #[test]
    fn test_small_catalog() {
        let recommender = recommender(uniform_catalog(5, 0.3));
        let result = recommender.rank("Movie 0");
        assert!(matches!(
            result,
            Err(AppError::InsufficientCatalogSize {
                required: 6,
                actual: 5
            })
        ));
    }

    #[tokio::test]
    async fn test_recommend_attaches_posters_in_rank_order() {
        let mut source = MockPosterSource::new();
        source.expect_name().return_const("omdb");
        source
            .expect_lookup()
            .times(5)
            .returning(|title| Ok(Some(format!("https://posters/{}.jpg", title))));

        let posters = Arc::new(PosterResolver::new(
            vec![Arc::new(source) as Arc<dyn PosterSource>],
            Arc::new(MemoryPosterCache::new()),
            PLACEHOLDER.to_string(),
            Duration::from_secs(3600),
        ));
        let recommender = Recommender::new(Arc::new(scenario_catalog()), posters);

        let result = recommender.recommend("A").await.unwrap();
        assert_eq!(result.selected, "A");
        assert_eq!(result.titles(), vec!["C", "B", "F", "D", "E"]);
        assert_eq!(
            result.poster_urls(),
            vec![
                "https://posters/C.jpg",
                "https://posters/B.jpg",
                "https://posters/F.jpg",
                "https://posters/D.jpg",
                "https://posters/E.jpg",
            ]
        );
    }

    #[tokio::test]
    async fn test_recommend_is_idempotent() {
        let recommender = recommender(scenario_catalog());
        let first = recommender.recommend("D").await.unwrap();
        let second = recommender.recommend("D").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failed_ranking_resolves_no_posters() {
        let mut source = MockPosterSource::new();
        source.expect_name().return_const("omdb");
        source.expect_lookup().never();

        let posters = Arc::new(PosterResolver::new(
            vec![Arc::new(source) as Arc<dyn PosterSource>],
            Arc::new(MemoryPosterCache::new()),
            PLACEHOLDER.to_string(),
            Duration::from_secs(3600),
        ));

        let small = Recommender::new(Arc::new(uniform_catalog(4, 0.2)), posters.clone());
        assert!(matches!(
            small.recommend("Movie 1").await,
            Err(AppError::InsufficientCatalogSize { .. })
        ));

        let full = Recommender::new(Arc::new(scenario_catalog()), posters);
        assert!(matches!(
            full.recommend("Nope").await,
            Err(AppError::ItemNotFound(_))
        ));
    }
}
