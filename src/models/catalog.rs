use serde::Serialize;

use crate::error::{AppError, AppResult};

/// A recommendable movie, identified by its position in the catalog
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Item {
    pub id: usize,
    /// Identifier from the upstream dataset, informational only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie_id: Option<u64>,
    pub title: String,
}

/// Square matrix of pairwise similarity scores, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<f32>,
}

impl SimilarityMatrix {
    /// Builds a matrix from rows, rejecting anything that is not square
    pub fn from_rows(rows: Vec<Vec<f32>>) -> AppResult<Self> {
        let size = rows.len();
        let mut scores = Vec::with_capacity(size * size);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(AppError::InvalidCatalog(format!(
                    "similarity row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    size
                )));
            }
            scores.extend(row);
        }

        Ok(Self { size, scores })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Similarity of item `index` to every item, itself included
    pub fn row(&self, index: usize) -> &[f32] {
        let start = index * self.size;
        &self.scores[start..start + self.size]
    }
}

/// Immutable catalog of items with their similarity matrix
///
/// Matrix index `i` always refers to `items[i]`; the pairing is positional and
/// checked once at construction.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    similarity: SimilarityMatrix,
}

impl Catalog {
    pub fn new(items: Vec<Item>, similarity: SimilarityMatrix) -> AppResult<Self> {
        if items.is_empty() {
            return Err(AppError::InvalidCatalog("catalog is empty".to_string()));
        }

        if items.len() != similarity.size() {
            return Err(AppError::InvalidCatalog(format!(
                "catalog has {} movies but similarity matrix is {}x{}",
                items.len(),
                similarity.size(),
                similarity.size()
            )));
        }

        if let Some((position, item)) = items.iter().enumerate().find(|(i, item)| item.id != *i) {
            return Err(AppError::InvalidCatalog(format!(
                "movie '{}' at position {} carries id {}",
                item.title, position, item.id
            )));
        }

        Ok(Self { items, similarity })
    }

    /// Convenience constructor that assigns ordinal ids to bare titles
    pub fn from_titles<S: Into<String>>(
        titles: impl IntoIterator<Item = S>,
        rows: Vec<Vec<f32>>,
    ) -> AppResult<Self> {
        let items = titles
            .into_iter()
            .enumerate()
            .map(|(id, title)| Item {
                id,
                movie_id: None,
                title: title.into(),
            })
            .collect();

        Self::new(items, SimilarityMatrix::from_rows(rows)?)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Position of the first item whose title matches exactly
    pub fn position_of(&self, title: &str) -> Option<usize> {
        self.items.iter().position(|item| item.title == title)
    }

    pub fn similarity_row(&self, index: usize) -> &[f32] {
        self.similarity.row(index)
    }
}
