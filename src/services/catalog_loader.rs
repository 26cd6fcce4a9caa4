use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{Catalog, Item, SimilarityMatrix},
};

/// Catalog entry as stored on disk: either a bare title or a record
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogRecord {
    Title(String),
    Movie {
        title: String,
        #[serde(default)]
        movie_id: Option<u64>,
    },
}

/// Loads the catalog and its similarity matrix from two JSON artifacts
///
/// The catalog file is an array of titles (or `{ "title", "movie_id" }` records)
/// and the similarity file an array of rows. Row `i` must describe entry `i`.
pub fn load(catalog_path: impl AsRef<Path>, similarity_path: impl AsRef<Path>) -> AppResult<Catalog> {
    let records: Vec<CatalogRecord> = read_json(catalog_path.as_ref())?;
    let rows: Vec<Vec<f32>> = read_json(similarity_path.as_ref())?;

    let items: Vec<Item> = records
        .into_iter()
        .enumerate()
        .map(|(id, record)| match record {
            CatalogRecord::Title(title) => Item {
                id,
                movie_id: None,
                title,
            },
            CatalogRecord::Movie { title, movie_id } => Item {
                id,
                movie_id,
                title,
            },
        })
        .collect();

    let catalog = Catalog::new(items, SimilarityMatrix::from_rows(rows)?)?;

    tracing::info!(
        movies = catalog.len(),
        catalog = %catalog_path.as_ref().display(),
        similarity = %similarity_path.as_ref().display(),
        "Catalog loaded"
    );

    Ok(catalog)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::Load(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_records_and_matrix() {
        let catalog = write_temp(
            r#"[{"movie_id": 19995, "title": "Avatar"}, {"movie_id": 285, "title": "Pirates of the Caribbean"}]"#,
        );
        let similarity = write_temp("[[1.0, 0.12], [0.12, 1.0]]");

        let catalog = load(catalog.path(), similarity.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.items()[0].movie_id, Some(19995));
        assert_eq!(catalog.items()[1].title, "Pirates of the Caribbean");
        assert_eq!(catalog.items()[1].id, 1);
        assert_eq!(catalog.similarity_row(0), &[1.0, 0.12]);
    }

    #[test]
    fn test_load_bare_titles() {
        let catalog = write_temp(r#"["Alien", "Aliens"]"#);
        let similarity = write_temp("[[1, 0.9], [0.9, 1]]");

        let catalog = load(catalog.path(), similarity.path()).unwrap();
        assert_eq!(catalog.position_of("Aliens"), Some(1));
        assert_eq!(catalog.items()[0].movie_id, None);
    }

    #[test]
    fn test_load_rejects_mismatched_shapes() {
        let catalog = write_temp(r#"["Alien", "Aliens", "Heat"]"#);
        let similarity = write_temp("[[1, 0.9], [0.9, 1]]");

        let result = load(catalog.path(), similarity.path());
        assert!(matches!(result, Err(AppError::InvalidCatalog(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let similarity = write_temp("[[1]]");
        let result = load("/nonexistent/movie_list.json", similarity.path());
        assert!(matches!(result, Err(AppError::Load(_))));
    }

    #[test]
    fn test_load_malformed_json() {
        let catalog = write_temp("not json");
        let similarity = write_temp("[[1]]");
        let result = load(catalog.path(), similarity.path());
        assert!(matches!(result, Err(AppError::Load(_))));
    }
}
