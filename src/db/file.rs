use std::path::PathBuf;

use super::{CatalogError, CatalogQuery, RecipeCatalog};
use crate::models::DishRecord;

/// Recipe catalog read from a JSON array on disk, for local development
///
/// The file is re-read on every fetch so edits show up without a restart.
#[derive(Clone)]
pub struct FileRecipeCatalog {
    path: PathBuf,
}

impl FileRecipeCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn select(dishes: Vec<DishRecord>, query: &CatalogQuery) -> Vec<DishRecord> {
        dishes
            .into_iter()
            .filter(|dish| query.matches(dish))
            .take(query.limit)
            .collect()
    }
}

#[async_trait::async_trait]
impl RecipeCatalog for FileRecipeCatalog {
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<DishRecord>, CatalogError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let dishes: Vec<DishRecord> = serde_json::from_str(&contents)?;
        let dishes = Self::select(dishes, query);

        tracing::info!(
            rows = dishes.len(),
            path = %self.path.display(),
            provider = "file",
            "Recipe catalog fetched"
        );

        if dishes.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(dishes)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
