/// Recipe catalog access
///
/// The catalog is an externally owned, read-only document collection. Every
/// failure here is recoverable: the recommendation pipeline switches to a
/// knowledge-only prompt instead of surfacing a `CatalogError`.
use crate::models::DishRecord;

#[cfg(test)]
use mockall::automock;

pub mod file;
pub mod postgres;

pub use file::FileRecipeCatalog;
pub use postgres::{create_pool, PgRecipeCatalog};

/// Catalog failures, never shown to the caller
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Recipe catalog is not configured")]
    Unavailable,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Catalog file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog document could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No recipes found in the catalog")]
    Empty,

    #[error("Only {0} recipes matched the user's preferences")]
    InsufficientMatches(usize),
}

/// Simple equality query against the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Case-insensitive equality on the `diet` field
    pub diet: Option<String>,
    pub limit: usize,
}

impl CatalogQuery {
    pub fn new(limit: usize) -> Self {
        Self { diet: None, limit }
    }

    pub fn with_diet(mut self, diet: impl Into<String>) -> Self {
        self.diet = Some(diet.into());
        self
    }

    /// True when a document satisfies the equality filters
    pub fn matches(&self, dish: &DishRecord) -> bool {
        self.diet.as_deref().map_or(true, |diet| dish.has_diet(diet))
    }
}

/// Trait for recipe catalog backends
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RecipeCatalog: Send + Sync {
    /// Fetches up to `query.limit` documents matching the query
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<DishRecord>, CatalogError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Catalog used when no backend is configured; every fetch fails
pub struct UnavailableCatalog;

#[async_trait::async_trait]
impl RecipeCatalog for UnavailableCatalog {
    async fn fetch(&self, _query: &CatalogQuery) -> Result<Vec<DishRecord>, CatalogError> {
        Err(CatalogError::Unavailable)
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}
