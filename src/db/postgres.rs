use sqlx::{postgres::PgPoolOptions, PgPool};

use super::{CatalogError, CatalogQuery, RecipeCatalog};
use crate::models::DishRecord;

/// Creates a PostgreSQL connection pool
///
/// Connects lazily so the server starts even when the catalog database is
/// down; fetch failures then route requests to the knowledge-only prompt.
pub fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(database_url)?;

    Ok(pool)
}

/// Recipe documents stored as JSONB in `recipes(id TEXT PRIMARY KEY, document JSONB NOT NULL)`
#[derive(Clone)]
pub struct PgRecipeCatalog {
    pool: PgPool,
}

impl PgRecipeCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Decodes one row, falling back to the row key when the document has no id
    fn decode(id: String, document: serde_json::Value) -> Result<DishRecord, CatalogError> {
        let mut dish: DishRecord = serde_json::from_value(document)?;
        if dish.id.is_none() {
            dish.id = Some(id);
        }
        Ok(dish)
    }
}

#[async_trait::async_trait]
impl RecipeCatalog for PgRecipeCatalog {
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<DishRecord>, CatalogError> {
        let rows: Vec<(String, serde_json::Value)> = sqlx::query_as(
            r#"
            SELECT id, document
            FROM recipes
            WHERE $1::text IS NULL OR lower(document->>'diet') = lower($1)
            LIMIT $2
            "#,
        )
        .bind(query.diet.as_deref())
        .bind(query.limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut dishes = Vec::with_capacity(rows.len());
        for (id, document) in rows {
            match Self::decode(id.clone(), document) {
                Ok(dish) => dishes.push(dish),
                Err(e) => tracing::warn!(recipe_id = %id, error = %e, "Skipping undecodable recipe"),
            }
        }

        tracing::info!(
            rows = dishes.len(),
            diet = ?query.diet,
            provider = "postgres",
            "Recipe catalog fetched"
        );

        if dishes.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(dishes)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
