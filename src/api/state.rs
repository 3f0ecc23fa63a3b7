use std::sync::Arc;

use crate::{
    config::Config,
    db::{create_pool, FileRecipeCatalog, PgRecipeCatalog, RecipeCatalog, UnavailableCatalog},
    services::{
        completion::openrouter::OpenRouterService, CompletionClient, CompletionService,
        RecommendationEngine,
    },
};

/// Shared application state
///
/// Everything in here is read-only after start-up; requests share no mutable state.
#[derive(Clone)]
pub struct AppState {
    pub engine: RecommendationEngine,
    pub chat: CompletionClient,
}

impl AppState {
    pub fn new(engine: RecommendationEngine, chat: CompletionClient) -> Self {
        Self { engine, chat }
    }

    /// Wires the catalog backend and completion service named by the configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;

        let catalog = catalog_from_config(config)?;
        let service: Arc<dyn CompletionService> = Arc::new(OpenRouterService::from_config(config));
        let completion = CompletionClient::new(
            service,
            config.primary_model.clone(),
            config.fallback_model.clone(),
        );

        tracing::info!(
            catalog = catalog.name(),
            primary_model = %config.primary_model,
            fallback_model = %config.fallback_model,
            "Application state initialised"
        );

        let engine = RecommendationEngine::new(catalog, completion.clone(), config.fetch_limit());
        Ok(Self::new(engine, completion))
    }
}

fn catalog_from_config(config: &Config) -> anyhow::Result<Arc<dyn RecipeCatalog>> {
    if let Some(url) = config.database_url.as_deref().filter(|u| !u.trim().is_empty()) {
        let pool = create_pool(url)?;
        return Ok(Arc::new(PgRecipeCatalog::new(pool)));
    }

    if let Some(path) = config.catalog_path.as_deref().filter(|p| !p.trim().is_empty()) {
        return Ok(Arc::new(FileRecipeCatalog::new(path)));
    }

    tracing::warn!("No recipe catalog configured, every request will use knowledge-only prompts");
    Ok(Arc::new(UnavailableCatalog))
}
