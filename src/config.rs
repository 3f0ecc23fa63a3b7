use serde::Deserialize;

use crate::error::AppError;

/// Upper bound on documents pulled from the recipe catalog per request
pub const MAX_CATALOG_FETCH: usize = 500;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// OpenRouter API key used for every completion call
    pub openrouter_api_key: String,

    /// OpenAI-compatible completion API base URL
    #[serde(default = "default_openrouter_api_url")]
    pub openrouter_api_url: String,

    /// Model tried first for every completion
    #[serde(default = "default_primary_model")]
    pub primary_model: String,

    /// Model tried once when the primary fails with a retryable status
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,

    /// Attribution headers sent to OpenRouter
    #[serde(default = "default_app_referer")]
    pub app_referer: String,
    #[serde(default = "default_app_title")]
    pub app_title: String,

    /// PostgreSQL connection URL for the recipe catalog
    #[serde(default)]
    pub database_url: Option<String>,

    /// JSON file holding recipe documents, used when no database is configured
    #[serde(default)]
    pub catalog_path: Option<String>,

    #[serde(default = "default_catalog_fetch_limit")]
    pub catalog_fetch_limit: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_openrouter_api_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_primary_model() -> String {
    "google/gemini-flash-1.5".to_string()
}

fn default_fallback_model() -> String {
    "meta-llama/llama-3.1-8b-instruct".to_string()
}

fn default_app_referer() -> String {
    "https://mydishgenie.vercel.app".to_string()
}

fn default_app_title() -> String {
    "MyDishGenie".to_string()
}

fn default_catalog_fetch_limit() -> usize {
    MAX_CATALOG_FETCH
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that cannot serve a single request
    pub fn validate(&self) -> Result<(), AppError> {
        if self.openrouter_api_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "OPENROUTER_API_KEY is not set".to_string(),
            ));
        }
        if self.primary_model.trim().is_empty() || self.fallback_model.trim().is_empty() {
            return Err(AppError::Configuration(
                "PRIMARY_MODEL and FALLBACK_MODEL must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Catalog fetch size, clamped to the store's hard limit
    pub fn fetch_limit(&self) -> usize {
        self.catalog_fetch_limit.clamp(1, MAX_CATALOG_FETCH)
    }
}
