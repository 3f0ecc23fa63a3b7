use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::{completion::ModelError, normalizer::ParseError};

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Human-readable summary shown to the caller alongside the diagnostic detail
    fn public_message(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "Server configuration error.",
            AppError::InvalidInput(_) => "Invalid request.",
            AppError::Model(_) | AppError::Parse(_) => "Failed to generate a response from the AI.",
            AppError::Internal(_) => "Internal server error.",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_)
            | AppError::Model(_)
            | AppError::Parse(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.public_message(),
            "details": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
