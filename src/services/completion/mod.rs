/// Chat-completion abstraction
///
/// A `CompletionService` performs a single call against one model. The
/// `CompletionClient` layers the primary/fallback policy on top: one immediate
/// retry against the fallback model when the primary fails with a retryable
/// status, never more.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

#[cfg(test)]
use mockall::automock;

pub mod openrouter;

/// Role of a message in a chat-completion conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One completion call against a single model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Ask the model for a JSON object response
    pub json_output: bool,
}

/// Completion failures
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("Model API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Model request failed: {0}")]
    Transport(String),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Primary model failed ({primary}); fallback model failed ({fallback})")]
    FallbackExhausted {
        primary: Box<ModelError>,
        fallback: Box<ModelError>,
    },
}

impl ModelError {
    /// Rate limits and server errors may succeed on another model.
    /// Everything else points at a request or configuration defect.
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Trait for chat-completion backends
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    /// Runs one completion and returns the first choice's text
    async fn create(&self, request: &CompletionRequest) -> Result<String, ModelError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Completion calls with a single fallback-model retry
#[derive(Clone)]
pub struct CompletionClient {
    service: Arc<dyn CompletionService>,
    primary_model: String,
    fallback_model: String,
}

impl CompletionClient {
    pub fn new(
        service: Arc<dyn CompletionService>,
        primary_model: impl Into<String>,
        fallback_model: impl Into<String>,
    ) -> Self {
        Self {
            service,
            primary_model: primary_model.into(),
            fallback_model: fallback_model.into(),
        }
    }

    /// Sends a single user prompt and requests JSON output
    pub async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.complete_messages(vec![ChatMessage::user(prompt)], true)
            .await
    }

    /// Sends a conversation to the primary model, falling back once on 429/5xx
    #[instrument(skip(self, messages), fields(provider = self.service.name(), turns = messages.len()))]
    pub async fn complete_messages(
        &self,
        messages: Vec<ChatMessage>,
        json_output: bool,
    ) -> Result<String, ModelError> {
        let mut request = CompletionRequest {
            model: self.primary_model.clone(),
            messages,
            json_output,
        };

        let primary_error = match self.service.create(&request).await {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        if !primary_error.is_retryable() {
            tracing::error!(
                model = %self.primary_model,
                provider = self.service.name(),
                error = %primary_error,
                "Primary model failed with a non-retryable error"
            );
            return Err(primary_error);
        }

        tracing::warn!(
            primary = %self.primary_model,
            fallback = %self.fallback_model,
            provider = self.service.name(),
            error = %primary_error,
            "Primary model unavailable, retrying with fallback model"
        );

        request.model = self.fallback_model.clone();
        match self.service.create(&request).await {
            Ok(text) => {
                tracing::info!(model = %self.fallback_model, "Fallback model succeeded");
                Ok(text)
            }
            Err(fallback_error) => {
                tracing::error!(
                    model = %self.fallback_model,
                    error = %fallback_error,
                    "Fallback model failed"
                );
                Err(ModelError::FallbackExhausted {
                    primary: Box::new(primary_error),
                    fallback: Box::new(fallback_error),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::function;
    use mockall::Sequence;

    fn api_error(status: u16) -> ModelError {
        ModelError::Api {
            status,
            message: format!("status {}", status),
        }
    }

    fn client(mock: MockCompletionService) -> CompletionClient {
        CompletionClient::new(Arc::new(mock), "primary-model", "fallback-model")
    }

    fn base_mock() -> MockCompletionService {
        let mut mock = MockCompletionService::new();
        mock.expect_name().return_const("mock");
        mock
    }

    #[test]
    fn test_retryable_classification() {
        assert!(api_error(429).is_retryable());
        assert!(api_error(500).is_retryable());
        assert!(api_error(503).is_retryable());
        assert!(!api_error(400).is_retryable());
        assert!(!api_error(401).is_retryable());
        assert!(!api_error(404).is_retryable());
        assert!(!ModelError::Transport("dns".to_string()).is_retryable());
        assert!(!ModelError::EmptyResponse.is_retryable());
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let mut mock = base_mock();
        mock.expect_create()
            .with(function(|r: &CompletionRequest| {
                r.model == "primary-model" && r.json_output
            }))
            .times(1)
            .returning(|_| Ok("{\"ok\":true}".to_string()));

        let text = client(mock).complete("hello").await.unwrap();
        assert_eq!(text, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_rate_limit_uses_fallback_once() {
        let mut mock = base_mock();
        let mut seq = Sequence::new();
        mock.expect_create()
            .with(function(|r: &CompletionRequest| r.model == "primary-model"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(api_error(429)));
        mock.expect_create()
            .with(function(|r: &CompletionRequest| {
                r.model == "fallback-model"
                    && r.json_output
                    && r.messages == vec![ChatMessage::user("hello")]
            }))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("fallback text".to_string()));

        let text = client(mock).complete("hello").await.unwrap();
        assert_eq!(text, "fallback text");
    }

    #[tokio::test]
    async fn test_server_error_then_fallback_failure_combines_messages() {
        let mut mock = base_mock();
        mock.expect_create()
            .times(2)
            .returning(|r| {
                if r.model == "primary-model" {
                    Err(api_error(502))
                } else {
                    Err(api_error(503))
                }
            });

        let err = client(mock).complete("hello").await.unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, ModelError::FallbackExhausted { .. }));
        assert!(message.contains("status 502"));
        assert!(message.contains("status 503"));
    }

    #[tokio::test]
    async fn test_bad_request_is_not_retried() {
        let mut mock = base_mock();
        mock.expect_create()
            .times(1)
            .returning(|_| Err(api_error(400)));

        let err = client(mock).complete("hello").await.unwrap_err();
        assert!(matches!(err, ModelError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_chat_messages_pass_through_without_json_flag() {
        let mut mock = base_mock();
        mock.expect_create()
            .with(function(|r: &CompletionRequest| {
                !r.json_output && r.messages.len() == 2 && r.messages[0].role == Role::System
            }))
            .times(1)
            .returning(|_| Ok("namaste".to_string()));

        let messages = vec![ChatMessage::system("persona"), ChatMessage::user("hi")];
        let reply = client(mock)
            .complete_messages(messages, false)
            .await
            .unwrap();
        assert_eq!(reply, "namaste");
    }
}
