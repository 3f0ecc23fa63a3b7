/// OpenRouter chat-completion backend
///
/// Speaks the OpenAI-compatible `/chat/completions` protocol, so any compatible
/// gateway works by changing the base URL.
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, CompletionRequest, CompletionService, ModelError};
use crate::config::Config;

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct OpenRouterService {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    referer: String,
    title: String,
}

impl OpenRouterService {
    pub fn new(api_key: String, api_url: String, referer: String, title: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            referer,
            title,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.openrouter_api_key.clone(),
            config.openrouter_api_url.clone(),
            config.app_referer.clone(),
            config.app_title.clone(),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_url.trim_end_matches('/'))
    }

    /// Pulls the human-readable message out of an error body when it has one
    fn error_message(body: &str) -> String {
        serde_json::from_str::<ApiErrorResponse>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string())
    }

    fn extract_content(response: ApiResponse) -> Result<String, ModelError> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ModelError::EmptyResponse)
    }
}

#[async_trait::async_trait]
impl CompletionService for OpenRouterService {
    async fn create(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        let body = ApiRequest {
            model: &request.model,
            messages: &request.messages,
            response_format: request.json_output.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ModelError::Api {
                status: status.as_u16(),
                message: Self::error_message(&text),
            });
        }

        let parsed: ApiResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                response = %text,
                "Failed to deserialize completion response"
            );
            ModelError::Transport(format!("Failed to parse completion response: {}", e))
        })?;

        let content = Self::extract_content(parsed)?;

        tracing::info!(
            model = %request.model,
            chars = content.len(),
            provider = "openrouter",
            "Completion received"
        );

        Ok(content)
    }

    fn name(&self) -> &'static str {
        "openrouter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::completion::Role;

    #[test]
    fn test_request_serialization_with_json_format() {
        let messages = vec![ChatMessage::user("recommend")];
        let body = ApiRequest {
            model: "google/gemini-flash-1.5",
            messages: &messages,
            response_format: Some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "google/gemini-flash-1.5");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "recommend");
        assert_eq!(value["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_request_serialization_without_json_format() {
        let messages = vec![ChatMessage {
            role: Role::Assistant,
            content: "hi".to_string(),
        }];
        let body = ApiRequest {
            model: "m",
            messages: &messages,
            response_format: None,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["messages"][0]["role"], "assistant");
        assert!(value.get("response_format").is_none());
    }

    #[test]
    fn test_extract_content() {
        let response: ApiResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"recommendations\":[]}"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            OpenRouterService::extract_content(response).unwrap(),
            "{\"recommendations\":[]}"
        );
    }

    #[test]
    fn test_extract_content_empty() {
        let response: ApiResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            OpenRouterService::extract_content(response),
            Err(ModelError::EmptyResponse)
        ));

        let response: ApiResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(
            OpenRouterService::extract_content(response),
            Err(ModelError::EmptyResponse)
        ));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            OpenRouterService::error_message(r#"{"error":{"message":"Rate limit exceeded","code":429}}"#),
            "Rate limit exceeded"
        );
        assert_eq!(OpenRouterService::error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let service = OpenRouterService::new(
            "key".to_string(),
            "https://openrouter.ai/api/v1/".to_string(),
            "https://example.com".to_string(),
            "Test".to_string(),
        );
        assert_eq!(service.endpoint(), "https://openrouter.ai/api/v1/chat/completions");
    }
}
