//! OpenAI-compatible `/chat/completions` client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tomtat_core::prompts::{PromptSpec, TokenLimit};

use crate::error::LlmError;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// HTTP timeout for one completion call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Anything that can turn a rendered prompt into text.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Run one completion and return the trimmed reply.
    async fn complete(&self, prompt: &PromptSpec) -> Result<String, LlmError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Message in a chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request payload.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_prompt(prompt: &'a PromptSpec) -> Self {
        let (max_tokens, max_completion_tokens) = match prompt.limit {
            TokenLimit::MaxTokens(n) => (Some(n), None),
            TokenLimit::MaxCompletionTokens(n) => (None, Some(n)),
        };
        Self {
            model: prompt.model,
            messages: vec![
                Message::system(prompt.system.as_str()),
                Message::user(prompt.user.as_str()),
            ],
            max_tokens,
            max_completion_tokens,
            temperature: prompt.temperature,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Pull the first choice's content out of a response body.
fn first_content(response: ChatCompletionResponse) -> Result<String, LlmError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();
    if content.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(content)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for an OpenAI-compatible API.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// Create a client. `base_url` defaults to [`DEFAULT_BASE_URL`].
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(&self, prompt: &PromptSpec) -> Result<String, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::NotConfigured);
        }

        let body = ChatCompletionRequest::from_prompt(prompt);
        tracing::debug!(model = prompt.model, "Sending chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            tracing::warn!(model = prompt.model, status = status.as_u16(), "LLM API error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        first_content(parsed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tomtat_core::prompts::{self, Direction, SummaryMode};

    #[test]
    fn legacy_models_send_max_tokens_and_temperature() {
        let prompt = prompts::summarize(SummaryMode::Brief, "văn bản");
        let body = serde_json::to_value(ChatCompletionRequest::from_prompt(&prompt)).unwrap();

        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 500);
        assert!(body.get("max_completion_tokens").is_none());
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
    }

    #[test]
    fn newer_models_send_max_completion_tokens_only() {
        let prompt = prompts::translate(Direction::EnVi, "Hello");
        let body = serde_json::to_value(ChatCompletionRequest::from_prompt(&prompt)).unwrap();

        assert_eq!(body["max_completion_tokens"], 2000);
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("temperature").is_none());
        assert_eq!(body["messages"][1]["content"], "Hello");
    }

    #[test]
    fn first_content_is_trimmed() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Xin chào \n" } }]
        }))
        .unwrap();
        assert_eq!(first_content(response).unwrap(), "Xin chào");
    }

    #[test]
    fn missing_or_blank_content_is_empty_response() {
        let none: ChatCompletionResponse =
            serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert!(matches!(first_content(none), Err(LlmError::EmptyResponse)));

        let blank: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "content": "   " } }]
        }))
        .unwrap();
        assert!(matches!(first_content(blank), Err(LlmError::EmptyResponse)));

        let null: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "content": null } }]
        }))
        .unwrap();
        assert!(matches!(first_content(null), Err(LlmError::EmptyResponse)));
    }

    #[tokio::test]
    async fn missing_api_key_is_not_configured() {
        let client = OpenAiClient::new(String::new(), None);
        let prompt = prompts::keypoints("x");
        assert!(matches!(
            client.complete(&prompt).await,
            Err(LlmError::NotConfigured)
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_removed() {
        let client = OpenAiClient::new("k".into(), Some("http://llm.local/v1/".into()));
        assert_eq!(client.base_url, "http://llm.local/v1");
    }
}
