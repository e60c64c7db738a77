//! LLM completion collaborator.
//!
//! The chat session talks to the assistant through [`CompletionClient`] so
//! tests can substitute a scripted fake; the production implementation is an
//! OpenAI-compatible HTTP client (the demo deploys against Groq).

use async_trait::async_trait;

use crate::api::{ApiMessage, ChatRequest, ChatResponse};
use crate::utils::url::construct_api_url;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Api(String),
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Text-only completion over an ordered transcript. An empty reply means
    /// the provider returned no content; callers supply their own fallback.
    async fn complete_text(&self, messages: Vec<ApiMessage>) -> Result<String, CompletionError>;

    /// Vision completion: one user turn mixing an instruction with an image.
    async fn complete_vision(
        &self,
        prompt: String,
        image_url: String,
    ) -> Result<String, CompletionError>;
}

pub struct OpenAiCompatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    text_model: String,
    vision_model: String,
    max_tokens: u32,
}

impl OpenAiCompatClient {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        text_model: String,
        vision_model: String,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            text_model,
            vision_model,
            max_tokens,
        }
    }

    async fn complete(
        &self,
        model: &str,
        messages: Vec<ApiMessage>,
    ) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            max_tokens: self.max_tokens,
        };

        let url = construct_api_url(&self.base_url, "chat/completions");
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(CompletionError::Api(format_api_error(&body)));
        }

        let parsed = response.json::<ChatResponse>().await?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn complete_text(&self, messages: Vec<ApiMessage>) -> Result<String, CompletionError> {
        self.complete(&self.text_model, messages).await
    }

    async fn complete_vision(
        &self,
        prompt: String,
        image_url: String,
    ) -> Result<String, CompletionError> {
        let messages = vec![ApiMessage::vision_user(prompt, image_url)];
        self.complete(&self.vision_model, messages).await
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                serde_json::Value::Object(map) => map
                    .get("message")
                    .and_then(|message| message.as_str().map(str::to_owned)),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.trim().to_string()
    })
}

/// Shape an API error body into a log-friendly message, surfacing the
/// provider's summary line when one is present.
pub fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "API Error: <empty>".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json_value) {
            if !summary.is_empty() {
                return format!("API Error: {summary}");
            }
        }
        return format!("API Error: {trimmed}");
    }

    format!("API Error: {trimmed}")
}
