//! OpenAI-compatible chat completion backend.
//!
//! Used for plain block translation and, in dual mode, for merging the
//! rule-based and LLM candidates into one block.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::{Result, SubtradError};
use super::prompts::PromptBuilder;
use super::{Reconciler, TranslationBackend};

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn system(content: String) -> Self {
        Self { role: "system".to_string(), content }
    }

    fn user(content: String) -> Self {
        Self { role: "user".to_string(), content }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct ChatCompletionBackend {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    prompts: PromptBuilder,
}

impl ChatCompletionBackend {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| SubtradError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.resolved_base_url(),
            model: config.model_name().to_string(),
            temperature: config.temperature,
            prompts: PromptBuilder::new(config),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one chat completion and return the first choice's text
    async fn complete(&self, system: String, user: String) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: self.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!("Sending chat completion request to: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SubtradError::Translation(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SubtradError::Translation(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(SubtradError::Translation(format!(
                "API error {} with model {}: {}",
                status, self.model, message
            )));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| SubtradError::Translation(format!("Failed to parse response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| SubtradError::Translation("No completion choices returned".to_string()))?;

        debug!("Chat completion returned {} bytes", content.len());
        Ok(content)
    }
}

#[async_trait]
impl TranslationBackend for ChatCompletionBackend {
    fn name(&self) -> &str {
        "chat"
    }

    async fn translate(&self, block_text: &str, _source_language: &str) -> Result<String> {
        self.complete(
            self.prompts.translation_system(),
            self.prompts.translation_user(block_text),
        )
        .await
    }
}

#[async_trait]
impl Reconciler for ChatCompletionBackend {
    async fn reconcile(&self, first: &str, second: &str) -> Result<String> {
        self.complete(
            self.prompts.reconcile_system(),
            self.prompts.reconcile_user(first, second),
        )
        .await
    }
}
