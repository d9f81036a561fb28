//! Chat completions client for the Azure OpenAI wire format

use crate::config::Settings;
use crate::context::models::ChatMessage;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Chat client error types
#[derive(Debug, Error)]
pub enum ChatClientError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("chat endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("completion contained no content")]
    EmptyCompletion,
}

// Wire types
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: usize,
}

/// Single-shot client for one chat deployment. Timeouts live here; retry
/// policy is the caller's decision.
pub struct ChatCompletionsClient {
    http: Client,
    url: String,
    api_key: String,
}

fn completions_url(settings: &Settings) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        settings.endpoint.trim_end_matches('/'),
        settings.deployment,
        settings.api_version
    )
}

impl ChatCompletionsClient {
    pub fn new(settings: &Settings) -> Result<Self, ChatClientError> {
        let http = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| ChatClientError::Request(e.to_string()))?;

        Ok(Self {
            http,
            url: completions_url(settings),
            api_key: settings.api_key.clone(),
        })
    }

    /// Run one completion and return the first choice's content.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: usize,
    ) -> Result<String, ChatClientError> {
        let request = ChatCompletionRequest {
            messages,
            temperature,
            max_tokens,
        };

        debug!(
            "dispatching {} messages, temperature={}, max_tokens={}",
            messages.len(),
            temperature,
            max_tokens
        );

        let response = self
            .http
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatClientError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("chat endpoint returned {}: {}", status, body);
            return Err(ChatClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatClientError::MalformedResponse(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            debug!("realized prompt tokens: {}", usage.prompt_tokens);
        }

        let content = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ChatClientError::EmptyCompletion);
        }

        Ok(content.to_string())
    }
}
