//! Summarization fallback for over-budget history

use super::models::ChatMessage;
use crate::client::{ChatClientError, ChatCompletionsClient};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Separator between turns in the transcript handed to the summary model.
const TURN_SEPARATOR: &str = "\n\n---\n\n";

/// Reply cap for the summary completion.
const SUMMARY_MAX_TOKENS: usize = 400;

const SUMMARY_INSTRUCTION: &str = "You summarize conversation history. Produce concise, \
factual bullet points that preserve every instruction, decision, name, and number. \
Do not add commentary.";

/// Summarizer errors. All of these are recovered by the orchestrator;
/// none aborts a turn.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("nothing to summarize")]
    NothingToSummarize,

    #[error(transparent)]
    Client(#[from] ChatClientError),
}

/// Strategy trait for compressing older history into one summary string.
#[async_trait]
pub trait HistorySummarizer: Send + Sync {
    async fn summarize(&self, older: &[ChatMessage]) -> Result<String, SummarizeError>;
}

/// Summarizer backed by a secondary model call through the shared chat
/// client, at temperature 0 with a bounded reply.
pub struct LlmSummarizer {
    client: Arc<ChatCompletionsClient>,
}

impl LlmSummarizer {
    pub fn new(client: Arc<ChatCompletionsClient>) -> Self {
        Self { client }
    }

    fn build_transcript(older: &[ChatMessage]) -> String {
        older
            .iter()
            .map(|m| format!("{}: {}", m.role.as_str().to_uppercase(), m.content))
            .collect::<Vec<_>>()
            .join(TURN_SEPARATOR)
    }
}

#[async_trait]
impl HistorySummarizer for LlmSummarizer {
    async fn summarize(&self, older: &[ChatMessage]) -> Result<String, SummarizeError> {
        if older.is_empty() {
            return Err(SummarizeError::NothingToSummarize);
        }

        debug!("summarizing {} older messages", older.len());

        let request = vec![
            ChatMessage::system(SUMMARY_INSTRUCTION),
            ChatMessage::user(Self::build_transcript(older)),
        ];

        let summary = self
            .client
            .complete(&request, 0.0, SUMMARY_MAX_TOKENS)
            .await?;

        Ok(summary)
    }
}
