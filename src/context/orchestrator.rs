//! Per-turn orchestration: append, trim, summarize, dispatch

use super::models::{ChatMessage, SUMMARY_PREFIX};
use super::summarizer::HistorySummarizer;
use super::tokenizer::TokenCounter;
use super::window::{count_message_tokens, trim_to_budget, WindowBudget};
use crate::client::ChatCompletionsClient;
use crate::error::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Most recent messages kept verbatim when older history is collapsed
/// into a summary.
const RECENT_TURNS_KEPT: usize = 4;

/// Result of one chat turn: the bounded conversation that was dispatched
/// (with the assistant reply appended) plus diagnostics. The caller's own
/// conversation is never mutated.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub conversation: Vec<ChatMessage>,
    pub reply: String,
    pub prompt_tokens: usize,
    pub prompt_budget: usize,
    pub trimmed: bool,
    pub summarized: bool,
    /// The dispatched prompt still exceeded the budget. Soft condition;
    /// the remote API decides whether to accept it.
    pub over_budget: bool,
}

/// Wires counter, budget, summarizer, and client together for one chat
/// turn at a time. All collaborators are injected; the only ambient
/// state is `tracing`.
pub struct TurnOrchestrator {
    counter: Arc<dyn TokenCounter>,
    budget: WindowBudget,
    summarizer: Arc<dyn HistorySummarizer>,
    client: Arc<ChatCompletionsClient>,
    temperature: f32,
}

impl TurnOrchestrator {
    pub fn new(
        counter: Arc<dyn TokenCounter>,
        budget: WindowBudget,
        summarizer: Arc<dyn HistorySummarizer>,
        client: Arc<ChatCompletionsClient>,
        temperature: f32,
    ) -> Self {
        Self {
            counter,
            budget,
            summarizer,
            client,
            temperature,
        }
    }

    /// Run one chat turn: append the user message to a working copy,
    /// fit it to the prompt budget (trim first, summarize older history
    /// if trimming is not enough), dispatch, and return the bounded
    /// conversation with the reply appended.
    pub async fn run_turn(
        &self,
        conversation: &[ChatMessage],
        user_text: &str,
    ) -> Result<TurnOutcome> {
        let mut history: Vec<ChatMessage> = conversation.to_vec();
        history.push(ChatMessage::user(user_text));

        let prompt_budget = self.budget.prompt_budget();
        let mut working = history.clone();
        let mut trimmed = trim_to_budget(&*self.counter, &mut working, prompt_budget);
        let mut summarized = false;

        if count_message_tokens(&*self.counter, &working) > prompt_budget {
            if let Some(summary) = self.summarize_older(&history).await {
                let mut rebuilt = vec![history[0].clone(), summary];
                rebuilt.extend_from_slice(&history[recent_start(history.len())..]);
                trimmed |= trim_to_budget(&*self.counter, &mut rebuilt, prompt_budget);
                working = rebuilt;
                summarized = true;
            }
        }

        let prompt_tokens = count_message_tokens(&*self.counter, &working);
        let over_budget = prompt_tokens > prompt_budget;
        info!(
            "prompt estimate {} / budget {} (trimmed={}, summarized={})",
            prompt_tokens, prompt_budget, trimmed, summarized
        );
        if over_budget {
            warn!(
                "prompt still over budget after trim and summarize: {} > {}",
                prompt_tokens, prompt_budget
            );
        }

        let reply = self
            .client
            .complete(&working, self.temperature, self.budget.reply_reserve())
            .await?;

        working.push(ChatMessage::assistant(reply.clone()));

        Ok(TurnOutcome {
            conversation: working,
            reply,
            prompt_tokens,
            prompt_budget,
            trimmed,
            summarized,
            over_budget,
        })
    }

    /// Collapse everything between the system message and the recent
    /// suffix into one marked summary message. Any failure means no
    /// summary; the caller proceeds with the trimmed sequence.
    async fn summarize_older(&self, history: &[ChatMessage]) -> Option<ChatMessage> {
        let older = &history[1..recent_start(history.len())];
        if older.is_empty() {
            return None;
        }
        match self.summarizer.summarize(older).await {
            Ok(text) => Some(ChatMessage::assistant(format!("{SUMMARY_PREFIX}{text}"))),
            Err(e) => {
                warn!("summarization failed, proceeding without it: {}", e);
                None
            }
        }
    }
}

/// Index where the always-kept recent suffix begins. Never 0: the system
/// message is accounted separately.
fn recent_start(len: usize) -> usize {
    len.saturating_sub(RECENT_TURNS_KEPT).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::summarizer::SummarizeError;
    use async_trait::async_trait;

    struct FixedSummarizer(Option<String>);

    #[async_trait]
    impl HistorySummarizer for FixedSummarizer {
        async fn summarize(&self, _older: &[ChatMessage]) -> Result<String, SummarizeError> {
            match &self.0 {
                Some(text) => Ok(text.clone()),
                None => Err(SummarizeError::NothingToSummarize),
            }
        }
    }

    fn orchestrator_with(summarizer: FixedSummarizer) -> TurnOrchestrator {
        let settings = crate::config::Settings {
            endpoint: "http://localhost:9".to_string(),
            deployment: "gpt-4o".to_string(),
            api_key: "test-key".to_string(),
            api_version: "2024-02-01".to_string(),
            embeddings_deployment: None,
            max_context_tokens: 1000,
            reply_max_tokens: 100,
            tokenizer_encoding: "cl100k_base".to_string(),
            temperature: 0.0,
            request_timeout_secs: 1,
        };
        TurnOrchestrator::new(
            Arc::new(crate::context::tokenizer::WordCounter::new(1.0)),
            WindowBudget::new(settings.max_context_tokens, settings.reply_max_tokens),
            Arc::new(summarizer),
            Arc::new(ChatCompletionsClient::new(&settings).unwrap()),
            settings.temperature,
        )
    }

    fn history_of(len: usize) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system("sys")];
        for i in 1..len {
            messages.push(ChatMessage::user(format!("turn {i}")));
        }
        messages
    }

    #[test]
    fn test_recent_start_partition() {
        assert_eq!(recent_start(1), 1);
        assert_eq!(recent_start(3), 1);
        assert_eq!(recent_start(5), 1);
        assert_eq!(recent_start(6), 2);
        assert_eq!(recent_start(10), 6);
    }

    #[tokio::test]
    async fn test_summarize_older_wraps_with_prefix() {
        let orch = orchestrator_with(FixedSummarizer(Some("- key points".to_string())));
        let summary = orch.summarize_older(&history_of(8)).await.unwrap();
        assert!(summary.is_summary());
        assert_eq!(
            summary.content,
            format!("{}- key points", SUMMARY_PREFIX)
        );
    }

    #[tokio::test]
    async fn test_summarize_older_skips_short_history() {
        // Nothing between the system message and the recent suffix.
        let orch = orchestrator_with(FixedSummarizer(Some("- key points".to_string())));
        assert!(orch.summarize_older(&history_of(5)).await.is_none());
    }

    #[tokio::test]
    async fn test_summarize_older_swallows_failure() {
        let orch = orchestrator_with(FixedSummarizer(None));
        assert!(orch.summarize_older(&history_of(8)).await.is_none());
    }
}
