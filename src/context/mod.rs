//! Conversation context management with token budget enforcement
//!
//! Counting is delegated to a tiktoken encoding resolved at startup; a
//! turn is fitted to the prompt budget by trimming oldest messages first
//! and collapsing older history into a single summary message when
//! trimming alone is not enough.

pub mod models;
pub mod orchestrator;
pub mod summarizer;
pub mod tokenizer;
pub mod window;

pub use models::{ChatMessage, Role, SUMMARY_PREFIX};
pub use orchestrator::{TurnOrchestrator, TurnOutcome};
pub use summarizer::{HistorySummarizer, LlmSummarizer, SummarizeError};
pub use tokenizer::{TiktokenCounter, TokenCounter, WordCounter};
pub use window::{count_message_tokens, trim_to_budget, WindowBudget, MESSAGE_OVERHEAD_TOKENS};
