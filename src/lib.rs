//! Chat history budgeting for LLM chat completions
//!
//! Keeps a conversational message history inside a fixed token budget:
//! token accounting with a per-message overhead, oldest-first trimming
//! that pins the system message, and a summarization fallback that
//! compresses older turns through a secondary model call when trimming
//! cannot fit the budget.

pub mod client;
pub mod config;
pub mod context;
pub mod error;

pub use client::{ChatClientError, ChatCompletionsClient};
pub use config::{ConfigError, Settings};
pub use context::{
    count_message_tokens, trim_to_budget, ChatMessage, HistorySummarizer, LlmSummarizer, Role,
    TiktokenCounter, TokenCounter, TurnOrchestrator, TurnOutcome, WindowBudget, WordCounter,
    MESSAGE_OVERHEAD_TOKENS, SUMMARY_PREFIX,
};
pub use error::{ContextError, Result};
