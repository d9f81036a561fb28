//! Error taxonomy for the context window core
//!
//! Summarization failure is deliberately absent here: it is recovered
//! inside the orchestrator and never reaches the caller. Budget
//! infeasibility is not an error at all; it is reported as a flag on the
//! turn outcome and the remote API stays the final arbiter.

use crate::client::ChatClientError;
use crate::config::ConfigError;
use thiserror::Error;

pub type Result<T, E = ContextError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ContextError {
    /// Fatal pre-flight problem: missing/invalid settings or an unknown
    /// tokenizer encoding.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The main completion call failed; the turn ends without a reply.
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] ChatClientError),
}
