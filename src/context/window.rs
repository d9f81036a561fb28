//! Message token accounting and budget trimming

use super::models::ChatMessage;
use super::tokenizer::TokenCounter;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fixed per-message token overhead approximating the protocol/JSON
/// framing the remote API charges for but the tokenizer never sees.
/// Heuristic, tunable; not a guaranteed exact count.
pub const MESSAGE_OVERHEAD_TOKENS: usize = 6;

/// Floor for the reply reserve when a misconfigured value has to be
/// clamped back under the context size.
const MIN_REPLY_RESERVE: usize = 16;

/// Token budget for one outgoing request: total context window minus the
/// tokens reserved for the model's reply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowBudget {
    max_context_tokens: usize,
    reply_reserve: usize,
}

impl WindowBudget {
    /// Build a budget, clamping `reply_reserve` to a quarter of the
    /// context (floor 16) when it does not leave room for any prompt.
    pub fn new(max_context_tokens: usize, reply_reserve: usize) -> Self {
        let reply_reserve = if reply_reserve >= max_context_tokens {
            let clamped = (max_context_tokens / 4).max(MIN_REPLY_RESERVE);
            debug!(
                "reply reserve {} >= context {}, clamping to {}",
                reply_reserve, max_context_tokens, clamped
            );
            clamped
        } else {
            reply_reserve
        };
        Self {
            max_context_tokens,
            reply_reserve,
        }
    }

    /// Token allowance for the outgoing message sequence.
    pub fn prompt_budget(&self) -> usize {
        self.max_context_tokens.saturating_sub(self.reply_reserve)
    }

    pub fn max_context_tokens(&self) -> usize {
        self.max_context_tokens
    }

    /// Tokens reserved for the reply, used as `max_tokens` on dispatch.
    pub fn reply_reserve(&self) -> usize {
        self.reply_reserve
    }
}

/// Total token cost of a message sequence: per-message overhead plus the
/// tokens of role and content, summed over the sequence. Monotonic under
/// append.
pub fn count_message_tokens(counter: &dyn TokenCounter, messages: &[ChatMessage]) -> usize {
    messages
        .iter()
        .map(|m| MESSAGE_OVERHEAD_TOKENS + counter.count(m.role.as_str()) + counter.count(&m.content))
        .sum()
}

/// Drop oldest non-pinned messages (index 1) until the sequence fits the
/// budget or only the system message and one other message remain.
/// Returns whether anything was removed. Fitting is not guaranteed: with
/// an infeasibly tight budget the survivors may still exceed it, which
/// the caller observes by re-counting.
pub fn trim_to_budget(
    counter: &dyn TokenCounter,
    messages: &mut Vec<ChatMessage>,
    budget: usize,
) -> bool {
    let mut trimmed = false;
    while count_message_tokens(counter, messages) > budget && messages.len() > 2 {
        let dropped = messages.remove(1);
        debug!(
            "trimmed oldest {} message ({} chars)",
            dropped.role.as_str(),
            dropped.content.len()
        );
        trimmed = true;
    }
    trimmed
}
