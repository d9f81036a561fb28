//! Token counting using tiktoken

use crate::config::ConfigError;
use std::sync::Arc;
use tiktoken_rs::{cl100k_base, o200k_base, p50k_base, p50k_edit, r50k_base, CoreBPE};

/// Token counter trait for different counting strategies
pub trait TokenCounter: Send + Sync {
    /// Count the tokens in the given text. Non-negative, deterministic,
    /// and defined for arbitrary Unicode input; empty text counts as 0.
    fn count(&self, text: &str) -> usize;
}

/// Tiktoken-based counter bound to a named encoding, resolved once at
/// startup. An unrecognized encoding name is a configuration error, not
/// a per-call failure.
pub struct TiktokenCounter {
    bpe: Arc<CoreBPE>,
}

impl std::fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokenCounter").finish_non_exhaustive()
    }
}

impl TiktokenCounter {
    /// Resolve an encoding by name (`cl100k_base`, `o200k_base`,
    /// `p50k_base`, `p50k_edit`, `r50k_base`).
    pub fn for_encoding(name: &str) -> Result<Self, ConfigError> {
        let bpe = match name {
            "cl100k_base" => cl100k_base(),
            "o200k_base" => o200k_base(),
            "p50k_base" => p50k_base(),
            "p50k_edit" => p50k_edit(),
            "r50k_base" => r50k_base(),
            other => return Err(ConfigError::UnknownEncoding(other.to_string())),
        }
        .map_err(|e| ConfigError::Tokenizer(e.to_string()))?;

        Ok(Self { bpe: Arc::new(bpe) })
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// Word-based counter (~1.3 tokens per word). Dependency-light fallback
/// when no BPE encoding is wanted, and a cheap deterministic counter for
/// tests.
pub struct WordCounter {
    tokens_per_word: f64,
}

impl WordCounter {
    pub fn new(tokens_per_word: f64) -> Self {
        Self { tokens_per_word }
    }
}

impl Default for WordCounter {
    fn default() -> Self {
        Self::new(1.3)
    }
}

impl TokenCounter for WordCounter {
    fn count(&self, text: &str) -> usize {
        let words = text.split_whitespace().count();
        (words as f64 * self.tokens_per_word).ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiktoken_counter() {
        let counter = TiktokenCounter::for_encoding("cl100k_base").unwrap();
        let tokens = counter.count("Hello, world! This is a test.");
        assert!(tokens > 0);
        assert!(tokens < 20);
    }

    #[test]
    fn test_empty_text_counts_zero() {
        let counter = TiktokenCounter::for_encoding("cl100k_base").unwrap();
        assert_eq!(counter.count(""), 0);
    }

    #[test]
    fn test_count_is_deterministic() {
        let counter = TiktokenCounter::for_encoding("cl100k_base").unwrap();
        let text = "Ordnung muss sein: déjà vu, 東京, 🚀";
        assert_eq!(counter.count(text), counter.count(text));
    }

    #[test]
    fn test_unknown_encoding_is_config_error() {
        let err = TiktokenCounter::for_encoding("base64").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEncoding(_)));
    }

    #[test]
    fn test_word_counter() {
        let counter = WordCounter::default();
        assert_eq!(counter.count("Hello world test"), 4); // 3 * 1.3 -> 4
        assert_eq!(counter.count(""), 0);
    }
}
