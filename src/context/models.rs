//! Data models for conversation history

use serde::{Deserialize, Serialize};

/// Marker prepended to synthetic summary messages so they are
/// distinguishable from real assistant turns in the history.
pub const SUMMARY_PREFIX: &str = "(Earlier conversation summary)\n";

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single chat message. Immutable once created; an ordered `Vec` of
/// these forms the conversation, with index 0 holding the pinned system
/// instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Whether this is a synthetic summary of earlier turns.
    pub fn is_summary(&self) -> bool {
        self.role == Role::Assistant && self.content.starts_with(SUMMARY_PREFIX.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_message_constructors() {
        let msg = ChatMessage::user("hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "hello");
    }

    #[test]
    fn test_is_summary() {
        let summary = ChatMessage::assistant(format!("{}- went over plans", SUMMARY_PREFIX));
        assert!(summary.is_summary());
        assert!(!ChatMessage::assistant("a normal reply").is_summary());
        assert!(!ChatMessage::user(SUMMARY_PREFIX).is_summary());
    }

    #[test]
    fn test_message_wire_shape() {
        let msg = ChatMessage::system("You are helpful.");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "You are helpful.");
    }
}
