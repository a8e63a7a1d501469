// src/models/conversation.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Transcript entry shown when an assistant exchange fails.
pub const EXCHANGE_ERROR_TEXT: &str = "Sorry, I encountered an error. Please try again.";

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }
}

/// What kind of entry it is. Only meaningful for assistant and system roles;
/// user entries always carry `Message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Message,
    Solution,
    Question,
    TicketDraft,
    Error,
}

/// One entry in the conversation transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub content: String,
    /// Raw draft payload as received, only set on `TicketDraft` entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<Value>,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            message_type: MessageType::Message,
            content: content.into(),
            draft: None,
        }
    }

    pub fn solution(content: impl Into<String>) -> Self {
        Self::assistant(MessageType::Solution, content)
    }

    pub fn question(content: impl Into<String>) -> Self {
        Self::assistant(MessageType::Question, content)
    }

    pub fn ticket_draft(content: impl Into<String>, draft: Value) -> Self {
        Self {
            role: MessageRole::Assistant,
            message_type: MessageType::TicketDraft,
            content: content.into(),
            draft: Some(draft),
        }
    }

    pub fn exchange_error() -> Self {
        Self {
            role: MessageRole::System,
            message_type: MessageType::Error,
            content: EXCHANGE_ERROR_TEXT.to_string(),
            draft: None,
        }
    }

    fn assistant(message_type: MessageType, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            message_type,
            content: content.into(),
            draft: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}
