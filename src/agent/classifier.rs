// src/agent/classifier.rs
//! Turns a raw assistant reply into one of the outcomes the conversation
//! understands. Pure: the same payload always classifies the same way.

use crate::models::agent::{AgentResponse, ResponseCategory};
use crate::models::conversation::ConversationMessage;
use crate::models::ticket::NewTicket;
use serde_json::Value;

/// Companion text attached to every drafted ticket
pub const DRAFT_ANNOUNCEMENT: &str =
    "I couldn't resolve this after multiple attempts. I've drafted a ticket for you to review and submit.";

#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedOutcome {
    /// A proposed fix the user can accept or reject
    Solution { content: String },
    /// A clarifying question, answered through the normal input
    Question { content: String },
    /// The assistant gave up and proposed a ticket
    TicketDraft { draft: NewTicket, raw: Value },
    /// Category this client does not understand; ignored
    Unrecognized,
}

impl ClassifiedOutcome {
    /// Transcript entry for this outcome, if it produces one
    pub fn to_message(&self) -> Option<ConversationMessage> {
        match self {
            ClassifiedOutcome::Solution { content } => Some(ConversationMessage::solution(content.clone())),
            ClassifiedOutcome::Question { content } => Some(ConversationMessage::question(content.clone())),
            ClassifiedOutcome::TicketDraft { raw, .. } => {
                Some(ConversationMessage::ticket_draft(DRAFT_ANNOUNCEMENT, raw.clone()))
            }
            ClassifiedOutcome::Unrecognized => None,
        }
    }
}

pub fn classify(raw: &AgentResponse) -> ClassifiedOutcome {
    match raw.category {
        ResponseCategory::Solution => ClassifiedOutcome::Solution {
            content: display_text(&raw.content),
        },
        ResponseCategory::Question => ClassifiedOutcome::Question {
            content: display_text(&raw.content),
        },
        ResponseCategory::TicketDraft => ClassifiedOutcome::TicketDraft {
            draft: decode_draft(&raw.content),
            raw: raw.content.clone(),
        },
        ResponseCategory::Unknown => ClassifiedOutcome::Unrecognized,
    }
}

/// Draft content arrives as an object or as a string holding encoded JSON.
/// A string that does not decode becomes the description with an empty title.
pub fn decode_draft(content: &Value) -> NewTicket {
    match content {
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(decoded) => draft_fields(&decoded),
            Err(e) => {
                tracing::warn!("Ticket draft content is not valid JSON, using it as description: {}", e);
                NewTicket::new("", encoded.clone())
            }
        },
        other => draft_fields(other),
    }
}

fn draft_fields(value: &Value) -> NewTicket {
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    NewTicket::new(field("title"), field("description"))
}

fn display_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::conversation::{MessageRole, MessageType};
    use serde_json::json;

    fn response(category: ResponseCategory, content: Value) -> AgentResponse {
        AgentResponse {
            category,
            content,
            session_id: Some("abc".into()),
        }
    }

    #[test]
    fn test_solution_and_question_keep_content() {
        let outcome = classify(&response(ResponseCategory::Solution, json!("Restart the router")));
        assert_eq!(outcome, ClassifiedOutcome::Solution { content: "Restart the router".into() });

        let outcome = classify(&response(ResponseCategory::Question, json!("Which router model?")));
        let message = outcome.to_message().unwrap();
        assert_eq!(message.role, MessageRole::Assistant);
        assert_eq!(message.message_type, MessageType::Question);
        assert_eq!(message.content, "Which router model?");
    }

    #[test]
    fn test_draft_from_encoded_string() {
        let raw = response(
            ResponseCategory::TicketDraft,
            json!(r#"{"title":"T","description":"D"}"#),
        );
        match classify(&raw) {
            ClassifiedOutcome::TicketDraft { draft, .. } => {
                assert_eq!(draft, NewTicket::new("T", "D"));
            }
            other => panic!("expected draft, got {:?}", other),
        }
    }

    #[test]
    fn test_draft_degrades_on_malformed_string() {
        let raw = response(ResponseCategory::TicketDraft, json!("not json"));
        match classify(&raw) {
            ClassifiedOutcome::TicketDraft { draft, raw } => {
                assert_eq!(draft, NewTicket::new("", "not json"));
                assert_eq!(raw, json!("not json"));
            }
            other => panic!("expected draft, got {:?}", other),
        }
    }

    #[test]
    fn test_draft_from_object_with_missing_field() {
        let raw = response(ResponseCategory::TicketDraft, json!({ "title": "Email bouncing" }));
        let outcome = classify(&raw);
        let message = outcome.to_message().unwrap();
        assert_eq!(message.content, DRAFT_ANNOUNCEMENT);
        assert_eq!(message.draft, Some(json!({ "title": "Email bouncing" })));
        match outcome {
            ClassifiedOutcome::TicketDraft { draft, .. } => {
                assert_eq!(draft, NewTicket::new("Email bouncing", ""));
            }
            other => panic!("expected draft, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_category_produces_nothing() {
        let outcome = classify(&response(ResponseCategory::Unknown, json!("whatever")));
        assert_eq!(outcome, ClassifiedOutcome::Unrecognized);
        assert!(outcome.to_message().is_none());
    }

    #[test]
    fn test_classification_is_repeatable() {
        let payloads = [
            response(ResponseCategory::Solution, json!("a")),
            response(ResponseCategory::TicketDraft, json!("{broken")),
            response(ResponseCategory::TicketDraft, json!({ "title": "x", "description": "y" })),
        ];
        for payload in &payloads {
            assert_eq!(classify(payload), classify(payload));
        }
    }
}
