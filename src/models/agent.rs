// src/models/agent.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a POST to the assistant endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl AgentRequest {
    pub fn new(description: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            description: description.into(),
            session_id,
        }
    }
}

/// Category the backend assigned to its reply.
///
/// Values this client does not know about land in `Unknown` so newer backends
/// can add categories without breaking older clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCategory {
    Solution,
    Question,
    TicketDraft,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Raw assistant reply. `content` is a string for solutions and questions,
/// and either an object or a JSON-encoded string for ticket drafts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    #[serde(default)]
    pub category: ResponseCategory,
    #[serde(default)]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}
