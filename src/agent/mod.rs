// src/agent/mod.rs
pub mod classifier;
pub mod client;
pub mod flow;
pub mod state;

pub use classifier::{classify, ClassifiedOutcome};
pub use client::{AgentClient, AgentError, AssistantApi};
pub use flow::{AgentTicketFlow, Exchange, FlowObserver};
pub use state::{reduce, CloseReason, ConversationEvent, DraftField, Effect, FlowPhase, SessionState};
