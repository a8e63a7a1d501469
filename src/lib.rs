// lib.rs - Support desk client: assistant conversation flow and ticket boundary
pub mod agent;
pub mod config;
pub mod direct;
pub mod logging;
pub mod models;
pub mod tickets;

pub use agent::{AgentClient, AgentTicketFlow, FlowObserver, FlowPhase, SessionState};
pub use config::ClientConfig;
pub use tickets::{TicketApi, TicketClient, TicketError};
