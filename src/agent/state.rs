// src/agent/state.rs
// Conversation state machine for the assistant ticket flow.
// Idle → Sending → {SolutionOffered, QuestionAsked, DraftReady, Failed} → Idle | Sending | Closed

use crate::agent::classifier::{classify, ClassifiedOutcome};
use crate::agent::client::AgentError;
use crate::models::agent::{AgentRequest, AgentResponse};
use crate::models::conversation::ConversationMessage;
use crate::models::ticket::{NewTicket, Ticket};
use serde::{Deserialize, Serialize};

/// Sent on the user's behalf when a proposed solution did not help
pub const REJECTION_TEXT: &str = "The previous solution did not work. Please try again.";
pub const DRAFT_INCOMPLETE_TEXT: &str = "Please fill in both title and description";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// User accepted a solution; no ticket needed
    Resolved,
    TicketCreated,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "reason", rename_all = "snake_case")]
pub enum FlowPhase {
    Idle,
    Sending,
    SolutionOffered,
    QuestionAsked,
    DraftReady,
    Failed,
    Closed(CloseReason),
}

impl FlowPhase {
    pub fn is_closed(&self) -> bool {
        matches!(self, FlowPhase::Closed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Description,
}

/// Everything that can happen to a conversation: user actions and the
/// results of the requests those actions started.
#[derive(Debug, Clone)]
pub enum ConversationEvent {
    Submit(String),
    AcceptSolution,
    RejectSolution,
    Retry,
    ResponseReceived(AgentResponse),
    ExchangeFailed(AgentError),
    EditDraft { field: DraftField, value: String },
    SubmitDraft,
    TicketCreated(Ticket),
    TicketCreationFailed(String),
    Cancel,
}

/// Work the host must carry out after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SendToAgent(AgentRequest),
    CreateTicket(NewTicket),
    /// A ticket now exists or the issue is resolved; close the flow
    NotifyTicketCreated,
    NotifyCancel,
}

/// Per-conversation state. Lives only as long as the flow is open.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    session_id: Option<String>,
    transcript: Vec<ConversationMessage>,
    ticket_draft: Option<NewTicket>,
    last_request: Option<AgentRequest>,
    pending: bool,
    error: Option<String>,
    last_failure: Option<AgentError>,
    created_ticket: Option<Ticket>,
    phase: FlowPhase,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            session_id: None,
            transcript: Vec::new(),
            ticket_draft: None,
            last_request: None,
            pending: false,
            error: None,
            last_failure: None,
            created_ticket: None,
            phase: FlowPhase::Idle,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn transcript(&self) -> &[ConversationMessage] {
        &self.transcript
    }

    pub fn ticket_draft(&self) -> Option<&NewTicket> {
        self.ticket_draft.as_ref()
    }

    pub fn last_request(&self) -> Option<&AgentRequest> {
        self.last_request.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_failure(&self) -> Option<&AgentError> {
        self.last_failure.as_ref()
    }

    pub fn created_ticket(&self) -> Option<&Ticket> {
        self.created_ticket.as_ref()
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    /// Input is accepted when nothing is outstanding and the flow is still open
    pub fn input_enabled(&self) -> bool {
        !self.pending && !self.phase.is_closed()
    }

    pub fn can_retry(&self) -> bool {
        !self.pending && self.phase == FlowPhase::Failed && self.last_request.is_some()
    }

    pub fn can_submit_draft(&self) -> bool {
        !self.pending
            && !self.phase.is_closed()
            && self.ticket_draft.as_ref().map(NewTicket::is_complete).unwrap_or(false)
    }

    /// Pending on a ticket submission rather than on the assistant
    fn submitting_ticket(&self) -> bool {
        self.pending && self.phase != FlowPhase::Sending
    }

    fn begin_exchange(&mut self, request: AgentRequest) -> Vec<Effect> {
        self.error = None;
        self.last_request = Some(request.clone());
        self.transcript.push(ConversationMessage::user(request.description.clone()));
        self.pending = true;
        self.phase = FlowPhase::Sending;
        vec![Effect::SendToAgent(request)]
    }
}

/// Apply one event. Pure: the returned state and effects depend only on the inputs.
pub fn reduce(mut state: SessionState, event: ConversationEvent) -> (SessionState, Vec<Effect>) {
    // Anything arriving after the flow closed, including late responses, is dropped.
    if state.phase.is_closed() {
        tracing::debug!("Ignoring {:?} on a closed conversation", event_name(&event));
        return (state, Vec::new());
    }

    let effects = match event {
        ConversationEvent::Submit(text) => {
            let text = text.trim();
            if text.is_empty() || state.pending {
                Vec::new()
            } else {
                let request = AgentRequest::new(text, state.session_id.clone());
                state.begin_exchange(request)
            }
        }
        ConversationEvent::RejectSolution => {
            if state.pending || state.phase != FlowPhase::SolutionOffered {
                Vec::new()
            } else {
                let request = AgentRequest::new(REJECTION_TEXT, state.session_id.clone());
                state.begin_exchange(request)
            }
        }
        ConversationEvent::AcceptSolution => {
            if state.pending || state.phase != FlowPhase::SolutionOffered {
                Vec::new()
            } else {
                state.phase = FlowPhase::Closed(CloseReason::Resolved);
                vec![Effect::NotifyTicketCreated]
            }
        }
        ConversationEvent::Retry => match state.last_request.clone() {
            Some(request) if state.can_retry() => state.begin_exchange(request),
            _ => Vec::new(),
        },
        ConversationEvent::ResponseReceived(response) => {
            if state.phase != FlowPhase::Sending {
                tracing::debug!("Dropping assistant response with no exchange outstanding");
                return (state, Vec::new());
            }
            state.pending = false;
            if let Some(id) = response.session_id.clone() {
                state.session_id = Some(id);
            }

            let outcome = classify(&response);
            if let Some(message) = outcome.to_message() {
                state.transcript.push(message);
            }
            state.phase = match outcome {
                ClassifiedOutcome::Solution { .. } => FlowPhase::SolutionOffered,
                ClassifiedOutcome::Question { .. } => FlowPhase::QuestionAsked,
                ClassifiedOutcome::TicketDraft { draft, .. } => {
                    state.ticket_draft = Some(draft);
                    FlowPhase::DraftReady
                }
                ClassifiedOutcome::Unrecognized => {
                    tracing::warn!("Assistant replied with an unrecognized category, ignoring it");
                    FlowPhase::Idle
                }
            };
            Vec::new()
        }
        ConversationEvent::ExchangeFailed(failure) => {
            if state.phase != FlowPhase::Sending {
                return (state, Vec::new());
            }
            state.pending = false;
            state.transcript.push(ConversationMessage::exchange_error());
            state.error = Some(failure.user_message());
            state.last_failure = Some(failure);
            state.phase = FlowPhase::Failed;
            Vec::new()
        }
        ConversationEvent::EditDraft { field, value } => {
            if !state.pending {
                if let Some(draft) = state.ticket_draft.as_mut() {
                    match field {
                        DraftField::Title => draft.title = value,
                        DraftField::Description => draft.description = value,
                    }
                }
            }
            Vec::new()
        }
        ConversationEvent::SubmitDraft => match state.ticket_draft.clone() {
            Some(draft) if !state.pending => {
                state.phase = FlowPhase::DraftReady;
                if draft.is_complete() {
                    state.error = None;
                    state.pending = true;
                    vec![Effect::CreateTicket(draft)]
                } else {
                    state.error = Some(DRAFT_INCOMPLETE_TEXT.to_string());
                    Vec::new()
                }
            }
            _ => Vec::new(),
        },
        ConversationEvent::TicketCreated(ticket) => {
            if !state.submitting_ticket() {
                return (state, Vec::new());
            }
            state.pending = false;
            state.created_ticket = Some(ticket);
            state.phase = FlowPhase::Closed(CloseReason::TicketCreated);
            vec![Effect::NotifyTicketCreated]
        }
        ConversationEvent::TicketCreationFailed(message) => {
            if !state.submitting_ticket() {
                return (state, Vec::new());
            }
            state.pending = false;
            state.error = Some(message);
            state.phase = FlowPhase::DraftReady;
            Vec::new()
        }
        ConversationEvent::Cancel => {
            state.pending = false;
            state.phase = FlowPhase::Closed(CloseReason::Cancelled);
            vec![Effect::NotifyCancel]
        }
    };

    (state, effects)
}

fn event_name(event: &ConversationEvent) -> &'static str {
    match event {
        ConversationEvent::Submit(_) => "submit",
        ConversationEvent::AcceptSolution => "accept_solution",
        ConversationEvent::RejectSolution => "reject_solution",
        ConversationEvent::Retry => "retry",
        ConversationEvent::ResponseReceived(_) => "response_received",
        ConversationEvent::ExchangeFailed(_) => "exchange_failed",
        ConversationEvent::EditDraft { .. } => "edit_draft",
        ConversationEvent::SubmitDraft => "submit_draft",
        ConversationEvent::TicketCreated(_) => "ticket_created",
        ConversationEvent::TicketCreationFailed(_) => "ticket_creation_failed",
        ConversationEvent::Cancel => "cancel",
    }
}
