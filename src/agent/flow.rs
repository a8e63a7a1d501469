// src/agent/flow.rs
//! Drives one assistant conversation: feeds user actions through the reducer,
//! performs the requests it asks for, and feeds the results back in.

use crate::agent::classifier::{classify, ClassifiedOutcome};
use crate::agent::client::{AgentError, AssistantApi};
use crate::agent::state::{reduce, ConversationEvent, DraftField, Effect, FlowPhase, SessionState};
use crate::tickets::TicketApi;
use std::collections::VecDeque;
use std::sync::Arc;

/// Notifications for whoever hosts the flow
pub trait FlowObserver: Send + Sync {
    /// A ticket now exists, or the user accepted a solution; close the flow
    fn on_ticket_created(&self);
    /// The user abandoned the flow without creating a ticket
    fn on_cancel(&self);
}

/// Result of a user action that may have talked to the assistant
#[derive(Debug, Clone, PartialEq)]
pub enum Exchange {
    /// Nothing was sent: blank input, a request already outstanding, or the flow is closed
    Skipped,
    Completed(ClassifiedOutcome),
    Failed(AgentError),
}

pub struct AgentTicketFlow {
    state: SessionState,
    assistant: Arc<dyn AssistantApi>,
    tickets: Arc<dyn TicketApi>,
    observer: Arc<dyn FlowObserver>,
}

impl AgentTicketFlow {
    pub fn new(
        assistant: Arc<dyn AssistantApi>,
        tickets: Arc<dyn TicketApi>,
        observer: Arc<dyn FlowObserver>,
    ) -> Self {
        Self {
            state: SessionState::new(),
            assistant,
            tickets,
            observer,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> FlowPhase {
        self.state.phase()
    }

    /// Send what the user typed. The text is trimmed; blank text is not sent.
    pub async fn send(&mut self, text: &str) -> Exchange {
        self.dispatch(ConversationEvent::Submit(text.to_string())).await
    }

    /// The offered solution did not help; ask the assistant to try again
    pub async fn reject_solution(&mut self) -> Exchange {
        self.dispatch(ConversationEvent::RejectSolution).await
    }

    pub async fn accept_solution(&mut self) {
        self.dispatch(ConversationEvent::AcceptSolution).await;
    }

    /// Replay the last request after a failure, same text and same session id
    pub async fn retry(&mut self) -> Exchange {
        self.dispatch(ConversationEvent::Retry).await
    }

    pub async fn edit_draft(&mut self, field: DraftField, value: impl Into<String>) {
        self.dispatch(ConversationEvent::EditDraft {
            field,
            value: value.into(),
        })
        .await;
    }

    /// Create a ticket from the current draft. Returns the phase afterwards:
    /// `Closed` on success, `DraftReady` with an error set otherwise.
    pub async fn submit_draft(&mut self) -> FlowPhase {
        self.dispatch(ConversationEvent::SubmitDraft).await;
        self.state.phase()
    }

    pub async fn cancel(&mut self) {
        self.dispatch(ConversationEvent::Cancel).await;
    }

    async fn dispatch(&mut self, event: ConversationEvent) -> Exchange {
        let mut exchange = Exchange::Skipped;
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let (next, effects) = reduce(std::mem::take(&mut self.state), event);
            self.state = next;

            for effect in effects {
                match effect {
                    Effect::SendToAgent(request) => {
                        let event = match self.assistant.respond(&request).await {
                            Ok(response) => {
                                exchange = Exchange::Completed(classify(&response));
                                ConversationEvent::ResponseReceived(response)
                            }
                            Err(e) => {
                                exchange = Exchange::Failed(e.clone());
                                ConversationEvent::ExchangeFailed(e)
                            }
                        };
                        queue.push_back(event);
                    }
                    Effect::CreateTicket(draft) => {
                        let event = match self.tickets.create_ticket(&draft).await {
                            Ok(ticket) => ConversationEvent::TicketCreated(ticket),
                            Err(e) => ConversationEvent::TicketCreationFailed(e.user_message()),
                        };
                        queue.push_back(event);
                    }
                    Effect::NotifyTicketCreated => self.observer.on_ticket_created(),
                    Effect::NotifyCancel => self.observer.on_cancel(),
                }
            }
        }

        exchange
    }
}
