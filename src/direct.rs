// src/direct.rs
// Direct ticket creation, for users who skip the assistant.

use crate::agent::state::{DraftField, DRAFT_INCOMPLETE_TEXT};
use crate::models::ticket::{NewTicket, Ticket};
use crate::tickets::{TicketApi, TicketError};

pub const CREATED_TEXT: &str = "Ticket created successfully!";

#[derive(Debug, Clone, Default)]
pub struct TicketForm {
    fields: NewTicket,
    error: Option<String>,
    success: Option<String>,
}

impl TicketForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        match field {
            DraftField::Title => self.fields.title = value.into(),
            DraftField::Description => self.fields.description = value.into(),
        }
    }

    pub fn fields(&self) -> &NewTicket {
        &self.fields
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    /// Submit the form. Messages from the previous attempt are cleared first;
    /// on success the fields are reset.
    pub async fn submit(&mut self, api: &dyn TicketApi) -> Result<Ticket, TicketError> {
        self.error = None;
        self.success = None;

        if !self.fields.is_complete() {
            let err = TicketError::Validation(DRAFT_INCOMPLETE_TEXT.to_string());
            self.error = Some(err.user_message());
            return Err(err);
        }

        match api.create_ticket(&self.fields).await {
            Ok(ticket) => {
                self.success = Some(CREATED_TEXT.to_string());
                self.fields = NewTicket::default();
                Ok(ticket)
            }
            Err(e) => {
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}
