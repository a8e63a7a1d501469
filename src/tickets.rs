// src/tickets.rs
use crate::config::ClientConfig;
use crate::models::ticket::{Comment, Listing, NewComment, NewTicket, StatusUpdate, Ticket, TicketStatus};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub const TICKETS_PATH: &str = "/api/tickets/";
pub const COMMENTS_PATH: &str = "/api/comments/";
pub const CREATE_FAILED_TEXT: &str = "Failed to create ticket. Please try again.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    #[error("{0}")]
    Validation(String),
    #[error("ticket API returned {status}: {message:?}")]
    Api { status: u16, message: Option<String> },
    #[error("ticket request failed: {0}")]
    Transport(String),
}

impl TicketError {
    /// The backend's own `error` text when it sent one, otherwise the generic fallback
    pub fn user_message(&self) -> String {
        match self {
            TicketError::Validation(message) => message.clone(),
            TicketError::Api { message: Some(message), .. } => message.clone(),
            TicketError::Api { message: None, .. } | TicketError::Transport(_) => CREATE_FAILED_TEXT.to_string(),
        }
    }
}

impl From<reqwest::Error> for TicketError {
    fn from(e: reqwest::Error) -> Self {
        TicketError::Transport(e.to_string())
    }
}

/// Ticket creation boundary used by the draft submitter and the direct form
#[async_trait]
pub trait TicketApi: Send + Sync {
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket, TicketError>;
}

#[derive(Debug, Clone)]
pub struct TicketClient {
    client: Client,
    config: ClientConfig,
}

impl TicketClient {
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.ticket_timeout)
            .default_headers(config.default_headers())
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Tickets visible to the current user, newest first as the backend orders them
    pub async fn list_tickets(&self) -> Result<Vec<Ticket>, TicketError> {
        let response = self.client.get(self.config.endpoint(TICKETS_PATH)).send().await?;
        let listing: Listing<Ticket> = read_json(response).await?;
        Ok(listing.into_items())
    }

    /// Staff-only on the backend; others get the backend's 403 message back
    pub async fn update_status(&self, ticket_id: i64, status: TicketStatus) -> Result<Ticket, TicketError> {
        let url = self
            .config
            .endpoint(&format!("{}{}/update_status/", TICKETS_PATH, ticket_id));
        let response = self.client.patch(url).json(&StatusUpdate { status }).send().await?;
        read_json(response).await
    }

    pub async fn list_comments(&self, ticket_id: i64) -> Result<Vec<Comment>, TicketError> {
        let response = self
            .client
            .get(self.config.endpoint(COMMENTS_PATH))
            .query(&[("ticket", ticket_id)])
            .send()
            .await?;
        let listing: Listing<Comment> = read_json(response).await?;
        Ok(listing.into_items())
    }

    pub async fn post_comment(&self, ticket_id: i64, content: &str) -> Result<Comment, TicketError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(TicketError::Validation("Comment cannot be empty".to_string()));
        }
        let body = NewComment {
            ticket: ticket_id,
            content: content.to_string(),
        };
        let response = self
            .client
            .post(self.config.endpoint(COMMENTS_PATH))
            .json(&body)
            .send()
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl TicketApi for TicketClient {
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket, TicketError> {
        tracing::info!(title = %ticket.title, "creating ticket");
        let response = self
            .client
            .post(self.config.endpoint(TICKETS_PATH))
            .json(ticket)
            .send()
            .await?;

        let body = match read_body(response).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Ticket creation failed: {}", e);
                return Err(e);
            }
        };

        // Any 2xx is a created ticket, whatever the body looks like.
        let created = serde_json::from_str::<Ticket>(&body).unwrap_or_else(|e| {
            tracing::warn!("Created ticket has an unexpected shape, keeping what is readable: {}", e);
            salvage_ticket(&body, ticket)
        });
        tracing::info!(ticket_id = created.id, "ticket created");
        Ok(created)
    }
}

/// Best-effort ticket from a create response that did not match `Ticket`,
/// falling back to the submitted fields.
fn salvage_ticket(body: &str, submitted: &NewTicket) -> Ticket {
    let value: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let text = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);

    Ticket {
        id: value.get("id").and_then(Value::as_i64).unwrap_or_default(),
        title: text("title").unwrap_or_else(|| submitted.title.clone()),
        description: text("description").unwrap_or_else(|| submitted.description.clone()),
        status: value
            .get("status")
            .and_then(|s| serde_json::from_value(s.clone()).ok())
            .unwrap_or_default(),
        created_at: None,
        updated_at: None,
        assignee: value.get("assignee").and_then(Value::as_i64),
        assignee_name: text("assignee_name"),
        assignee_username: text("assignee_username"),
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, TicketError> {
    let body = read_body(response).await?;
    serde_json::from_str(&body).map_err(|e| TicketError::Transport(format!("unreadable ticket response: {}", e)))
}

/// Body of a successful response, or the API error it carried
async fn read_body(response: Response) -> Result<String, TicketError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::debug!("Ticket API error body ({}): {}", status, body);
        // Only the `error` field is shown to users; DRF field errors stay generic.
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .filter(|m| !m.trim().is_empty());
        return Err(TicketError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(body)
}
