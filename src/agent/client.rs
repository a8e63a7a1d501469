// src/agent/client.rs
use crate::config::ClientConfig;
use crate::models::agent::{AgentRequest, AgentResponse};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

pub const RESPOND_PATH: &str = "/api/agents/respond/";

/// Why an assistant exchange did not produce a response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// The exchange ran past its bound; the assistant may still be working
    #[error("assistant exchange timed out")]
    Timeout,
    #[error("connection to assistant lost: {0}")]
    NetworkLost(String),
    #[error("assistant returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("assistant exchange failed: {0}")]
    Unknown(String),
}

impl AgentError {
    /// Text shown in the error banner above the input
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Timeout => {
                "The request took too long. The AI agent may be processing. Please try again in a moment."
                    .to_string()
            }
            AgentError::NetworkLost(_) => {
                "Connection to server was lost. Please check if the backend server is running and try again."
                    .to_string()
            }
            AgentError::Server { message, .. } => message.clone(),
            AgentError::Unknown(_) => {
                "Failed to communicate with the AI agent. Please check your connection and try again."
                    .to_string()
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::Timeout => "timeout",
            AgentError::NetworkLost(_) => "network_lost",
            AgentError::Server { .. } => "server_error",
            AgentError::Unknown(_) => "unknown",
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AgentError::Timeout
        } else if e.is_connect() || e.is_request() || e.is_body() {
            AgentError::NetworkLost(e.to_string())
        } else {
            AgentError::Unknown(e.to_string())
        }
    }
}

/// One request/response exchange with the assistant backend
#[async_trait]
pub trait AssistantApi: Send + Sync {
    async fn respond(&self, request: &AgentRequest) -> Result<AgentResponse, AgentError>;
}

#[derive(Debug, Clone)]
pub struct AgentClient {
    client: Client,
    endpoint: String,
}

impl AgentClient {
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.agent_timeout)
            .default_headers(config.default_headers())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint(RESPOND_PATH),
        })
    }

    async fn exchange(&self, request: &AgentRequest) -> Result<AgentResponse, AgentError> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AgentError::Server {
                status: status.as_u16(),
                message: server_error_message(status, &body),
            });
        }

        serde_json::from_str::<AgentResponse>(&body)
            .map_err(|e| AgentError::Unknown(format!("unreadable assistant response: {}", e)))
    }
}

#[async_trait]
impl AssistantApi for AgentClient {
    async fn respond(&self, request: &AgentRequest) -> Result<AgentResponse, AgentError> {
        let request_id = Uuid::new_v4().to_string();
        let start = Instant::now();

        tracing::info!(
            request_id = %request_id,
            session_id = request.session_id.as_deref().unwrap_or("-"),
            "sending message to assistant"
        );
        tracing::debug!(request_id = %request_id, "assistant payload: {:?}", request);

        let result = self.exchange(request).await;

        let duration_ms = start.elapsed().as_millis();
        match &result {
            Ok(response) => tracing::info!(
                request_id = %request_id,
                category = ?response.category,
                duration_ms = %duration_ms,
                "assistant responded"
            ),
            Err(e) => tracing::warn!(
                request_id = %request_id,
                kind = e.kind(),
                duration_ms = %duration_ms,
                "assistant exchange failed: {}",
                e
            ),
        }

        result
    }
}

/// Pull a readable message out of a failed response: the body's `error`
/// field, then `detail`, then the bare status line.
fn server_error_message(status: StatusCode, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(message_text)
    };

    field("error").or_else(|| field("detail")).unwrap_or_else(|| {
        format!(
            "Server error: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string()
    })
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};
    use serde_json::json;
    use std::time::Duration;

    async fn spawn_backend(app: Router) -> ClientConfig {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        ClientConfig::new(format!("http://{}", addr))
    }

    #[test]
    fn test_server_error_message_precedence() {
        let status = StatusCode::BAD_REQUEST;
        assert_eq!(server_error_message(status, r#"{"error":"bad input","detail":"x"}"#), "bad input");
        assert_eq!(server_error_message(status, r#"{"detail":"Not authenticated"}"#), "Not authenticated");
        assert_eq!(server_error_message(status, "<html>oops</html>"), "Server error: 400 Bad Request");
        assert_eq!(
            server_error_message(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":""}"#),
            "Server error: 500 Internal Server Error"
        );
    }

    #[test]
    fn test_each_failure_kind_has_distinct_message() {
        let messages = [
            AgentError::Timeout.user_message(),
            AgentError::NetworkLost("reset".into()).user_message(),
            AgentError::Server { status: 502, message: "Bad gateway".into() }.user_message(),
            AgentError::Unknown("?".into()).user_message(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert!(messages[0].contains("took too long"));
    }

    #[tokio::test]
    async fn test_respond_posts_description_and_session() {
        let app = Router::new().route(
            RESPOND_PATH,
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "category": "question",
                    "content": format!("echo: {}", body["description"].as_str().unwrap_or("")),
                    "session_id": body["session_id"].as_str().unwrap_or("fresh"),
                }))
            }),
        );
        let config = spawn_backend(app).await;
        let client = AgentClient::new(&config).unwrap();

        let first = client.respond(&AgentRequest::new("hello", None)).await.unwrap();
        assert_eq!(first.session_id.as_deref(), Some("fresh"));
        assert_eq!(first.content, json!("echo: hello"));

        let second = client
            .respond(&AgentRequest::new("again", Some("abc".into())))
            .await
            .unwrap();
        assert_eq!(second.session_id.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_respond_times_out() {
        let app = Router::new().route(
            RESPOND_PATH,
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "category": "solution", "content": "too late" }))
            }),
        );
        let config = spawn_backend(app)
            .await
            .with_agent_timeout(Duration::from_millis(200));
        let client = AgentClient::new(&config).unwrap();

        let err = client.respond(&AgentRequest::new("slow", None)).await.unwrap_err();
        assert_eq!(err, AgentError::Timeout);
        assert!(err.user_message().contains("took too long"));
    }

    #[tokio::test]
    async fn test_respond_surfaces_server_error_body() {
        let app = Router::new().route(
            RESPOND_PATH,
            post(|| async {
                (
                    AxumStatus::SERVICE_UNAVAILABLE,
                    Json(json!({ "detail": "Assistant is overloaded" })),
                )
            }),
        );
        let config = spawn_backend(app).await;
        let client = AgentClient::new(&config).unwrap();

        let err = client.respond(&AgentRequest::new("hi", None)).await.unwrap_err();
        assert_eq!(
            err,
            AgentError::Server { status: 503, message: "Assistant is overloaded".into() }
        );
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_unknown() {
        let app = Router::new().route(
            RESPOND_PATH,
            post(|| async { axum::response::Html("<html>Down for maintenance</html>") }),
        );
        let config = spawn_backend(app).await;
        let client = AgentClient::new(&config).unwrap();

        let err = client.respond(&AgentRequest::new("hi", None)).await.unwrap_err();
        assert!(matches!(err, AgentError::Unknown(_)), "got {:?}", err);
        assert_eq!(
            err.user_message(),
            "Failed to communicate with the AI agent. Please check your connection and try again."
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_lost() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = ClientConfig::new(format!("http://{}", addr));
        let client = AgentClient::new(&config).unwrap();
        let err = client.respond(&AgentRequest::new("hi", None)).await.unwrap_err();
        assert!(matches!(err, AgentError::NetworkLost(_)), "got {:?}", err);
    }
}
