// src/config.rs
use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_AGENT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TICKET_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { name: &'static str, value: String },
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Connection settings for the support backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Upper bound on a single assistant exchange
    pub agent_timeout: Duration,
    pub ticket_timeout: Duration,
    /// Value of the backend's `sessionid` cookie for an authenticated user
    pub session_cookie: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent_timeout: Duration::from_secs(DEFAULT_AGENT_TIMEOUT_SECS),
            ticket_timeout: Duration::from_secs(DEFAULT_TICKET_TIMEOUT_SECS),
            session_cookie: None,
        }
    }

    /// Reads `SUPPORT_API_URL`, `AGENT_TIMEOUT_SECS`, `TICKET_TIMEOUT_SECS` and
    /// `SUPPORT_SESSION_COOKIE`. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("SUPPORT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        if base_url.trim().is_empty() {
            return Err(ConfigError::Empty("SUPPORT_API_URL"));
        }

        let agent_secs = read_seconds("AGENT_TIMEOUT_SECS", DEFAULT_AGENT_TIMEOUT_SECS)?;
        let ticket_secs = read_seconds("TICKET_TIMEOUT_SECS", DEFAULT_TICKET_TIMEOUT_SECS)?;
        let session_cookie = env::var("SUPPORT_SESSION_COOKIE")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Ok(Self::new(base_url)
            .with_agent_timeout(Duration::from_secs(agent_secs))
            .with_ticket_timeout(Duration::from_secs(ticket_secs))
            .with_session_cookie(session_cookie))
    }

    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    pub fn with_ticket_timeout(mut self, timeout: Duration) -> Self {
        self.ticket_timeout = timeout;
        self
    }

    pub fn with_session_cookie(mut self, cookie: Option<String>) -> Self {
        self.session_cookie = cookie;
        self
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Default headers carrying the session cookie, if one is configured
    pub fn default_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(ref cookie) = self.session_cookie {
            match reqwest::header::HeaderValue::from_str(&format!("sessionid={}", cookie)) {
                Ok(value) => {
                    headers.insert(reqwest::header::COOKIE, value);
                }
                Err(e) => tracing::warn!("Ignoring unusable session cookie: {}", e),
            }
        }
        headers
    }
}

fn read_seconds(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidSeconds { name, value }),
        Err(_) => Ok(default),
    }
}
