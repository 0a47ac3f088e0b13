//! Outbound Mail Relay Client
//!
//! Thin HTTP client for the transactional mail relay. The relay accepts a
//! JSON message and handles actual SMTP delivery out-of-band; this client
//! only needs to hand the message over within a bounded time.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Default time budget for a relay call. Dispatch must never hang an
/// inbound HTTP request.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Mail relay configuration
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Relay endpoint (e.g., https://relay.internal/v1/messages)
    pub endpoint: String,
    /// Optional bearer token for the relay
    pub api_token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl MailerConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_token: None,
            timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}

/// A plain-text message handed to the relay
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Mail relay errors
#[derive(Debug, Error)]
pub enum MailerError {
    /// The relay did not answer within the time budget
    #[error("Mail relay timed out")]
    Timeout,

    /// Connection-level failure
    #[error("Mail relay transport error: {0}")]
    Transport(String),

    /// The relay answered with a non-success status
    #[error("Mail relay rejected the message (status {0})")]
    Rejected(u16),

    /// Client construction failed
    #[error("Mail client configuration error: {0}")]
    Config(String),
}

/// HTTP client for the mail relay
#[derive(Debug, Clone)]
pub struct MailerClient {
    http: reqwest::Client,
    config: MailerConfig,
}

impl MailerClient {
    pub fn new(config: MailerConfig) -> Result<Self, MailerError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MailerError::Config(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Hand a message to the relay
    pub async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        let mut request = self.http.post(&self.config.endpoint).json(message);

        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MailerError::Timeout
            } else {
                MailerError::Transport(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(MailerError::Rejected(response.status().as_u16()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_shape() {
        let message = EmailMessage {
            from: "noreply@learn.example".to_string(),
            to: "alice@gmail.com".to_string(),
            subject: "Your Verification Code".to_string(),
            text: "Your code is 012345".to_string(),
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["from"], "noreply@learn.example");
        assert_eq!(json["to"], "alice@gmail.com");
        assert_eq!(json["subject"], "Your Verification Code");
        assert_eq!(json["text"], "Your code is 012345");
    }

    #[test]
    fn test_config_defaults() {
        let config = MailerConfig::new("https://relay.internal/v1/messages");
        assert_eq!(config.timeout, DEFAULT_SEND_TIMEOUT);
        assert!(config.api_token.is_none());

        let config = config.with_api_token("secret");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
    }
}
