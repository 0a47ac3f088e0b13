//! Relay Notifier
//!
//! `Notifier` implementation over the HTTP mail relay. The relay client
//! carries a bounded timeout, so a slow mail transport can only cost a
//! request that budget, never hang it.

use platform::mailer::{EmailMessage, MailerClient, MailerConfig, MailerError};

use crate::domain::notifier::{Notifier, NotifyError};
use crate::domain::value_object::email::Email;

/// Mail delivery configuration
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Relay endpoint configuration
    pub relay: MailerConfig,
    /// Sender identity
    pub from_address: String,
    /// Base URL for verification/reset links
    pub frontend_url: String,
}

/// Notifier backed by the HTTP mail relay
#[derive(Debug, Clone)]
pub struct RelayNotifier {
    client: MailerClient,
    from_address: String,
    frontend_url: String,
}

impl RelayNotifier {
    pub fn new(config: MailConfig) -> Result<Self, MailerError> {
        let client = MailerClient::new(config.relay)?;

        Ok(Self {
            client,
            from_address: config.from_address,
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
        })
    }

    async fn dispatch(&self, to: &Email, subject: &str, text: String) -> Result<(), NotifyError> {
        let message = EmailMessage {
            from: self.from_address.clone(),
            to: to.as_str().to_string(),
            subject: subject.to_string(),
            text,
        };

        self.client.send(&message).await.map_err(NotifyError::from)
    }
}

impl From<MailerError> for NotifyError {
    fn from(err: MailerError) -> Self {
        match err {
            MailerError::Timeout => NotifyError::Timeout,
            other => NotifyError::Transport(other.to_string()),
        }
    }
}

impl Notifier for RelayNotifier {
    async fn send_verification_code(
        &self,
        to: &Email,
        first_name: &str,
        code: &str,
    ) -> Result<(), NotifyError> {
        let text = format!(
            "Hello {},\n\n\
             Your verification code for E-Learning Platform is: {}\n\n\
             This code will expire in 10 minutes.\n\n\
             If you did not create an account, please ignore this email.\n\n\
             Best regards,\n\
             E-Learning Platform Team",
            first_name, code
        );

        self.dispatch(to, "Your Verification Code - E-Learning Platform", text)
            .await
    }

    async fn send_verification_link(
        &self,
        to: &Email,
        first_name: &str,
        token: &str,
    ) -> Result<(), NotifyError> {
        let link = format!("{}/verify-email?token={}", self.frontend_url, token);

        let text = format!(
            "Hello {},\n\n\
             Please verify your email address to complete your registration.\n\n\
             Click the link below to verify your email:\n\
             {}\n\n\
             This link will expire in 24 hours.\n\n\
             If you did not create an account, please ignore this email.\n\n\
             Best regards,\n\
             E-Learning Platform Team",
            first_name, link
        );

        self.dispatch(to, "Verify Your Email - E-Learning Platform", text)
            .await
    }

    async fn send_password_reset(
        &self,
        to: &Email,
        first_name: &str,
        token: &str,
    ) -> Result<(), NotifyError> {
        let link = format!("{}/reset-password?token={}", self.frontend_url, token);

        let text = format!(
            "Hello {},\n\n\
             You have requested to reset your password for your E-Learning Platform account.\n\n\
             Please click the link below to reset your password:\n\
             {}\n\n\
             This link will expire in 1 hour for security reasons.\n\n\
             If you did not request this password reset, please ignore this email.\n\n\
             Best regards,\n\
             E-Learning Platform Team",
            first_name, link
        );

        self.dispatch(to, "Password Reset Request - E-Learning Platform", text)
            .await
    }
}
