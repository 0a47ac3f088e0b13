//! Notifier Trait
//!
//! External collaborator that delivers verification and reset messages
//! out-of-band. Implementations must bound how long a dispatch may take;
//! a dispatch failure is an explicit error, never a hang.

use thiserror::Error;

use crate::domain::value_object::email::Email;

/// Notifier delivery errors
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    /// The delivery attempt exceeded its time budget
    #[error("Notifier timed out")]
    Timeout,

    /// The message could not be handed over
    #[error("Notifier transport failed: {0}")]
    Transport(String),
}

/// Outbound notification collaborator
#[trait_variant::make(Notifier: Send)]
pub trait LocalNotifier {
    /// Deliver a 6-digit verification code
    async fn send_verification_code(
        &self,
        to: &Email,
        first_name: &str,
        code: &str,
    ) -> Result<(), NotifyError>;

    /// Deliver a link-style verification token
    async fn send_verification_link(
        &self,
        to: &Email,
        first_name: &str,
        token: &str,
    ) -> Result<(), NotifyError>;

    /// Deliver a password reset token
    async fn send_password_reset(
        &self,
        to: &Email,
        first_name: &str,
        token: &str,
    ) -> Result<(), NotifyError>;
}
