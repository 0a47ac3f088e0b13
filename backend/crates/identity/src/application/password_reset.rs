//! Password Reset Use Cases
//!
//! Token-based reset with a 1-hour expiry and single-use invalidation.

use std::sync::Arc;

use chrono::Utc;
use platform::password::ClearTextPassword;
use uuid::Uuid;

use crate::application::config::IdentityConfig;
use crate::domain::notifier::Notifier;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{IdentityError, IdentityResult};

// ============================================================================
// Forgot Password
// ============================================================================

/// Forgot-password use case
///
/// Returns `Ok(())` whether or not the account exists; the HTTP layer answers
/// with the same acknowledgement either way so responses cannot be used to
/// enumerate accounts. Only a failed dispatch surfaces as an error.
pub struct ForgotPasswordUseCase<U, N>
where
    U: UserRepository,
    N: Notifier,
{
    user_repo: Arc<U>,
    notifier: Arc<N>,
    config: Arc<IdentityConfig>,
}

impl<U, N> ForgotPasswordUseCase<U, N>
where
    U: UserRepository,
    N: Notifier,
{
    pub fn new(user_repo: Arc<U>, notifier: Arc<N>, config: Arc<IdentityConfig>) -> Self {
        Self {
            user_repo,
            notifier,
            config,
        }
    }

    pub async fn execute(&self, email: &str) -> IdentityResult<()> {
        let Some(user) = self
            .user_repo
            .find_by_email(&Email::canonicalize(email))
            .await?
        else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = Uuid::new_v4().to_string();
        self.user_repo
            .set_reset_token(
                &user.user_id,
                Some(&token),
                Some(self.config.reset_expires_at()),
            )
            .await?;

        if let Err(e) = self
            .notifier
            .send_password_reset(&user.email, &user.first_name, &token)
            .await
        {
            // A token the user never received must not stay live
            self.user_repo
                .set_reset_token(&user.user_id, None, None)
                .await?;
            return Err(IdentityError::Notifier(e));
        }

        tracing::info!(user_id = %user.user_id, "Password reset link sent");

        Ok(())
    }
}

// ============================================================================
// Reset Password
// ============================================================================

/// Reset-password use case
pub struct ResetPasswordUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> ResetPasswordUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, token: &str, new_password: String) -> IdentityResult<()> {
        let user = self
            .user_repo
            .find_by_reset_token(token)
            .await?
            .ok_or(IdentityError::InvalidOrExpiredToken)?;

        if user.reset_token_expired(Utc::now()) {
            // Opportunistic cleanup of a token that can never be used
            self.user_repo
                .set_reset_token(&user.user_id, None, None)
                .await?;
            return Err(IdentityError::InvalidOrExpiredToken);
        }

        let raw_password = ClearTextPassword::new(new_password)?;
        let new_hash = raw_password.hash()?;

        // Hash install and token clear are one update; a concurrent reset
        // with the same token loses the race and fails.
        if !self
            .user_repo
            .reset_password(&user.user_id, token, &new_hash)
            .await?
        {
            return Err(IdentityError::InvalidOrExpiredToken);
        }

        tracing::info!(user_id = %user.user_id, "Password reset completed");

        Ok(())
    }
}
