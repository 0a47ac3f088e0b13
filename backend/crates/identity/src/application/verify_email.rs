//! Email Verification Use Cases
//!
//! Two parallel paths establish that an address is deliverable:
//! - a 6-digit code the user types back (10-minute expiry)
//! - an opaque link token (24-hour expiry) that auto-logs-in on success
//!
//! Both store their secret in the same pending-verification slot, so issuing
//! a new one always invalidates the prior one.

use std::sync::Arc;

use chrono::Utc;
use platform::crypto::{constant_time_eq, random_numeric_code};
use uuid::Uuid;

use crate::application::config::IdentityConfig;
use crate::application::login::SessionOutput;
use crate::application::token::TokenService;
use crate::domain::notifier::Notifier;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{IdentityError, IdentityResult};

// ============================================================================
// Verify Code
// ============================================================================

/// Code-based verification use case
pub struct VerifyCodeUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> VerifyCodeUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, email: &str, code: &str) -> IdentityResult<()> {
        // An unknown account is indistinguishable from a bad code on the wire
        let user = self
            .user_repo
            .find_by_email(&Email::canonicalize(email))
            .await?
            .ok_or(IdentityError::InvalidOrExpiredCode)?;

        // Verification happens exactly once; a second attempt after success
        // reports the state instead of silently succeeding again.
        if user.email_verified {
            return Err(IdentityError::AlreadyVerified);
        }

        let matches = user
            .verification_code
            .as_deref()
            .is_some_and(|stored| constant_time_eq(stored.as_bytes(), code.as_bytes()));

        if !matches || user.verification_code_expired(Utc::now()) {
            return Err(IdentityError::InvalidOrExpiredCode);
        }

        // Single conditional update; a concurrent verify for the same code
        // loses the race and reports failure rather than double-applying.
        if !self.user_repo.mark_email_verified(&user.user_id, code).await? {
            return Err(IdentityError::InvalidOrExpiredCode);
        }

        tracing::info!(user_id = %user.user_id, "Email verified via code");

        Ok(())
    }
}

// ============================================================================
// Resend Code
// ============================================================================

/// Resend-code use case
pub struct ResendCodeUseCase<U, N>
where
    U: UserRepository,
    N: Notifier,
{
    user_repo: Arc<U>,
    notifier: Arc<N>,
    config: Arc<IdentityConfig>,
}

impl<U, N> ResendCodeUseCase<U, N>
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
        let user = self
            .user_repo
            .find_by_email(&Email::canonicalize(email))
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        if user.email_verified {
            return Err(IdentityError::AlreadyVerified);
        }

        // Overwrites the pending code, invalidating it
        let code = random_numeric_code(6);
        self.user_repo
            .set_verification_code(&user.user_id, &code, self.config.code_expires_at())
            .await?;

        self.notifier
            .send_verification_code(&user.email, &user.first_name, &code)
            .await?;

        tracing::info!(user_id = %user.user_id, "Verification code resent");

        Ok(())
    }
}

// ============================================================================
// Verify Link
// ============================================================================

/// Link-based verification use case
///
/// On success a session token is issued immediately (auto-login), unlike the
/// code path, which requires a separate login.
pub struct VerifyLinkUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: Arc<TokenService>,
}

impl<U> VerifyLinkUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, tokens: Arc<TokenService>) -> Self {
        Self { user_repo, tokens }
    }

    pub async fn execute(&self, token: &str) -> IdentityResult<SessionOutput> {
        let user = self
            .user_repo
            .find_by_verification_token(token)
            .await?
            .ok_or(IdentityError::InvalidOrExpiredToken)?;

        if user.email_verified {
            return Err(IdentityError::AlreadyVerified);
        }

        if user.verification_code_expired(Utc::now()) {
            return Err(IdentityError::InvalidOrExpiredToken);
        }

        if !self
            .user_repo
            .mark_email_verified(&user.user_id, token)
            .await?
        {
            return Err(IdentityError::InvalidOrExpiredToken);
        }

        let session_token = self.tokens.issue(&user.user_id, &user.email, &user.roles);

        tracing::info!(user_id = %user.user_id, "Email verified via link");

        Ok(SessionOutput {
            token: session_token,
            user_id: user.user_id,
            email: user.email.as_str().to_string(),
            first_name: user.first_name,
            roles: user.roles,
        })
    }
}

// ============================================================================
// Resend Link
// ============================================================================

/// Resend-verification-link use case
pub struct ResendLinkUseCase<U, N>
where
    U: UserRepository,
    N: Notifier,
{
    user_repo: Arc<U>,
    notifier: Arc<N>,
    config: Arc<IdentityConfig>,
}

impl<U, N> ResendLinkUseCase<U, N>
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
        let user = self
            .user_repo
            .find_by_email(&Email::canonicalize(email))
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        if user.email_verified {
            return Err(IdentityError::AlreadyVerified);
        }

        let token = Uuid::new_v4().to_string();
        self.user_repo
            .set_verification_code(&user.user_id, &token, self.config.link_expires_at())
            .await?;

        self.notifier
            .send_verification_link(&user.email, &user.first_name, &token)
            .await?;

        tracing::info!(user_id = %user.user_id, "Verification link resent");

        Ok(())
    }
}
