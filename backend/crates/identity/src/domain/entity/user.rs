//! User Entity
//!
//! Account record anchoring identity: credentials, verification state, and
//! role associations. A user holds at most one active verification code and
//! at most one active reset token; setting a new one invalidates the prior
//! value. Accounts are never hard-deleted here.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::password::HashedPassword;

use crate::domain::value_object::{email::Email, role_name::RoleName};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Unique email (case-preserving, compared case-insensitively)
    pub email: Email,
    /// Argon2id PHC digest
    pub password_hash: HashedPassword,
    pub first_name: String,
    pub last_name: String,
    /// Set exactly once by the verification flow
    pub email_verified: bool,
    /// Pending verification code or link token
    pub verification_code: Option<String>,
    pub verification_code_expires_at: Option<DateTime<Utc>>,
    /// Pending password reset token
    pub reset_token: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    /// Non-empty after registration
    pub roles: Vec<RoleName>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new unverified user
    pub fn new(
        email: Email,
        password_hash: HashedPassword,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        roles: Vec<RoleName>,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email,
            password_hash,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email_verified: false,
            verification_code: None,
            verification_code_expires_at: None,
            reset_token: None,
            reset_token_expires_at: None,
            roles,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set a fresh verification code or link token, invalidating any prior one
    pub fn set_verification_code(&mut self, code: impl Into<String>, expires_at: DateTime<Utc>) {
        self.verification_code = Some(code.into());
        self.verification_code_expires_at = Some(expires_at);
        self.updated_at = Utc::now();
    }

    /// Mark the email verified and clear the pending code
    pub fn mark_verified(&mut self) {
        self.email_verified = true;
        self.verification_code = None;
        self.verification_code_expires_at = None;
        self.updated_at = Utc::now();
    }

    /// Whether the pending verification code is past its expiry at `now`
    pub fn verification_code_expired(&self, now: DateTime<Utc>) -> bool {
        match self.verification_code_expires_at {
            Some(expiry) => now >= expiry,
            None => true,
        }
    }

    /// Set a fresh reset token, invalidating any prior one
    pub fn set_reset_token(&mut self, token: impl Into<String>, expires_at: DateTime<Utc>) {
        self.reset_token = Some(token.into());
        self.reset_token_expires_at = Some(expires_at);
        self.updated_at = Utc::now();
    }

    /// Clear the pending reset token
    pub fn clear_reset_token(&mut self) {
        self.reset_token = None;
        self.reset_token_expires_at = None;
        self.updated_at = Utc::now();
    }

    /// Whether the pending reset token is past its expiry at `now`
    pub fn reset_token_expired(&self, now: DateTime<Utc>) -> bool {
        match self.reset_token_expires_at {
            Some(expiry) => now >= expiry,
            None => true,
        }
    }

    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }
}
