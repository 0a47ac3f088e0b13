//! Login Use Case
//!
//! Validates credentials, checks verification status, and issues a
//! stateless session token.

use std::sync::Arc;

use kernel::id::UserId;
use platform::password::ClearTextPassword;

use crate::application::token::TokenService;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, role_name::RoleName};
use crate::error::{IdentityError, IdentityResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// An established session: the token plus the identity echoed for display.
/// Shared with link-style verification, which auto-logs-in on success.
pub struct SessionOutput {
    pub token: String,
    pub user_id: UserId,
    pub email: String,
    pub first_name: String,
    pub roles: Vec<RoleName>,
}

/// Login use case
pub struct LoginUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: Arc<TokenService>,
}

impl<U> LoginUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, tokens: Arc<TokenService>) -> Self {
        Self { user_repo, tokens }
    }

    pub async fn execute(&self, input: LoginInput) -> IdentityResult<SessionOutput> {
        // The per-field attribution below mirrors the client contract.
        // It is a known hardening gap: the messages are identical but the
        // field tag still distinguishes unknown-account from wrong-password.
        let user = self
            .user_repo
            .find_by_email(&Email::canonicalize(&input.email))
            .await?
            .ok_or(IdentityError::InvalidCredentials { field: "email" })?;

        // Any policy-rejected input can never match a stored hash
        let password_valid = match ClearTextPassword::new(input.password) {
            Ok(raw) => user.password_hash.verify(&raw),
            Err(_) => false,
        };

        if !password_valid {
            return Err(IdentityError::InvalidCredentials { field: "password" });
        }

        if !user.email_verified {
            return Err(IdentityError::EmailNotVerified);
        }

        let token = self.tokens.issue(&user.user_id, &user.email, &user.roles);

        tracing::info!(user_id = %user.user_id, "User signed in");

        Ok(SessionOutput {
            token,
            user_id: user.user_id,
            email: user.email.as_str().to_string(),
            first_name: user.first_name,
            roles: user.roles,
        })
    }
}
