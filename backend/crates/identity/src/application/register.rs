//! Register Use Case
//!
//! Creates a new unverified account and dispatches the verification code.

use std::sync::Arc;

use kernel::id::UserId;
use platform::crypto::random_numeric_code;
use platform::password::ClearTextPassword;

use crate::application::config::IdentityConfig;
use crate::domain::email_policy::{EmailPolicy, EmailVerdict};
use crate::domain::entity::user::User;
use crate::domain::notifier::Notifier;
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::{email::Email, role_name::RoleName};
use crate::error::{IdentityError, IdentityResult};

/// Register input
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    /// Requested role name; blank/absent defaults to STUDENT
    pub role: Option<String>,
}

/// Register output
pub struct RegisterOutput {
    pub user_id: UserId,
    /// As-entered email, echoed back to the client
    pub email: String,
    /// Whether the verification code was handed to the notifier.
    /// The account exists either way; a failed dispatch is resolved via
    /// the resend flow.
    pub dispatched: bool,
}

/// Register use case
pub struct RegisterUseCase<U, R, N>
where
    U: UserRepository,
    R: RoleRepository,
    N: Notifier,
{
    user_repo: Arc<U>,
    role_repo: Arc<R>,
    notifier: Arc<N>,
    config: Arc<IdentityConfig>,
    policy: EmailPolicy,
}

impl<U, R, N> RegisterUseCase<U, R, N>
where
    U: UserRepository,
    R: RoleRepository,
    N: Notifier,
{
    pub fn new(
        user_repo: Arc<U>,
        role_repo: Arc<R>,
        notifier: Arc<N>,
        config: Arc<IdentityConfig>,
    ) -> Self {
        Self {
            user_repo,
            role_repo,
            notifier,
            config,
            policy: EmailPolicy::default(),
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> IdentityResult<RegisterOutput> {
        // Screen the address before anything touches the store
        match self.policy.validate(&input.email) {
            EmailVerdict::Rejected(reason) => {
                return Err(IdentityError::InvalidEmail(reason.message().to_string()));
            }
            EmailVerdict::AcceptedForReview => {
                tracing::debug!(email = %input.email, "Email domain accepted for review");
            }
            EmailVerdict::Accepted => {}
        }

        let email = Email::new(&input.email)?;

        if self.user_repo.exists_by_email(email.canonical()).await? {
            return Err(IdentityError::EmailInUse);
        }

        // Resolve the requested role; blank falls back to STUDENT
        let role_name = match input.role.as_deref() {
            None => RoleName::Student,
            Some(s) if s.trim().is_empty() => RoleName::Student,
            Some(s) => RoleName::parse(s).ok_or(IdentityError::RoleNotFound)?,
        };

        let role = match role_name {
            RoleName::Student => self
                .role_repo
                .find_by_name(role_name)
                .await?
                .ok_or_else(|| IdentityError::Internal("Role store is not seeded".to_string()))?,
            _ => self
                .role_repo
                .find_by_name(role_name)
                .await?
                .ok_or(IdentityError::RoleNotFound)?,
        };

        let raw_password = ClearTextPassword::new(input.password)?;
        let password_hash = raw_password.hash()?;

        let code = random_numeric_code(6);

        let mut user = User::new(
            email,
            password_hash,
            input.first_name,
            input.last_name,
            vec![role.name],
        );
        user.set_verification_code(&code, self.config.code_expires_at());

        self.user_repo.create(&user).await?;

        // Dispatch failure does not roll the account back
        let dispatched = match self
            .notifier
            .send_verification_code(&user.email, &user.first_name, &code)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    user_id = %user.user_id,
                    error = %e,
                    "Verification code dispatch failed after registration"
                );
                false
            }
        };

        tracing::info!(
            user_id = %user.user_id,
            role = %role.name,
            dispatched,
            "User registered"
        );

        Ok(RegisterOutput {
            user_id: user.user_id,
            email: user.email.as_str().to_string(),
            dispatched,
        })
    }
}
