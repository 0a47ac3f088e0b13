//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//!
//! The conditional mutations (`mark_email_verified`, `reset_password`) must be
//! executed as a single atomic update: two concurrent calls for the same
//! account must not both report success.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::password::HashedPassword;

use crate::domain::entity::{role::Role, user::User};
use crate::domain::value_object::role_name::RoleName;
use crate::error::IdentityResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Persist a new user together with its role associations
    async fn create(&self, user: &User) -> IdentityResult<()>;

    /// Find user by canonical (lowercase) email
    async fn find_by_email(&self, canonical_email: &str) -> IdentityResult<Option<User>>;

    /// Check whether a canonical email is taken
    async fn exists_by_email(&self, canonical_email: &str) -> IdentityResult<bool>;

    /// Find user by pending verification code/link token
    async fn find_by_verification_token(&self, token: &str) -> IdentityResult<Option<User>>;

    /// Find user by pending reset token
    async fn find_by_reset_token(&self, token: &str) -> IdentityResult<Option<User>>;

    /// Overwrite the pending verification code and its expiry
    async fn set_verification_code(
        &self,
        user_id: &UserId,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> IdentityResult<()>;

    /// Atomically flip `email_verified` and clear the code, guarded on the
    /// account being unverified, the code matching, and the expiry being in
    /// the future. Returns false when the guard did not hold.
    async fn mark_email_verified(&self, user_id: &UserId, code: &str) -> IdentityResult<bool>;

    /// Set or clear the pending reset token
    async fn set_reset_token(
        &self,
        user_id: &UserId,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> IdentityResult<()>;

    /// Atomically install the new password hash and clear the reset token,
    /// guarded on the token still matching. Returns false when the guard did
    /// not hold (token already consumed by a concurrent reset).
    async fn reset_password(
        &self,
        user_id: &UserId,
        token: &str,
        new_hash: &HashedPassword,
    ) -> IdentityResult<bool>;
}

/// Role repository trait
#[trait_variant::make(RoleRepository: Send)]
pub trait LocalRoleRepository {
    /// Find a seeded role by name
    async fn find_by_name(&self, name: RoleName) -> IdentityResult<Option<Role>>;
}
