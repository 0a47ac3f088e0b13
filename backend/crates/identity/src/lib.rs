//! Identity (Authentication & Authorization) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations and the mail relay notifier
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Registration with email verification (6-digit code or link token)
//! - Stateless sessions: HMAC-SHA256 signed tokens, validity = signature + expiry
//! - Password reset with single-use, expiring tokens
//! - Role-based access (STUDENT, TEACHER) enforced per request
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Token roles are the per-request authorization source of truth;
//!   a role change propagates only after the token TTL (no revocation list)
//! - Verification and reset mutations are single atomic updates
//! - Forgot-password and resend flows answer identically for unknown accounts

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::IdentityConfig;
pub use application::token::{Claims, TokenService};
pub use error::{IdentityError, IdentityResult};
pub use infra::mail::{MailConfig, RelayNotifier};
pub use infra::postgres::PgIdentityRepository;
pub use presentation::middleware::{AuthLayerState, Principal};
pub use presentation::router::identity_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgIdentityRepository as IdentityStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
