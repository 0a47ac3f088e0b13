//! Identity Error Types
//!
//! This module provides identity-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::notifier::NotifyError;

/// Identity-specific result type alias
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity-specific error variants
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Email rejected by the registration policy
    #[error("{0}")]
    InvalidEmail(String),

    /// Email already registered (case-insensitive)
    #[error("Email is already in use")]
    EmailInUse,

    /// Requested role name has no match
    #[error("Role not found")]
    RoleNotFound,

    /// Password rejected by the password policy
    #[error("{0}")]
    InvalidPassword(String),

    /// Invalid credentials (unknown email or wrong password)
    #[error("Invalid email or password")]
    InvalidCredentials {
        /// Which input the failure is attributed to ("email" or "password")
        field: &'static str,
    },

    /// Account exists but the email is not verified yet
    #[error("Please verify your email before signing in")]
    EmailNotVerified,

    /// Verification re-submitted after success
    #[error("Email is already verified")]
    AlreadyVerified,

    /// No account for the given email
    #[error("User not found")]
    UserNotFound,

    /// Verification code mismatch or past its expiry
    #[error("Invalid or expired code")]
    InvalidOrExpiredCode,

    /// Verification/reset token unknown, consumed, or past its expiry
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    /// Session token failed validation (single opaque reason)
    #[error("Invalid session token")]
    InvalidToken,

    /// No valid principal on a protected route
    #[error("Authentication required")]
    Unauthenticated,

    /// Authenticated but lacking the required role or ownership
    #[error("Insufficient permissions")]
    Forbidden,

    /// Outbound notification could not be delivered
    #[error("Notification could not be sent")]
    Notifier(#[from] NotifyError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::InvalidEmail(_)
            | IdentityError::EmailInUse
            | IdentityError::RoleNotFound
            | IdentityError::InvalidPassword(_)
            | IdentityError::AlreadyVerified
            | IdentityError::InvalidOrExpiredCode
            | IdentityError::InvalidOrExpiredToken => StatusCode::BAD_REQUEST,
            IdentityError::InvalidCredentials { .. }
            | IdentityError::EmailNotVerified
            | IdentityError::InvalidToken
            | IdentityError::Unauthenticated => StatusCode::UNAUTHORIZED,
            IdentityError::Forbidden => StatusCode::FORBIDDEN,
            IdentityError::UserNotFound => StatusCode::NOT_FOUND,
            IdentityError::Notifier(_) => StatusCode::BAD_GATEWAY,
            IdentityError::Database(_) | IdentityError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::InvalidEmail(_)
            | IdentityError::EmailInUse
            | IdentityError::RoleNotFound
            | IdentityError::InvalidPassword(_)
            | IdentityError::AlreadyVerified
            | IdentityError::InvalidOrExpiredCode
            | IdentityError::InvalidOrExpiredToken => ErrorKind::BadRequest,
            IdentityError::InvalidCredentials { .. }
            | IdentityError::EmailNotVerified
            | IdentityError::InvalidToken
            | IdentityError::Unauthenticated => ErrorKind::Unauthorized,
            IdentityError::Forbidden => ErrorKind::Forbidden,
            IdentityError::UserNotFound => ErrorKind::NotFound,
            IdentityError::Notifier(_) => ErrorKind::BadGateway,
            IdentityError::Database(_) | IdentityError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Input field the error is attributed to, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            IdentityError::InvalidEmail(_)
            | IdentityError::EmailInUse
            | IdentityError::EmailNotVerified => Some("email"),
            IdentityError::RoleNotFound => Some("role"),
            IdentityError::InvalidPassword(_) => Some("password"),
            IdentityError::InvalidCredentials { field } => Some(*field),
            _ => None,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self.field() {
            Some(field) => err.with_field(field),
            None => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            IdentityError::Database(e) => {
                tracing::error!(error = %e, "Identity database error");
            }
            IdentityError::Internal(msg) => {
                tracing::error!(message = %msg, "Identity internal error");
            }
            IdentityError::Notifier(e) => {
                tracing::error!(error = %e, "Notifier dispatch failed");
            }
            IdentityError::InvalidCredentials { .. } => {
                tracing::warn!("Invalid login attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Identity error");
            }
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        self.log();

        // The unverified-account response carries an extra flag so clients
        // can route the user to the verification screen.
        if matches!(self, IdentityError::EmailNotVerified) {
            let body = serde_json::json!({
                "error": self.to_string(),
                "field": "email",
                "requiresVerification": true,
            });
            return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        }

        self.to_app_error().into_response()
    }
}

impl From<AppError> for IdentityError {
    fn from(err: AppError) -> Self {
        IdentityError::Internal(err.to_string())
    }
}

impl From<platform::password::PasswordPolicyError> for IdentityError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        IdentityError::InvalidPassword(err.to_string())
    }
}

impl From<platform::password::PasswordHashError> for IdentityError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        IdentityError::Internal(err.to_string())
    }
}
