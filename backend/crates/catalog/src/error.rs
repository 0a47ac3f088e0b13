//! Catalog Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Catalog-specific result type alias
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog-specific error variants
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Course not found
    #[error("Course not found")]
    CourseNotFound,

    /// Mutation attempted by someone other than the course's instructor
    #[error("Only the course's instructor may modify it")]
    NotCourseOwner,

    /// Student is already enrolled in the course
    #[error("Already enrolled in this course")]
    AlreadyEnrolled,

    /// Malformed input
    #[error("{0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::CourseNotFound => StatusCode::NOT_FOUND,
            CatalogError::NotCourseOwner => StatusCode::FORBIDDEN,
            CatalogError::AlreadyEnrolled => StatusCode::CONFLICT,
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::Database(_) | CatalogError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::CourseNotFound => ErrorKind::NotFound,
            CatalogError::NotCourseOwner => ErrorKind::Forbidden,
            CatalogError::AlreadyEnrolled => ErrorKind::Conflict,
            CatalogError::Validation(_) => ErrorKind::BadRequest,
            CatalogError::Database(_) | CatalogError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            CatalogError::Database(e) => {
                tracing::error!(error = %e, "Catalog database error");
            }
            CatalogError::Internal(msg) => {
                tracing::error!(message = %msg, "Catalog internal error");
            }
            CatalogError::NotCourseOwner => {
                tracing::warn!("Ownership check rejected course mutation");
            }
            _ => {
                tracing::debug!(error = %self, "Catalog error");
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
