//! Catalog Backend Module
//!
//! Course and enrollment handling. This crate contains no authentication
//! logic of its own: it consumes the [`identity::Principal`] established by
//! the request middleware, declares required roles per route, and enforces
//! ownership by comparing the stored instructor id with the principal id.

pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use error::{CatalogError, CatalogResult};
pub use infra::postgres::PgCatalogRepository;
pub use presentation::router::catalog_router;

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::presentation::dto::*;
}

pub mod store {
    pub use crate::infra::postgres::PgCatalogRepository as CatalogStore;
}
