//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod mail;
pub mod postgres;

pub use mail::{MailConfig, RelayNotifier};
pub use postgres::PgIdentityRepository;
