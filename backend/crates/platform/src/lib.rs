//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, Base64, random material)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Bearer credential extraction
//! - Outbound mail relay client

pub mod bearer;
pub mod crypto;
pub mod mailer;
pub mod password;
