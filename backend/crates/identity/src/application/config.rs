//! Application Configuration
//!
//! Configuration for the identity application layer. All lifetimes are
//! fixed at deployment time.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Identity application configuration
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Secret key for HMAC token signing (32 bytes)
    pub token_secret: [u8; 32],
    /// Session token TTL (24 hours)
    pub token_ttl: Duration,
    /// 6-digit verification code TTL (10 minutes)
    pub code_ttl: Duration,
    /// Link-style verification token TTL (24 hours)
    pub link_ttl: Duration,
    /// Password reset token TTL (1 hour)
    pub reset_ttl: Duration,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            token_secret: [0u8; 32],
            token_ttl: Duration::from_secs(24 * 3600),
            code_ttl: Duration::from_secs(10 * 60),
            link_ttl: Duration::from_secs(24 * 3600),
            reset_ttl: Duration::from_secs(3600),
        }
    }
}

impl IdentityConfig {
    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    /// Expiry for a verification code issued now
    pub fn code_expires_at(&self) -> DateTime<Utc> {
        Utc::now() + self.code_ttl
    }

    /// Expiry for a link-style verification token issued now
    pub fn link_expires_at(&self) -> DateTime<Utc> {
        Utc::now() + self.link_ttl
    }

    /// Expiry for a reset token issued now
    pub fn reset_expires_at(&self) -> DateTime<Utc> {
        Utc::now() + self.reset_ttl
    }
}
