//! Email Value Object
//!
//! Represents a structurally valid email address. The original spelling is
//! preserved for display and outbound mail; lookups use the lowercase
//! canonical form. Deliverability is only proven by the verification flow.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::IdentityError;

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

/// Email address value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email {
    /// As entered (case-preserving)
    original: String,
    /// Lowercase form used for uniqueness and lookup
    canonical: String,
}

impl Email {
    /// Create a new email with shape validation
    pub fn new(email: impl Into<String>) -> Result<Self, IdentityError> {
        let original = email.into().trim().to_string();

        if original.is_empty() {
            return Err(IdentityError::InvalidEmail("Email is required".to_string()));
        }

        if original.len() > EMAIL_MAX_LENGTH {
            return Err(IdentityError::InvalidEmail(format!(
                "Email must be at most {} characters",
                EMAIL_MAX_LENGTH
            )));
        }

        if !Self::is_valid_shape(&original) {
            return Err(IdentityError::InvalidEmail(
                "Invalid email format".to_string(),
            ));
        }

        let canonical = original.to_lowercase();
        Ok(Self {
            original,
            canonical,
        })
    }

    /// Basic `local@domain.tld` shape validation
    pub fn is_valid_shape(email: &str) -> bool {
        // Must contain exactly one @
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() != 2 {
            return false;
        }

        let local = parts[0];
        let domain = parts[1];

        // Local part checks
        if local.is_empty() || local.len() > 64 {
            return false;
        }

        // Domain checks
        if domain.is_empty() || !domain.contains('.') {
            return false;
        }

        // Check domain has valid characters
        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return false;
        }

        // Domain shouldn't start or end with dot or hyphen
        if domain.starts_with('.') || domain.ends_with('.') {
            return false;
        }
        if domain.starts_with('-') || domain.ends_with('-') {
            return false;
        }

        true
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(original: impl Into<String>) -> Self {
        let original = original.into();
        let canonical = original.to_lowercase();
        Self {
            original,
            canonical,
        }
    }

    /// Canonicalize an arbitrary input string for lookup
    pub fn canonicalize(input: &str) -> String {
        input.trim().to_lowercase()
    }

    /// Get the email as entered
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Get the lowercase canonical form
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Get the domain part of the email (canonical form)
    pub fn domain(&self) -> &str {
        self.canonical.split('@').nth(1).unwrap_or("")
    }
}

impl FromStr for Email {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Email::new(s)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(Email::new("user@example.com").is_ok());
        assert!(Email::new("User@Example.COM").is_ok());
        assert!(Email::new("user.name@example.co.jp").is_ok());
        assert!(Email::new("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_email_invalid() {
        assert!(Email::new("").is_err());
        assert!(Email::new("userexample.com").is_err());
        assert!(Email::new("user@").is_err());
        assert!(Email::new("@example.com").is_err());
        assert!(Email::new("user@@example.com").is_err());
        assert!(Email::new("user@example").is_err());
    }

    #[test]
    fn test_email_preserves_case_but_canonicalizes() {
        let email = Email::new("Alice@Gmail.COM").unwrap();
        assert_eq!(email.as_str(), "Alice@Gmail.COM");
        assert_eq!(email.canonical(), "alice@gmail.com");
    }

    #[test]
    fn test_email_domain() {
        let email = Email::new("user@Example.com").unwrap();
        assert_eq!(email.domain(), "example.com");
    }

    #[test]
    fn test_canonicalize_input() {
        assert_eq!(Email::canonicalize("  Bob@MAIL.example "), "bob@mail.example");
    }
}
