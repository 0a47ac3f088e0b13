//! Email Acceptance Policy
//!
//! Registration-time screening of email addresses. This is a quality filter,
//! not a security boundary: the allow/deny lists are static and the final
//! word on deliverability belongs to the verification flow.
//!
//! Rules, in order:
//! 1. reject empty/missing input
//! 2. reject anything that fails the `local@domain.tld` shape check
//! 3. reject domains matching the disposable-provider deny-list (substring)
//! 4. accept domains suffix-matching the trusted-provider allow-list
//! 5. otherwise accept, annotated for review

use crate::domain::value_object::email::Email;

/// Providers accepted without annotation
const TRUSTED_PROVIDERS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "hotmail.com",
    "icloud.com",
    "aol.com",
    "protonmail.com",
    "zoho.com",
    "mail.com",
    "gmx.com",
    "yandex.com",
    "live.com",
    "msn.com",
    "me.com",
    "mac.com",
    "fastmail.com",
    "tutanota.com",
    "hey.com",
];

/// Disposable/temporary providers blocked at registration
const DISPOSABLE_PROVIDERS: &[&str] = &[
    "10minutemail.com",
    "tempmail.org",
    "guerrillamail.com",
    "mailinator.com",
    "throwaway.email",
    "temp-mail.org",
    "sharklasers.com",
    "guerrillamailblock.com",
    "pokemail.net",
    "spam4.me",
    "bccto.me",
    "chacuo.net",
    "dispostable.com",
    "fakeinbox.com",
    "fakeinbox.net",
    "getairmail.com",
    "getnada.com",
    "inbox.si",
    "mailnesia.com",
    "mintemail.com",
    "mohmal.com",
    "nwytg.net",
    "spamspot.com",
    "spam.la",
    "tempr.email",
    "tmpeml.com",
    "trashmail.com",
    "yopmail.com",
    "yopmail.net",
    "yopmail.org",
    "cool.fr.nf",
    "jetable.fr.nf",
    "nospam.ze.tc",
    "nomail.xl.cx",
    "mega.zik.dj",
    "speed.1s.fr",
    "courriel.fr.nf",
    "moncourrier.fr.nf",
    "monemail.fr.nf",
    "monmail.fr.nf",
    "test.com",
    "example.com",
    "test.org",
    "example.org",
    "test.net",
    "example.net",
    "sss.com",
    "aaa.com",
    "fake.com",
    "fake.org",
    "fake.net",
    "temp.com",
    "temp.org",
    "temp.net",
];

/// Why an address was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Empty,
    Format,
    Disposable,
}

impl RejectReason {
    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::Empty => "Email is required",
            RejectReason::Format => "Invalid email format",
            RejectReason::Disposable => "Temporary or disposable email addresses are not allowed",
        }
    }
}

/// Policy verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailVerdict {
    /// Trusted provider
    Accepted,
    /// Unknown domain, accepted but annotated (not blocking)
    AcceptedForReview,
    Rejected(RejectReason),
}

impl EmailVerdict {
    pub fn is_valid(&self) -> bool {
        !matches!(self, EmailVerdict::Rejected(_))
    }
}

/// Pluggable acceptance policy over static provider lists
#[derive(Debug, Clone, Copy)]
pub struct EmailPolicy {
    trusted: &'static [&'static str],
    disposable: &'static [&'static str],
}

impl Default for EmailPolicy {
    fn default() -> Self {
        Self {
            trusted: TRUSTED_PROVIDERS,
            disposable: DISPOSABLE_PROVIDERS,
        }
    }
}

impl EmailPolicy {
    pub fn validate(&self, input: &str) -> EmailVerdict {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return EmailVerdict::Rejected(RejectReason::Empty);
        }

        if !Email::is_valid_shape(trimmed) {
            return EmailVerdict::Rejected(RejectReason::Format);
        }

        let domain = trimmed
            .split('@')
            .nth(1)
            .unwrap_or("")
            .to_lowercase();

        // Substring match catches subdomain tricks like mail.mailinator.com
        if self.disposable.iter().any(|p| domain.contains(p)) {
            return EmailVerdict::Rejected(RejectReason::Disposable);
        }

        if self.trusted.iter().any(|p| domain.ends_with(p)) {
            return EmailVerdict::Accepted;
        }

        EmailVerdict::AcceptedForReview
    }
}
