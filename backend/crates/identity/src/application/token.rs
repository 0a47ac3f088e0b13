//! Token Service
//!
//! Issues and validates stateless session tokens. A token is
//! `base64url(claims_json) + "." + base64url(hmac_sha256_signature)` signed
//! with a server-held secret. Validity is purely a function of signature and
//! expiry, so revocation before expiry is not supported; the roles in the
//! claims are the authorization source of truth for the request's lifetime
//! and are not re-checked against the store (stale-role window up to TTL).
//!
//! Every validation failure is collapsed into the single opaque
//! `InvalidToken` error: callers learn nothing about why a token failed.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::domain::value_object::{email::Email, role_name::RoleName};
use crate::error::{IdentityError, IdentityResult};

type HmacSha256 = Hmac<Sha256>;

/// Claims embedded in a session token
///
/// Unknown role strings fail deserialization, so a token minted with a role
/// this build does not know is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject: the account email
    pub sub: String,
    pub user_id: Uuid,
    pub roles: Vec<RoleName>,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds), `iat + ttl`
    pub exp: i64,
}

/// Issues and validates signed session tokens
#[derive(Debug, Clone)]
pub struct TokenService {
    secret: [u8; 32],
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: [u8; 32], ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// Issue a token for the given identity
    pub fn issue(&self, user_id: &UserId, email: &Email, roles: &[RoleName]) -> String {
        self.issue_at(user_id, email, roles, Utc::now().timestamp())
    }

    fn issue_at(&self, user_id: &UserId, email: &Email, roles: &[RoleName], iat: i64) -> String {
        let claims = Claims {
            sub: email.as_str().to_string(),
            user_id: *user_id.as_uuid(),
            roles: roles.to_vec(),
            iat,
            exp: iat + self.ttl.as_secs() as i64,
        };

        let payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).expect("claims serialize to JSON"));

        format!("{}.{}", payload, self.sign(payload.as_bytes()))
    }

    /// Validate a token and extract its claims
    pub fn validate(&self, token: &str) -> IdentityResult<Claims> {
        let (payload, signature_b64) = token
            .split_once('.')
            .ok_or(IdentityError::InvalidToken)?;

        // Signature first; nothing else is trusted before it checks out
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| IdentityError::InvalidToken)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| IdentityError::InvalidToken)?;

        let claims_json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| IdentityError::InvalidToken)?;

        let claims: Claims =
            serde_json::from_slice(&claims_json).map_err(|_| IdentityError::InvalidToken)?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(IdentityError::InvalidToken);
        }

        Ok(claims)
    }

    fn sign(&self, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC can take key of any size");
        mac.update(payload);
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}
