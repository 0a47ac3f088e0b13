//! Request Authentication Middleware
//!
//! `authenticate` runs once per request, ahead of routing:
//! - OPTIONS pre-flight probes pass through untouched
//! - no bearer credential: the request proceeds anonymously
//! - invalid/expired token: treated exactly like no token; the middleware
//!   never answers 401 itself, it only declines to populate an identity
//! - valid token: a [`Principal`] is built from the claims (no store
//!   round-trip) and attached to the request for the rest of the pipeline
//!
//! The gates (`require_auth`, `require_role`) are the downstream
//! authorization decision: absence of a principal is 401, a present
//! principal lacking the required role is 403.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::Method;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::id::UserId;

use crate::application::token::{Claims, TokenService};
use crate::domain::value_object::role_name::RoleName;
use crate::error::IdentityError;

/// The authenticated identity attached to a request
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub roles: Vec<RoleName>,
}

impl Principal {
    /// Build a principal purely from validated claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: UserId::from_uuid(claims.user_id),
            email: claims.sub.clone(),
            roles: claims.roles.clone(),
        }
    }

    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| IdentityError::Unauthenticated.into_response())
    }
}

/// State for the authentication middleware
#[derive(Clone)]
pub struct AuthLayerState {
    pub tokens: Arc<TokenService>,
}

/// Populate the request with a [`Principal`] when a valid bearer token is
/// presented; otherwise pass the request through anonymously.
pub async fn authenticate(
    State(state): State<AuthLayerState>,
    mut req: Request,
    next: Next,
) -> Response {
    // CORS pre-flight probes carry no credentials worth inspecting
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    if let Some(token) = platform::bearer::extract_bearer(req.headers()) {
        match state.tokens.validate(token) {
            Ok(claims) => {
                req.extensions_mut().insert(Principal::from_claims(&claims));
            }
            Err(_) => {
                // Indistinguishable from an absent token downstream
                tracing::debug!("Discarding invalid bearer token");
            }
        }
    }

    next.run(req).await
}

/// Gate: any authenticated principal
pub async fn require_auth(req: Request, next: Next) -> Result<Response, Response> {
    if req.extensions().get::<Principal>().is_none() {
        return Err(IdentityError::Unauthenticated.into_response());
    }

    Ok(next.run(req).await)
}

/// Role required by a gated route
#[derive(Debug, Clone, Copy)]
pub struct RequiredRole(pub RoleName);

/// Gate: authenticated principal holding the required role
pub async fn require_role(
    State(RequiredRole(role)): State<RequiredRole>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    match req.extensions().get::<Principal>() {
        None => Err(IdentityError::Unauthenticated.into_response()),
        Some(principal) if !principal.has_role(role) => {
            tracing::warn!(
                user_id = %principal.user_id,
                required = %role,
                "Role gate rejected request"
            );
            Err(IdentityError::Forbidden.into_response())
        }
        Some(_) => Ok(next.run(req).await),
    }
}
