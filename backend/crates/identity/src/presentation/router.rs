//! Identity Router

use axum::{Router, routing::post};
use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::application::token::TokenService;
use crate::domain::notifier::Notifier;
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::infra::mail::RelayNotifier;
use crate::infra::postgres::PgIdentityRepository;
use crate::presentation::handlers::{self, IdentityAppState};

/// Create the identity router with the PostgreSQL repository and relay notifier
pub fn identity_router(
    repo: PgIdentityRepository,
    notifier: RelayNotifier,
    tokens: Arc<TokenService>,
    config: IdentityConfig,
) -> Router {
    identity_router_generic(repo, notifier, tokens, config)
}

/// Create a generic identity router for any repository/notifier implementation
pub fn identity_router_generic<R, N>(
    repo: R,
    notifier: N,
    tokens: Arc<TokenService>,
    config: IdentityConfig,
) -> Router
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
    N: Notifier + Clone + Send + Sync + 'static,
{
    let state = IdentityAppState {
        repo: Arc::new(repo),
        notifier: Arc::new(notifier),
        tokens,
        config: Arc::new(config),
    };

    Router::new()
        .route("/register", post(handlers::register::<R, N>))
        .route("/verify-code", post(handlers::verify_code::<R, N>))
        .route("/resend-code", post(handlers::resend_code::<R, N>))
        .route("/verify-email", post(handlers::verify_email::<R, N>))
        .route(
            "/resend-verification",
            post(handlers::resend_verification::<R, N>),
        )
        .route("/login", post(handlers::login::<R, N>))
        .route("/forgot-password", post(handlers::forgot_password::<R, N>))
        .route("/reset-password", post(handlers::reset_password::<R, N>))
        .with_state(state)
}
