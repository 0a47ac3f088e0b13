//! HTTP Handlers
//!
//! Enumeration stance, applied deliberately per endpoint: forgot-password
//! and the two resend endpoints always answer with the same success-shaped
//! acknowledgement whether or not the account exists; register and login
//! keep field-tagged errors because their flows already reveal existence.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::application::token::TokenService;
use crate::application::{
    ForgotPasswordUseCase, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase,
    ResendCodeUseCase, ResendLinkUseCase, ResetPasswordUseCase, SessionOutput, VerifyCodeUseCase,
    VerifyLinkUseCase,
};
use crate::domain::notifier::Notifier;
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::error::{IdentityError, IdentityResult};
use crate::presentation::dto::{
    EmailRequest, LoginRequest, MessageResponse, RegisterDispatchFailedResponse, RegisterRequest,
    RegisterResponse, ResetPasswordRequest, SessionResponse, VerifyCodeRequest, VerifyEmailRequest,
};

/// Shared state for identity handlers
#[derive(Clone)]
pub struct IdentityAppState<R, N>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
    N: Notifier + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub notifier: Arc<N>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<IdentityConfig>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    Json(req): Json<RegisterRequest>,
) -> IdentityResult<Response>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
    N: Notifier + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );

    let input = RegisterInput {
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        password: req.password,
        role: req.role,
    };

    let output = use_case.execute(input).await?;

    if !output.dispatched {
        // The account exists; the client retries delivery via resend
        return Ok((
            StatusCode::BAD_GATEWAY,
            Json(RegisterDispatchFailedResponse {
                error: "Verification code could not be sent. The account was created; \
                        request a new code to continue."
                    .to_string(),
                email: output.email,
            }),
        )
            .into_response());
    }

    Ok((
        StatusCode::OK,
        Json(RegisterResponse {
            message: "Registration successful! Check your email.".to_string(),
            email: output.email,
            requires_verification: true,
        }),
    )
        .into_response())
}

// ============================================================================
// Verification
// ============================================================================

/// POST /api/auth/verify-code
pub async fn verify_code<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    Json(req): Json<VerifyCodeRequest>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
    N: Notifier + Clone + Send + Sync + 'static,
{
    let use_case = VerifyCodeUseCase::new(state.repo.clone());

    use_case.execute(&req.email, &req.code).await?;

    Ok(Json(MessageResponse::new("Email verified successfully.")))
}

/// POST /api/auth/resend-code
pub async fn resend_code<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    Json(req): Json<EmailRequest>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
    N: Notifier + Clone + Send + Sync + 'static,
{
    let use_case =
        ResendCodeUseCase::new(state.repo.clone(), state.notifier.clone(), state.config.clone());

    ack_resend(use_case.execute(&req.email).await)
}

/// POST /api/auth/verify-email
pub async fn verify_email<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    Json(req): Json<VerifyEmailRequest>,
) -> IdentityResult<Json<SessionResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
    N: Notifier + Clone + Send + Sync + 'static,
{
    let use_case = VerifyLinkUseCase::new(state.repo.clone(), state.tokens.clone());

    let output = use_case.execute(&req.token).await?;

    Ok(Json(session_response(output)))
}

/// POST /api/auth/resend-verification
pub async fn resend_verification<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    Json(req): Json<EmailRequest>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
    N: Notifier + Clone + Send + Sync + 'static,
{
    let use_case =
        ResendLinkUseCase::new(state.repo.clone(), state.notifier.clone(), state.config.clone());

    ack_resend(use_case.execute(&req.email).await)
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    Json(req): Json<LoginRequest>,
) -> IdentityResult<Json<SessionResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
    N: Notifier + Clone + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.tokens.clone());

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(session_response(output)))
}

// ============================================================================
// Password reset
// ============================================================================

/// POST /api/auth/forgot-password
pub async fn forgot_password<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    Json(req): Json<EmailRequest>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
    N: Notifier + Clone + Send + Sync + 'static,
{
    let use_case = ForgotPasswordUseCase::new(
        state.repo.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );

    // Identical acknowledgement whether or not the account exists
    use_case.execute(&req.email).await?;

    Ok(Json(MessageResponse::new(
        "If an account exists, a password reset link has been sent.",
    )))
}

/// POST /api/auth/reset-password
pub async fn reset_password<R, N>(
    State(state): State<IdentityAppState<R, N>>,
    Json(req): Json<ResetPasswordRequest>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
    N: Notifier + Clone + Send + Sync + 'static,
{
    let use_case = ResetPasswordUseCase::new(state.repo.clone());

    use_case.execute(&req.token, req.password).await?;

    Ok(Json(MessageResponse::new("Password reset successfully.")))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn session_response(output: SessionOutput) -> SessionResponse {
    SessionResponse {
        token: output.token,
        id: output.user_id.into_uuid(),
        email: output.email,
        first_name: output.first_name,
        roles: output.roles,
    }
}

/// Collapse the account-revealing outcomes of a resend flow into the same
/// acknowledgement a successful resend produces. Operational failures
/// (store, notifier) still surface.
fn ack_resend(result: IdentityResult<()>) -> IdentityResult<Json<MessageResponse>> {
    match result {
        Ok(())
        | Err(IdentityError::UserNotFound)
        | Err(IdentityError::AlreadyVerified) => Ok(Json(MessageResponse::new(
            "If the account exists and is not yet verified, a new verification message has been sent.",
        ))),
        Err(e) => Err(e),
    }
}
