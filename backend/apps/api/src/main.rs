//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use catalog::{PgCatalogRepository, catalog_router};
use identity::presentation::middleware::{AuthLayerState, authenticate};
use identity::{
    IdentityConfig, MailConfig, PgIdentityRepository, RelayNotifier, TokenService, identity_router,
};
use platform::mailer::MailerConfig;
use sqlx::postgres::PgPoolOptions;
use std::env;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,identity=info,catalog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup step: ensure the STUDENT/TEACHER role rows exist.
    // Idempotent and guarded; roles are never mutated at runtime afterwards.
    let identity_store = PgIdentityRepository::new(pool.clone());
    identity_store
        .seed_roles()
        .await
        .map_err(|e| anyhow::anyhow!("Role seeding failed: {e}"))?;

    // Identity configuration
    let identity_config = if cfg!(debug_assertions) {
        IdentityConfig::development()
    } else {
        // In production, load the signing secret from environment
        let secret_b64 = env::var("TOKEN_SECRET").context("TOKEN_SECRET must be set in production")?;
        let secret_bytes = Engine::decode(&general_purpose::STANDARD, &secret_b64)?;
        anyhow::ensure!(
            secret_bytes.len() == 32,
            "TOKEN_SECRET must decode to exactly 32 bytes"
        );
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&secret_bytes);
        IdentityConfig {
            token_secret: secret,
            ..IdentityConfig::default()
        }
    };

    let tokens = Arc::new(TokenService::new(
        identity_config.token_secret,
        identity_config.token_ttl,
    ));

    // Mail relay configuration
    let relay_endpoint = env::var("MAIL_RELAY_URL")
        .unwrap_or_else(|_| "http://localhost:8025/api/v1/send".to_string());
    let mut relay = MailerConfig::new(relay_endpoint);
    if let Ok(timeout_ms) = env::var("MAIL_RELAY_TIMEOUT_MS") {
        relay.timeout = Duration::from_millis(timeout_ms.parse()?);
    }
    if let Ok(token) = env::var("MAIL_RELAY_TOKEN") {
        relay = relay.with_api_token(token);
    }

    let mail_config = MailConfig {
        relay,
        from_address: env::var("MAIL_FROM")
            .unwrap_or_else(|_| "noreply@elearning.local".to_string()),
        frontend_url: env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:5173".to_string()),
    };

    let notifier =
        RelayNotifier::new(mail_config).map_err(|e| anyhow::anyhow!("Mail client setup: {e}"))?;

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Per-request authentication: populates the principal, never rejects
    let auth_state = AuthLayerState {
        tokens: tokens.clone(),
    };

    let catalog_store = PgCatalogRepository::new(pool.clone());

    // Build router
    let app = Router::new()
        .nest(
            "/api/auth",
            identity_router(identity_store, notifier, tokens, identity_config),
        )
        .nest("/api", catalog_router(catalog_store))
        .layer(axum::middleware::from_fn_with_state(auth_state, authenticate))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port: u16 = env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
