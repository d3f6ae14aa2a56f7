//! # edusign-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for contract signing.
//! Binds to configurable port (default 8080).

use std::sync::Arc;

use anyhow::Context;
use edusign_api::auth::SecretToken;
use edusign_api::state::{AppConfig, AppState};
use edusign_signing::SigningConfig;
use edusign_verify::{HttpVerificationGateway, VerifyConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let auth_token = std::env::var("AUTH_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty())
        .map(SecretToken::new);
    if auth_token.is_none() {
        tracing::warn!("AUTH_TOKEN not set, authentication disabled");
    }
    let config = AppConfig { port, auth_token };

    let verify_config = VerifyConfig::from_env().context("invalid verification gateway config")?;
    tracing::info!(url = %verify_config.verify_url, "verification gateway configured");
    let verifier = HttpVerificationGateway::new(verify_config)
        .context("failed to build verification gateway client")?;

    let signing_config = SigningConfig::from_env().context("invalid signing config")?;
    tracing::info!(
        frontend_url = signing_config.frontend_url(),
        counter_signers = signing_config.counter_signers.len(),
        signed_status = %signing_config.signed_status,
        "signing configured"
    );

    // Optional: absent means in-memory only.
    let db_pool = edusign_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let state = AppState::with_parts(Arc::new(verifier), signing_config, config, db_pool);
    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("Database hydration failed: {e}");
        anyhow::anyhow!(e)
    })?;

    let app = edusign_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("EduSign API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `EDUSIGN_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("EDUSIGN_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
