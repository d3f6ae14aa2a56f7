//! # edusign-api: Axum API Service for Contract Signing
//!
//! HTTP surface over the [`SigningOrchestrator`](edusign_signing::SigningOrchestrator)
//! and its [`SignatureLedger`](edusign_ledger::SignatureLedger).
//!
//! ## API Surface
//!
//! | Path                                   | Module                   | Auth   |
//! |----------------------------------------|--------------------------|--------|
//! | `/v1/contracts/*`                      | [`routes::contracts`]    | bearer |
//! | `/v1/signatures/{uid}/validity`        | [`routes::signatures`]   | bearer |
//! | `/v1/signature-verification/{uid}`     | [`routes::signatures`]   | public |
//! | `/health/*`, `/openapi.json`           | this module, [`openapi`] | public |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → BodyLimit → Handler
//! ```

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Signed CMS blobs are a few KiB; contract views are smaller still.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes, the OpenAPI document and the QR verification view are
/// mounted outside the auth middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::contracts::router())
        .merge(routes::signatures::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .with_state(state.clone());

    // Unauthenticated routes.
    let public = Router::new()
        .merge(routes::signatures::public_router())
        .merge(openapi::router())
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Router::new().merge(public).merge(api)
}

/// Liveness probe. Always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe, 503 while a configured database is unreachable.
async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!(error = %e, "readiness check failed");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unavailable");
        }
    }
    (StatusCode::OK, "ready")
}
