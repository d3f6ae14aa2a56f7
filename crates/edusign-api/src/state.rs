//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! Everything stateful lives behind the [`SigningOrchestrator`]: its
//! ledger holds the contract book, artifact slots and signature log, and
//! writes through a [`PgSink`] when a database pool is configured.

use std::sync::Arc;

use edusign_ledger::{ChangesetSink, NoopSink, SignatureLedger};
use edusign_signing::{SigningConfig, SigningOrchestrator};
use edusign_verify::SignatureVerifier;
use sqlx::PgPool;

use crate::auth::SecretToken;
use crate::db::PgSink;

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token` to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Bearer secret. If `None`, authentication is disabled.
    pub auth_token: Option<SecretToken>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
        }
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub signing: SigningOrchestrator,
    pub db_pool: Option<PgPool>,
    pub config: AppConfig,
}

impl AppState {
    /// In-memory state over `verifier` with the built-in signing
    /// configuration. Used by tests and local development.
    pub fn new(verifier: Arc<dyn SignatureVerifier>) -> Result<Self, edusign_signing::ConfigError> {
        Ok(Self::with_parts(
            verifier,
            SigningConfig::builtin()?,
            AppConfig::default(),
            None,
        ))
    }

    /// Assemble state from its parts. With a pool, the ledger writes
    /// through Postgres; without one it is memory only.
    pub fn with_parts(
        verifier: Arc<dyn SignatureVerifier>,
        signing_config: SigningConfig,
        config: AppConfig,
        db_pool: Option<PgPool>,
    ) -> Self {
        let sink: Arc<dyn ChangesetSink> = match &db_pool {
            Some(pool) => Arc::new(PgSink::new(pool.clone())),
            None => Arc::new(NoopSink),
        };
        let ledger = SignatureLedger::new(sink);
        Self {
            signing: SigningOrchestrator::new(verifier, ledger, signing_config),
            db_pool,
            config,
        }
    }

    pub fn ledger(&self) -> &SignatureLedger {
        self.signing.ledger()
    }

    /// Hydrate the ledger from the database.
    ///
    /// Called once on startup when a database pool is available. Contracts
    /// load before signatures so that the first status query can already
    /// compare stored hashes against current documents.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };
        let ledger = self.ledger();

        let contracts = crate::db::contracts::load_all(pool)
            .await
            .map_err(|e| format!("failed to load contracts: {e}"))?;
        let contract_count = contracts.len();
        for contract in contracts {
            ledger.book().upsert_contract(contract);
        }

        let addenda = crate::db::contracts::load_all_supplemental(pool)
            .await
            .map_err(|e| format!("failed to load supplemental contracts: {e}"))?;
        let addendum_count = addenda.len();
        for addendum in addenda {
            ledger.book().upsert_supplemental(addendum);
        }

        let artifacts = crate::db::artifacts::load_all(pool)
            .await
            .map_err(|e| format!("failed to load artifacts: {e}"))?;
        let artifact_count = artifacts.len();
        for (num, kind, artifact) in artifacts {
            ledger.hydrate_artifact(num, kind, artifact);
        }

        let records = crate::db::signatures::load_all(pool)
            .await
            .map_err(|e| format!("failed to load signatures: {e}"))?;
        let signature_count = records.len();
        for record in records {
            ledger.hydrate_signature(record);
        }

        tracing::info!(
            contracts = contract_count,
            supplemental_contracts = addendum_count,
            artifacts = artifact_count,
            signatures = signature_count,
            "Hydrated ledger from database"
        );

        Ok(())
    }
}
