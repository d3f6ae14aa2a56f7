//! # Database Persistence Layer
//!
//! Postgres persistence for the signature ledger via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, every
//! committed changeset and contract import is written through [`PgSink`]
//! before it becomes visible in memory, and the ledger is hydrated from the
//! tables on startup. When absent, the API runs in-memory only.
//!
//! ## What is persisted
//!
//! - Imported contract and addendum views (`contracts`, `supplemental_contracts`)
//! - The current rendered document per slot (`contract_artifacts`)
//! - The signature log (`contract_signatures`)

pub mod artifacts;
pub mod contracts;
pub mod signatures;

use async_trait::async_trait;
use edusign_core::{ContractRecord, SupplementalContract};
use edusign_ledger::{Changeset, ChangesetSink, StoreError};
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set, running in-memory only mode. \
                 Signatures will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Changeset sink that writes each changeset in one Postgres transaction.
#[derive(Debug, Clone)]
pub struct PgSink {
    pool: PgPool,
}

impl PgSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

#[async_trait]
impl ChangesetSink for PgSink {
    async fn persist(&self, changeset: &Changeset) -> Result<(), StoreError> {
        if changeset.is_empty() {
            return Ok(());
        }
        let num = &changeset.contract_num;
        // Dropping `tx` without commit rolls the whole changeset back.
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        for (kind, artifact) in &changeset.artifacts {
            artifacts::upsert(&mut tx, num, *kind, artifact)
                .await
                .map_err(db_err)?;
        }
        for record in &changeset.records {
            signatures::insert(&mut tx, record).await.map_err(db_err)?;
        }
        if let Some(change) = changeset.status {
            let updated = contracts::update_status(&mut tx, num, change.kind, change.status_ref)
                .await
                .map_err(db_err)?;
            if !updated {
                return Err(StoreError::Database(format!(
                    "no {} document row for contract {num}",
                    change.kind
                )));
            }
        }
        for uid in &changeset.invalidations {
            signatures::invalidate(&mut tx, uid).await.map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)
    }

    async fn persist_contract(
        &self,
        contract: &ContractRecord,
        supplemental: Option<&SupplementalContract>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        contracts::upsert_contract(&mut tx, contract)
            .await
            .map_err(db_err)?;
        if let Some(addendum) = supplemental {
            contracts::upsert_supplemental(&mut tx, addendum)
                .await
                .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)
    }

    fn name(&self) -> &str {
        "postgres"
    }
}
