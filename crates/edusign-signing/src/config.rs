//! Signing orchestrator configuration.

use std::path::PathBuf;

use edusign_core::ContractStatusRef;
use edusign_render::RenderConfig;

use crate::signatories::{self, CounterSigner};

/// Default status reference meaning "Подписан".
pub const DEFAULT_SIGNED_STATUS_ID: i64 = 2;

/// Settings of one signing service instance.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    /// Renderer settings; `render.frontend_url` is also the base of the
    /// signer QR verification link.
    pub render: RenderConfig,
    /// Status reference a document moves to when signed.
    pub signed_status: ContractStatusRef,
    /// Institutional counter-signatories, in QR slot order.
    pub counter_signers: Vec<CounterSigner>,
}

impl SigningConfig {
    /// Built-in defaults: local frontend, status 2, nine installments and the
    /// shipped directors.
    pub fn builtin() -> Result<Self, ConfigError> {
        Ok(Self {
            render: RenderConfig::default(),
            signed_status: ContractStatusRef(DEFAULT_SIGNED_STATUS_ID),
            counter_signers: signatories::builtin()?,
        })
    }

    /// Load from environment variables.
    ///
    /// Variables:
    /// - `EDUSIGN_FRONTEND_URL` (default: `http://localhost:3000`)
    /// - `EDUSIGN_SIGNED_STATUS_ID` (default: 2)
    /// - `EDUSIGN_INSTALLMENTS` (default: 9)
    /// - `EDUSIGN_COUNTER_SIGNERS_FILE` (default: built-in directors)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::builtin()?;

        if let Ok(url) = std::env::var("EDUSIGN_FRONTEND_URL") {
            if !url.trim().is_empty() {
                config.render.frontend_url = url.trim().trim_end_matches('/').to_string();
            }
        }
        if let Ok(raw) = std::env::var("EDUSIGN_SIGNED_STATUS_ID") {
            config.signed_status = ContractStatusRef(parse_positive("EDUSIGN_SIGNED_STATUS_ID", &raw)?);
        }
        if let Ok(raw) = std::env::var("EDUSIGN_INSTALLMENTS") {
            let n = parse_positive("EDUSIGN_INSTALLMENTS", &raw)?;
            config.render.installments = u32::try_from(n).map_err(|_| ConfigError::InvalidNumber {
                var: "EDUSIGN_INSTALLMENTS".to_string(),
                value: raw.clone(),
            })?;
        }
        if let Ok(path) = std::env::var("EDUSIGN_COUNTER_SIGNERS_FILE") {
            let path = PathBuf::from(path);
            config.counter_signers = signatories::load(&path)?;
            tracing::info!(
                path = %path.display(),
                count = config.counter_signers.len(),
                "loaded counter-signatories"
            );
        }

        Ok(config)
    }

    pub fn frontend_url(&self) -> &str {
        &self.render.frontend_url
    }

    pub fn with_frontend_url(mut self, url: impl Into<String>) -> Self {
        self.render.frontend_url = url.into();
        self
    }

    pub fn with_counter_signers(mut self, signers: Vec<CounterSigner>) -> Self {
        self.counter_signers = signers;
        self
    }
}

fn parse_positive(var: &str, raw: &str) -> Result<i64, ConfigError> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            var: var.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got \"{value}\"")]
    InvalidNumber { var: String, value: String },

    #[error("failed to load counter-signatories from {source_name}: {reason}")]
    Signatories { source_name: String, reason: String },
}
