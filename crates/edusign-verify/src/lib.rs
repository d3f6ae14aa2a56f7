//! # edusign-verify -- Signature Verification Gateway
//!
//! Typed client for the external trust authority that validates CMS
//! signatures against the national PKI. This crate performs **no** local
//! cryptography: it forwards `{cms, data}` over HTTPS and classifies the
//! outcome.
//!
//! ## Failure Taxonomy
//!
//! Every call resolves to a [`VerifiedSigner`] or exactly one
//! [`VerificationError`], whose [`code()`](VerificationError::code) is one of
//! `TIMEOUT`, `CONNECTION_ERROR`, `VERIFICATION_FAILED`, `UNEXPECTED_ERROR`.
//! Unavailability of the authority degrades to a declined signing, never a
//! panic.
//!
//! ## No Retries
//!
//! Unlike the idempotent reads elsewhere in the platform, verification is
//! never retried: a rejected or timed-out signature must be resubmitted by
//! the signer with fresh signature material.

pub mod config;
pub mod error;
pub mod gateway;
pub mod mock;
pub mod types;

pub use config::{ConfigError, VerifyConfig};
pub use error::VerificationError;
pub use gateway::HttpVerificationGateway;
pub use mock::MockVerifier;
pub use types::{VerificationOutcome, VerifiedSigner, VerifyRequest};

use async_trait::async_trait;

/// Verifies a CMS signature over a payload at the trust boundary.
///
/// Object-safe so the signing orchestrator can hold `Arc<dyn SignatureVerifier>`
/// and be driven by the HTTP gateway in production or a double in tests.
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    /// Verify `cms_signature` over `signed_data` (both base64 as submitted).
    async fn verify(
        &self,
        cms_signature: &str,
        signed_data: &str,
    ) -> Result<VerifiedSigner, VerificationError>;

    /// Human-readable name of this implementation, for logs.
    fn adapter_name(&self) -> &str;
}
