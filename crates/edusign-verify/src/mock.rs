//! In-process [`SignatureVerifier`] double.
//!
//! Used by the signing orchestrator tests and by the API server when no
//! trust authority is configured for local development.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use edusign_core::{ErrorCode, Iin};
use parking_lot::Mutex;

use crate::error::VerificationError;
use crate::types::VerifiedSigner;
use crate::SignatureVerifier;

#[derive(Debug, Clone)]
enum Behaviour {
    Accept {
        iin: Iin,
        certificate_info: serde_json::Value,
    },
    Fail(VerificationError),
}

/// Scripted verifier: always accepts as a fixed signer, or always fails.
#[derive(Debug)]
pub struct MockVerifier {
    behaviour: Mutex<Behaviour>,
    calls: AtomicUsize,
}

impl MockVerifier {
    /// Accept every signature as signed by `iin`.
    pub fn accepting(iin: Iin) -> Self {
        Self::with(Behaviour::Accept {
            iin,
            certificate_info: serde_json::json!({"subject": {"source": "mock"}}),
        })
    }

    /// Fail every call with `error`.
    pub fn failing(error: VerificationError) -> Self {
        Self::with(Behaviour::Fail(error))
    }

    /// Decline every signature with the given code.
    pub fn rejecting(code: ErrorCode) -> Self {
        Self::failing(VerificationError::Rejected {
            code,
            message: format!("mock verifier declined with {code}"),
        })
    }

    fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour: Mutex::new(behaviour),
            calls: AtomicUsize::new(0),
        }
    }

    /// Switch to accepting as `iin` from the next call on.
    pub fn set_accepting(&self, iin: Iin) {
        *self.behaviour.lock() = Behaviour::Accept {
            iin,
            certificate_info: serde_json::json!({"subject": {"source": "mock"}}),
        };
    }

    /// Number of `verify` calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignatureVerifier for MockVerifier {
    async fn verify(
        &self,
        _cms_signature: &str,
        _signed_data: &str,
    ) -> Result<VerifiedSigner, VerificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behaviour = self.behaviour.lock().clone();
        match behaviour {
            Behaviour::Accept {
                iin,
                certificate_info,
            } => Ok(VerifiedSigner {
                signer_iin: iin,
                certificate_info,
                verified_at: Utc::now(),
            }),
            Behaviour::Fail(err) => Err(err),
        }
    }

    fn adapter_name(&self) -> &str {
        "mock"
    }
}
