//! # Error Taxonomy
//!
//! [`ErrorCode`] is the closed set of machine-readable codes returned to
//! callers. Crate-specific `thiserror` enums elsewhere in the workspace carry
//! diagnostic context and expose a `code()` accessor that lands here.
//!
//! [`ValidationError`] covers domain primitives that fail format checks at
//! construction time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable, machine-readable failure code carried by every error response.
///
/// The serialized form (`SCREAMING_SNAKE_CASE`) is part of the public
/// contract with frontends and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No primary or supplemental contract exists for the business key.
    ContractNotFound,
    /// A valid, unmodified signature already exists for the document.
    AlreadySigned,
    /// The trust authority rejected the signature as invalid or untrusted.
    VerificationFailed,
    /// The trust authority did not answer within the configured timeout.
    Timeout,
    /// The trust authority could not be reached.
    ConnectionError,
    /// The verified signer identity differs from the caller's identity.
    IinMismatch,
    /// No signature record exists for the identifier.
    SignatureNotFound,
    /// Infrastructure failure inside the signing transaction.
    ProcessingError,
    /// Unclassified failure at the trust boundary.
    UnexpectedError,
    /// Required request parameters were absent or malformed.
    MissingParameters,
}

impl ErrorCode {
    /// The canonical wire string of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContractNotFound => "CONTRACT_NOT_FOUND",
            Self::AlreadySigned => "ALREADY_SIGNED",
            Self::VerificationFailed => "VERIFICATION_FAILED",
            Self::Timeout => "TIMEOUT",
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::IinMismatch => "IIN_MISMATCH",
            Self::SignatureNotFound => "SIGNATURE_NOT_FOUND",
            Self::ProcessingError => "PROCESSING_ERROR",
            Self::UnexpectedError => "UNEXPECTED_ERROR",
            Self::MissingParameters => "MISSING_PARAMETERS",
        }
    }

    /// Parse a wire string. Returns `None` for codes outside the taxonomy.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CONTRACT_NOT_FOUND" => Some(Self::ContractNotFound),
            "ALREADY_SIGNED" => Some(Self::AlreadySigned),
            "VERIFICATION_FAILED" => Some(Self::VerificationFailed),
            "TIMEOUT" => Some(Self::Timeout),
            "CONNECTION_ERROR" => Some(Self::ConnectionError),
            "IIN_MISMATCH" => Some(Self::IinMismatch),
            "SIGNATURE_NOT_FOUND" => Some(Self::SignatureNotFound),
            "PROCESSING_ERROR" => Some(Self::ProcessingError),
            "UNEXPECTED_ERROR" => Some(Self::UnexpectedError),
            "MISSING_PARAMETERS" => Some(Self::MissingParameters),
            _ => None,
        }
    }

    /// Whether this code originates at the trust boundary (verification
    /// gateway). Such failures are user-facing and never retried.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::VerificationFailed | Self::Timeout | Self::ConnectionError | Self::UnexpectedError
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain primitive validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Contract number is empty or contains path/whitespace characters.
    #[error("invalid contract number: \"{0}\"")]
    InvalidContractNumber(String),

    /// IIN is not a 12-digit Kazakhstan individual identification number.
    #[error("invalid IIN: \"{0}\" (expected 12 digits)")]
    InvalidIin(String),

    /// Signature identifier is not a UUID.
    #[error("invalid signature identifier: \"{0}\"")]
    InvalidSignatureUid(String),

    /// Discount percentage outside 0..=100.
    #[error("invalid discount percentage: {0} (expected 0..=100)")]
    InvalidDiscount(u32),
}
