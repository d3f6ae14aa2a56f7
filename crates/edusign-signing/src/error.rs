//! Signing failures.
//!
//! Display strings of user-facing variants are the messages returned to the
//! signer. Infrastructure variants carry diagnostics for logs and surface as
//! `PROCESSING_ERROR`.

use edusign_core::{ContractNumber, ErrorCode, Iin, SignatureUid};
use edusign_ledger::{LedgerError, StoreError};
use edusign_render::RenderError;
use edusign_verify::VerificationError;

use crate::phase::SigningPhase;

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// A required request field is absent or empty.
    #[error("Отсутствует обязательный параметр: {0}")]
    MissingParameter(&'static str),

    /// A request field is present but malformed.
    #[error("Некорректный параметр {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("Контракт не найден")]
    ContractNotFound(ContractNumber),

    #[error("Дополнительный договор не найден")]
    SupplementalNotFound(ContractNumber),

    #[error("Подпись не найдена")]
    SignatureNotFound(SignatureUid),

    #[error("Контракт уже подписан")]
    AlreadySigned(ContractNumber),

    /// The trust authority declined or could not be reached.
    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("ИИН подписанта не совпадает с ИИН пользователя")]
    IinMismatch { caller: Iin, signer: Iin },

    #[error("document rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    #[error("invalid signing phase transition {from} -> {to}")]
    Phase { from: SigningPhase, to: SigningPhase },
}

impl SigningError {
    /// Stable machine-readable code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingParameter(_) | Self::InvalidParameter { .. } => ErrorCode::MissingParameters,
            Self::ContractNotFound(_) | Self::SupplementalNotFound(_) => ErrorCode::ContractNotFound,
            Self::SignatureNotFound(_) => ErrorCode::SignatureNotFound,
            Self::AlreadySigned(_) => ErrorCode::AlreadySigned,
            Self::Verification(e) => e.code(),
            Self::IinMismatch { .. } => ErrorCode::IinMismatch,
            Self::Render(_) | Self::Storage(_) | Self::Phase { .. } => ErrorCode::ProcessingError,
        }
    }

    /// Whether this is an infrastructure failure whose details stay in logs.
    pub fn is_internal(&self) -> bool {
        self.code() == ErrorCode::ProcessingError
    }
}

impl From<LedgerError> for SigningError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::ContractNotFound(num) => Self::ContractNotFound(num),
            LedgerError::SignatureNotFound(uid) => Self::SignatureNotFound(uid),
            LedgerError::AlreadySigned(num) => Self::AlreadySigned(num),
            LedgerError::Store(e) => Self::Storage(e),
        }
    }
}

impl From<(SigningPhase, SigningPhase)> for SigningError {
    fn from((from, to): (SigningPhase, SigningPhase)) -> Self {
        Self::Phase { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_errors_keep_their_codes() {
        let num = ContractNumber::new("A-1").unwrap();
        let e: SigningError = LedgerError::AlreadySigned(num.clone()).into();
        assert_eq!(e.code(), ErrorCode::AlreadySigned);
        assert_eq!(e.to_string(), "Контракт уже подписан");

        let e: SigningError = LedgerError::Store(StoreError::Database("boom".into())).into();
        assert_eq!(e.code(), ErrorCode::ProcessingError);
        assert!(e.is_internal());
    }

    #[test]
    fn verification_code_passes_through() {
        let e: SigningError = VerificationError::Timeout { elapsed_secs: 30 }.into();
        assert_eq!(e.code(), ErrorCode::Timeout);
        assert!(!e.is_internal());
    }

    #[test]
    fn request_validation_maps_to_missing_parameters() {
        assert_eq!(
            SigningError::MissingParameter("cms").code(),
            ErrorCode::MissingParameters
        );
        let e = SigningError::InvalidParameter {
            field: "data",
            reason: "not base64".into(),
        };
        assert_eq!(e.code(), ErrorCode::MissingParameters);
        assert!(e.to_string().contains("data"));
    }

    #[test]
    fn supplemental_not_found_message() {
        let e = SigningError::SupplementalNotFound(ContractNumber::new("A-1").unwrap());
        assert_eq!(e.code(), ErrorCode::ContractNotFound);
        assert_eq!(e.to_string(), "Дополнительный договор не найден");
    }
}
