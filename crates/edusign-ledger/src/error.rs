//! Ledger and persistence errors.

use edusign_core::{ContractNumber, ErrorCode, SignatureUid};

/// Durable storage failures reported by a [`ChangesetSink`](crate::ChangesetSink).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing database rejected or failed the write.
    #[error("database error: {0}")]
    Database(String),
}

/// Ledger operation failures.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("contract {0} not found")]
    ContractNotFound(ContractNumber),

    #[error("signature {0} not found")]
    SignatureNotFound(SignatureUid),

    /// A valid signature over the current document already exists.
    #[error("contract {0} is already signed")]
    AlreadySigned(ContractNumber),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Stable machine-readable code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ContractNotFound(_) => ErrorCode::ContractNotFound,
            Self::SignatureNotFound(_) => ErrorCode::SignatureNotFound,
            Self::AlreadySigned(_) => ErrorCode::AlreadySigned,
            Self::Store(_) => ErrorCode::ProcessingError,
        }
    }
}
