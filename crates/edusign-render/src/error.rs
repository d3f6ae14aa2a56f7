//! Rendering errors. All of them are infrastructure failures from the
//! signer's point of view and surface as `PROCESSING_ERROR`.

use edusign_core::{ErrorCode, ValidationError};

/// Failures while producing a signed artifact.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A QR payload could not be serialized.
    #[error("QR payload serialization failed: {0}")]
    Payload(String),
    /// A QR payload did not fit into a QR symbol.
    #[error("QR encoding failed: {0}")]
    QrEncoding(String),
    /// Contract data could not be turned into document values.
    #[error("invalid contract data: {0}")]
    InvalidContract(#[from] ValidationError),
}

impl RenderError {
    /// Stable machine-readable code for this failure.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::ProcessingError
    }
}
