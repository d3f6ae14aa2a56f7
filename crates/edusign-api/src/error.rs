//! # API Error Types
//!
//! Every failure leaves the service as `{success: false, error, error_code}`
//! with an HTTP status derived from the [`ErrorCode`]. Infrastructure
//! failures are logged here and answered with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use edusign_core::{ErrorCode, ValidationError};
use edusign_ledger::LedgerError;
use edusign_signing::SigningError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Message returned in place of internal error details.
pub const INTERNAL_MESSAGE: &str = "Внутренняя ошибка сервера";

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Human-readable message.
    pub error: String,
    /// Machine-readable code, e.g. `"ALREADY_SIGNED"`.
    pub error_code: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, error_code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            error_code: error_code.into(),
        }
    }
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// A signing or ledger failure with its own [`ErrorCode`].
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// Malformed request: bad JSON, bad path parameter, failed validation.
    #[error("{0}")]
    BadRequest(String),

    /// A resource other than a contract or signature is absent (404).
    #[error("{0}")]
    NotFound(String),

    /// Missing or invalid credentials (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Insufficient role (403).
    #[error("{0}")]
    Forbidden(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("{0}")]
    Internal(String),
}

/// HTTP status of a domain error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::MissingParameters => StatusCode::BAD_REQUEST,
        ErrorCode::ContractNotFound | ErrorCode::SignatureNotFound => StatusCode::NOT_FOUND,
        ErrorCode::AlreadySigned => StatusCode::CONFLICT,
        ErrorCode::VerificationFailed | ErrorCode::Timeout => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::IinMismatch => StatusCode::FORBIDDEN,
        ErrorCode::ConnectionError => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::ProcessingError | ErrorCode::UnexpectedError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Signing(e) => (status_for(e.code()), e.code().as_str()),
            Self::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::MissingParameters.as_str(),
            ),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::ContractNotFound.as_str()),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::ProcessingError.as_str(),
            ),
        }
    }

    fn is_internal(&self) -> bool {
        match self {
            Self::Signing(e) => e.is_internal(),
            Self::Internal(_) => true,
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if self.is_internal() {
            tracing::error!(error = %self, error_code = code, "internal server error");
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody::new(message, code))).into_response()
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        Self::Signing(err.into())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edusign_core::ContractNumber;
    use edusign_ledger::StoreError;
    use edusign_verify::VerificationError;

    fn num() -> ContractNumber {
        ContractNumber::new("2024Д-1400").unwrap()
    }

    #[test]
    fn code_to_status_table() {
        let table = [
            (ErrorCode::MissingParameters, 400),
            (ErrorCode::ContractNotFound, 404),
            (ErrorCode::SignatureNotFound, 404),
            (ErrorCode::AlreadySigned, 409),
            (ErrorCode::VerificationFailed, 422),
            (ErrorCode::Timeout, 422),
            (ErrorCode::IinMismatch, 403),
            (ErrorCode::ConnectionError, 503),
            (ErrorCode::ProcessingError, 500),
            (ErrorCode::UnexpectedError, 500),
        ];
        for (code, status) in table {
            assert_eq!(status_for(code).as_u16(), status, "{code}");
        }
    }

    #[test]
    fn signing_error_keeps_its_code() {
        let err = AppError::from(SigningError::AlreadySigned(num()));
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "ALREADY_SIGNED");
        assert_eq!(err.to_string(), "Контракт уже подписан");
    }

    #[test]
    fn gateway_error_is_not_internal() {
        let err = AppError::from(SigningError::from(VerificationError::Timeout {
            elapsed_secs: 30,
        }));
        assert!(!err.is_internal());
        assert_eq!(err.status_and_code().1, "TIMEOUT");
    }

    #[test]
    fn storage_failure_is_internal() {
        let err = AppError::from(LedgerError::Store(StoreError::Database(
            "connection reset".into(),
        )));
        assert!(err.is_internal());
        assert_eq!(
            err.status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "PROCESSING_ERROR")
        );
    }

    #[test]
    fn validation_error_is_bad_request() {
        let err = AppError::from(ContractNumber::new("").unwrap_err());
        assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn auth_codes() {
        assert_eq!(
            AppError::Unauthorized("x".into()).status_and_code(),
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_and_code(),
            (StatusCode::FORBIDDEN, "FORBIDDEN")
        );
    }

    #[tokio::test]
    async fn internal_details_are_not_returned() {
        use http_body_util::BodyExt;

        let response = AppError::Internal("pool timed out after 5s".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], INTERNAL_MESSAGE);
        assert_eq!(body["error_code"], "PROCESSING_ERROR");
    }
}
