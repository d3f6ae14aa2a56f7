//! Verification failure taxonomy.

use edusign_core::ErrorCode;

/// Reasons a signature could not be confirmed by the trust authority.
///
/// Every variant maps to exactly one stable [`ErrorCode`] via [`code()`](Self::code).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// The authority answered and declined the signature, or answered with a
    /// non-success HTTP status.
    #[error("{message}")]
    Rejected {
        /// Code reported by the authority (defaults to `VERIFICATION_FAILED`).
        code: ErrorCode,
        /// Human-readable reason, passed through to the signer.
        message: String,
    },
    /// The authority did not answer within the configured timeout.
    #[error("Превышено время ожидания ответа от сервиса проверки подписи ({elapsed_secs} с)")]
    Timeout {
        /// Configured timeout that elapsed.
        elapsed_secs: u64,
    },
    /// The authority could not be reached.
    #[error("Не удалось подключиться к сервису проверки подписи: {reason}")]
    Connection {
        /// Transport-level reason.
        reason: String,
    },
    /// Anything else: malformed response, missing signer identity, client
    /// construction failure.
    #[error("Неожиданная ошибка при проверке подписи: {reason}")]
    Unexpected {
        /// Diagnostic reason.
        reason: String,
    },
}

impl VerificationError {
    /// Stable machine-readable code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Rejected { code, .. } => *code,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::Connection { .. } => ErrorCode::ConnectionError,
            Self::Unexpected { .. } => ErrorCode::UnexpectedError,
        }
    }

    /// Shorthand for a `VERIFICATION_FAILED` rejection.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            code: ErrorCode::VerificationFailed,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_closed_over_verification_failures() {
        let all = [
            VerificationError::rejected("bad"),
            VerificationError::Timeout { elapsed_secs: 30 },
            VerificationError::Connection { reason: "refused".into() },
            VerificationError::Unexpected { reason: "garbage".into() },
        ];
        for err in &all {
            assert!(err.code().is_verification_failure(), "{err:?}");
        }
        assert_eq!(all[0].code(), ErrorCode::VerificationFailed);
        assert_eq!(all[1].code(), ErrorCode::Timeout);
        assert_eq!(all[2].code(), ErrorCode::ConnectionError);
        assert_eq!(all[3].code(), ErrorCode::UnexpectedError);
    }

    #[test]
    fn rejection_message_is_passed_through() {
        let err = VerificationError::rejected("Сертификат отозван");
        assert_eq!(err.to_string(), "Сертификат отозван");
    }
}
