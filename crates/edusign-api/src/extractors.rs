//! # Extractors & Validation
//!
//! JSON body extraction with uniform `MISSING_PARAMETERS` rejections, and
//! parsing of path identifiers into domain keys.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use edusign_core::{ContractNumber, SignatureUid};

use crate::error::AppError;

/// Request types with business rules beyond what serde checks.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and run its [`Validate`] rules.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::BadRequest)?;
    Ok(value)
}

pub fn contract_num(raw: &str) -> Result<ContractNumber, AppError> {
    Ok(ContractNumber::new(raw)?)
}

pub fn signature_uid(raw: &str) -> Result<SignatureUid, AppError> {
    Ok(SignatureUid::parse(raw.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_num_rejects_blank() {
        assert!(matches!(contract_num("  "), Err(AppError::BadRequest(_))));
        assert_eq!(contract_num("2024Д-1400").unwrap().as_str(), "2024Д-1400");
    }

    #[test]
    fn malformed_uid_is_bad_request() {
        assert!(matches!(signature_uid("not-a-uuid"), Err(AppError::BadRequest(_))));
        assert!(signature_uid("6f1c2d3e-4b5a-4c6d-8e7f-001122334455").is_ok());
    }

    #[derive(Debug)]
    struct Body {
        n: i32,
    }

    impl Validate for Body {
        fn validate(&self) -> Result<(), String> {
            if self.n > 0 {
                Ok(())
            } else {
                Err("n must be positive".into())
            }
        }
    }

    #[test]
    fn validation_failure_is_bad_request() {
        let err = extract_validated_json(Ok(Json(Body { n: 0 }))).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(m) if m.contains("positive")));
        assert_eq!(extract_validated_json(Ok(Json(Body { n: 3 }))).unwrap().n, 3);
    }
}
