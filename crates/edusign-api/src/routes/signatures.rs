//! # Signature API
//!
//! Per-record validity for authenticated callers, and the public view a
//! scanned signature QR code links to. Both re-check the stored hash
//! against the current document first.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use edusign_core::{DocumentKind, SignatureRecord};
use edusign_ledger::SignatureLedger;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors;
use crate::state::AppState;

/// Label of a primary contract in the public view.
pub const PRIMARY_LABEL: &str = "Основной договор";
/// Label of an addendum in the public view.
pub const SUPPLEMENTAL_LABEL: &str = "Дополнительный договор";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidityResponse {
    pub success: bool,
    pub signature_uid: String,
    pub contract_num: String,
    pub is_valid: bool,
    pub is_document_modified: bool,
    pub signed_at: DateTime<Utc>,
    pub signer_iin: String,
}

// ── Public verification view ────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerificationStatus {
    /// `valid` or `invalid`.
    pub status: String,
    pub message: String,
    /// `green` or `red`.
    pub color: String,
}

impl VerificationStatus {
    fn new(is_valid: bool, is_document_modified: bool) -> Self {
        let (status, message, color) = match (is_valid, is_document_modified) {
            (true, _) => ("valid", "Подпись действительна", "green"),
            (false, true) => (
                "invalid",
                "Подпись недействительна: документ был изменен после подписания",
                "red",
            ),
            (false, false) => ("invalid", "Подпись недействительна", "red"),
        };
        Self {
            status: status.to_string(),
            message: message.to_string(),
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerificationContractInfo {
    pub student_name: String,
    pub contract_amount: String,
    pub contract_date: String,
    pub contract_status: String,
    pub contract_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dop_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for VerificationContractInfo {
    fn default() -> Self {
        Self {
            student_name: "Информация недоступна".to_string(),
            contract_amount: String::new(),
            contract_date: String::new(),
            contract_status: String::new(),
            contract_type: "Неизвестно".to_string(),
            dop_amount: None,
            description: None,
        }
    }
}

impl VerificationContractInfo {
    /// Contract info for the document `record` covers, or the default when
    /// the contract is no longer known.
    fn for_record(ledger: &SignatureLedger, record: &SignatureRecord) -> Self {
        let Some(contract) = ledger.book().contract(&record.contract_num) else {
            return Self::default();
        };
        let mut info = Self {
            student_name: contract.student.full_name.clone(),
            contract_amount: contract.amount.to_string(),
            contract_date: contract.date.format("%Y-%m-%d").to_string(),
            contract_status: contract.status_ref.to_string(),
            contract_type: PRIMARY_LABEL.to_string(),
            dop_amount: None,
            description: None,
        };
        if record.document_kind == DocumentKind::Supplemental {
            info.contract_type = SUPPLEMENTAL_LABEL.to_string();
            if let Some(addendum) = ledger.book().supplemental(&record.contract_num) {
                info.contract_status = addendum.status_ref.to_string();
                info.dop_amount = Some(addendum.amount.to_string());
                info.description = Some(addendum.description.unwrap_or_default());
            }
        }
        info
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignatureInfo {
    pub signature_uid: String,
    pub contract_num: String,
    pub signer_iin: String,
    /// `director` for institutional records, `parent` otherwise.
    pub signer_type: String,
    pub signed_at: DateTime<Utc>,
    pub is_valid: bool,
    pub is_document_modified: bool,
    pub contract_info: VerificationContractInfo,
    #[schema(value_type = Object)]
    pub certificate_info: serde_json::Value,
    pub verification_status: VerificationStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerificationResponse {
    pub success: bool,
    pub signature_info: SignatureInfo,
}

/// Validity route, behind authentication.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/signatures/:uid/validity", get(signature_validity))
}

/// Public QR verification route.
pub fn public_router() -> Router<AppState> {
    Router::new().route("/v1/signature-verification/:uid", get(verify_signature))
}

/// GET /v1/signatures/{uid}/validity: Current validity of one record.
#[utoipa::path(
    get,
    path = "/v1/signatures/{uid}/validity",
    params(("uid" = String, Path, description = "Signature UUID")),
    responses(
        (status = 200, description = "Signature validity", body = ValidityResponse),
        (status = 400, description = "Malformed signature id", body = crate::error::ErrorBody),
        (status = 404, description = "Signature not found", body = crate::error::ErrorBody),
    ),
    tag = "signatures"
)]
async fn signature_validity(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<ValidityResponse>, AppError> {
    let uid = extractors::signature_uid(&uid)?;
    let view = state.ledger().validity_of(&uid).await?;
    let r = view.record;
    Ok(Json(ValidityResponse {
        success: true,
        signature_uid: r.signature_uid.to_string(),
        contract_num: r.contract_num.to_string(),
        is_valid: r.is_valid,
        is_document_modified: view.is_document_modified,
        signed_at: r.signed_at,
        signer_iin: r.signer_iin.to_string(),
    }))
}

/// GET /v1/signature-verification/{uid}: Public verification view.
#[utoipa::path(
    get,
    path = "/v1/signature-verification/{uid}",
    params(("uid" = String, Path, description = "Signature UUID from the QR code")),
    responses(
        (status = 200, description = "Verification view", body = VerificationResponse),
        (status = 404, description = "Signature not found", body = crate::error::ErrorBody),
    ),
    tag = "signatures"
)]
async fn verify_signature(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<VerificationResponse>, AppError> {
    let uid = extractors::signature_uid(&uid)?;
    let view = state.ledger().validity_of(&uid).await?;
    let contract_info = VerificationContractInfo::for_record(state.ledger(), &view.record);
    let r = view.record;

    Ok(Json(VerificationResponse {
        success: true,
        signature_info: SignatureInfo {
            signature_uid: r.signature_uid.to_string(),
            contract_num: r.contract_num.to_string(),
            signer_iin: r.signer_iin.to_string(),
            signer_type: if r.is_institutional() { "director" } else { "parent" }.to_string(),
            signed_at: r.signed_at,
            is_valid: r.is_valid,
            is_document_modified: view.is_document_modified,
            contract_info,
            certificate_info: r.certificate_info,
            verification_status: VerificationStatus::new(r.is_valid, view.is_document_modified),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_status_messages() {
        let valid = VerificationStatus::new(true, false);
        assert_eq!((valid.status.as_str(), valid.color.as_str()), ("valid", "green"));

        let tampered = VerificationStatus::new(false, true);
        assert_eq!(tampered.status, "invalid");
        assert!(tampered.message.contains("изменен"));

        let invalid = VerificationStatus::new(false, false);
        assert_eq!(invalid.message, "Подпись недействительна");
        assert_eq!(invalid.color, "red");
    }

    #[test]
    fn default_contract_info() {
        let info = VerificationContractInfo::default();
        assert_eq!(info.student_name, "Информация недоступна");
        assert_eq!(info.contract_type, "Неизвестно");
        assert!(info.contract_amount.is_empty());
    }
}
