//! # Contract API
//!
//! Signing, signature listing, signing-data, summary, artifact download and
//! admin import of contract views. Listing and summary run lazy
//! invalidation before answering.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use edusign_core::{ContractRecord, DocumentKind, SupplementalContract};
use edusign_ledger::{ContractSignatures, RecordView};
use edusign_signing::{ContractInfo, SignRequest, SigningData, SIGNED_MESSAGE};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::{self, extract_json, extract_validated_json, Validate};
use crate::state::AppState;

// ── Signing ─────────────────────────────────────────────────────────────────

/// Submitted signature material.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SignContractRequest {
    #[serde(default)]
    pub contract_num: String,
    /// Base64 CMS signature produced by the signer.
    #[serde(default)]
    pub cms: String,
    /// Base64 of the exact payload that was signed.
    #[serde(default)]
    pub data: String,
    /// Ask for the addendum. Auto-detected when an addendum exists.
    #[serde(default)]
    pub is_dop_contract: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignResponse {
    pub success: bool,
    pub signature_uid: String,
    pub signer_iin: String,
    pub contract_num: String,
    /// `primary` or `supplemental`.
    pub document_kind: String,
    pub document_hash: String,
    /// Institutional records appended alongside the signer's.
    pub counter_signatures: Vec<String>,
    pub message: String,
}

// ── Listing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignatureEntry {
    pub signature_uid: String,
    pub signer_iin: String,
    pub signed_at: DateTime<Utc>,
    pub is_valid: bool,
    #[schema(value_type = Object)]
    pub certificate_info: serde_json::Value,
    pub is_document_modified: bool,
    pub document_kind: String,
}

impl From<&RecordView> for SignatureEntry {
    fn from(view: &RecordView) -> Self {
        let r = &view.record;
        Self {
            signature_uid: r.signature_uid.to_string(),
            signer_iin: r.signer_iin.to_string(),
            signed_at: r.signed_at,
            is_valid: r.is_valid,
            certificate_info: r.certificate_info.clone(),
            is_document_modified: view.is_document_modified,
            document_kind: r.document_kind.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContractSignaturesResponse {
    pub success: bool,
    pub contract_num: String,
    /// `not_signed`, `invalid`, `document_modified` or `signed`.
    pub signature_status: String,
    pub signatures: Vec<SignatureEntry>,
    pub total_signatures: usize,
    pub valid_signatures: usize,
}

impl From<&ContractSignatures> for ContractSignaturesResponse {
    fn from(s: &ContractSignatures) -> Self {
        Self {
            success: true,
            contract_num: s.contract_num.to_string(),
            signature_status: s.status.as_str().to_string(),
            signatures: s.records.iter().map(SignatureEntry::from).collect(),
            total_signatures: s.total(),
            valid_signatures: s.valid_count(),
        }
    }
}

// ── Signing data ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContractInfoBody {
    pub contract_num: String,
    pub contract_amount: String,
    pub contract_date: String,
    pub student_name: String,
    pub is_dop_contract: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dop_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<ContractInfo> for ContractInfoBody {
    fn from(info: ContractInfo) -> Self {
        Self {
            contract_num: info.contract_num.to_string(),
            contract_amount: info.contract_amount,
            contract_date: info.contract_date,
            student_name: info.student_name,
            is_dop_contract: info.is_dop_contract,
            contract_type: info.contract_type.map(str::to_string),
            dop_amount: info.dop_amount,
            description: info.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SigningDataResponse {
    pub success: bool,
    pub contract_num: String,
    /// Payload to sign, base64.
    pub data: String,
    /// Hex SHA-256 of the raw payload.
    pub hash: String,
    pub contract_info: ContractInfoBody,
    pub is_dop_contract: bool,
}

impl From<SigningData> for SigningDataResponse {
    fn from(d: SigningData) -> Self {
        Self {
            success: true,
            contract_num: d.contract_num.to_string(),
            data: d.data,
            hash: d.hash,
            contract_info: d.contract_info.into(),
            is_dop_contract: d.is_dop_contract,
        }
    }
}

// ── Summary ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryContractInfo {
    pub student_name: String,
    pub contract_amount: String,
    pub contract_date: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignatureSummary {
    pub total_signatures: usize,
    pub valid_signatures: usize,
    pub status: String,
    pub last_signed: Option<DateTime<Utc>>,
    pub has_valid_signatures: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    pub success: bool,
    pub contract_num: String,
    pub contract_info: SummaryContractInfo,
    pub signature_summary: SignatureSummary,
}

// ── Import ──────────────────────────────────────────────────────────────────

/// Contract view pushed by the school registry.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ImportContractRequest {
    #[schema(value_type = Object)]
    pub contract: ContractRecord,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub supplemental: Option<SupplementalContract>,
}

impl Validate for ImportContractRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(addendum) = &self.supplemental {
            if addendum.primary_number != self.contract.number {
                return Err(format!(
                    "supplemental.primary_number '{}' does not match contract number '{}'",
                    addendum.primary_number, self.contract.number
                ));
            }
        }
        if self.contract.discounts.iter().any(|p| *p > 100) {
            return Err("discount percentages must not exceed 100".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImportContractResponse {
    pub success: bool,
    pub contract_num: String,
    pub has_supplemental: bool,
}

/// Build the contracts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/contracts/sign", post(sign_contract))
        .route("/v1/contracts/:num", put(import_contract))
        .route("/v1/contracts/:num/signatures", get(list_signatures))
        .route("/v1/contracts/:num/signing-data", get(signing_data))
        .route("/v1/contracts/:num/summary", get(summary))
        .route("/v1/contracts/:num/artifact", get(download_artifact))
}

/// POST /v1/contracts/sign: Verify and record a signature.
#[utoipa::path(
    post,
    path = "/v1/contracts/sign",
    request_body = SignContractRequest,
    responses(
        (status = 200, description = "Signature verified and recorded", body = SignResponse),
        (status = 400, description = "Missing or malformed parameters", body = crate::error::ErrorBody),
        (status = 403, description = "Signer IIN does not match the caller", body = crate::error::ErrorBody),
        (status = 404, description = "Contract not found", body = crate::error::ErrorBody),
        (status = 409, description = "Already signed", body = crate::error::ErrorBody),
        (status = 422, description = "Signature rejected", body = crate::error::ErrorBody),
        (status = 503, description = "Trust authority unreachable", body = crate::error::ErrorBody),
    ),
    tag = "contracts"
)]
async fn sign_contract(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<SignContractRequest>, JsonRejection>,
) -> Result<Json<SignResponse>, AppError> {
    let req = extract_json(body)?;
    let request = SignRequest {
        contract_num: req.contract_num,
        cms: req.cms,
        data: req.data,
        is_dop_contract: req.is_dop_contract,
    };
    let outcome = state.signing.sign(&request, caller.iin.as_ref()).await?;

    Ok(Json(SignResponse {
        success: true,
        signature_uid: outcome.signature_uid.to_string(),
        signer_iin: outcome.signer_iin.to_string(),
        contract_num: outcome.contract_num.to_string(),
        document_kind: outcome.kind.as_str().to_string(),
        document_hash: outcome.document_hash.as_str().to_string(),
        counter_signatures: outcome
            .counter_signatures
            .iter()
            .map(ToString::to_string)
            .collect(),
        message: SIGNED_MESSAGE.to_string(),
    }))
}

/// GET /v1/contracts/{num}/signatures: Records and aggregate status.
#[utoipa::path(
    get,
    path = "/v1/contracts/{num}/signatures",
    params(("num" = String, Path, description = "Contract number")),
    responses(
        (status = 200, description = "Signature records", body = ContractSignaturesResponse),
        (status = 404, description = "Contract not found", body = crate::error::ErrorBody),
    ),
    tag = "contracts"
)]
async fn list_signatures(
    State(state): State<AppState>,
    Path(num): Path<String>,
) -> Result<Json<ContractSignaturesResponse>, AppError> {
    let num = extractors::contract_num(&num)?;
    let signatures = state.ledger().status_of(&num).await?;
    Ok(Json(ContractSignaturesResponse::from(&signatures)))
}

/// GET /v1/contracts/{num}/signing-data: Payload for the external signer.
#[utoipa::path(
    get,
    path = "/v1/contracts/{num}/signing-data",
    params(("num" = String, Path, description = "Contract number")),
    responses(
        (status = 200, description = "Signing payload", body = SigningDataResponse),
        (status = 404, description = "Contract not found", body = crate::error::ErrorBody),
    ),
    tag = "contracts"
)]
async fn signing_data(
    State(state): State<AppState>,
    Path(num): Path<String>,
) -> Result<Json<SigningDataResponse>, AppError> {
    let num = extractors::contract_num(&num)?;
    let data = state.signing.signing_data(&num)?;
    Ok(Json(data.into()))
}

/// GET /v1/contracts/{num}/summary: Contract info and signature summary.
#[utoipa::path(
    get,
    path = "/v1/contracts/{num}/summary",
    params(("num" = String, Path, description = "Contract number")),
    responses(
        (status = 200, description = "Signature summary", body = SummaryResponse),
        (status = 404, description = "Contract not found", body = crate::error::ErrorBody),
    ),
    tag = "contracts"
)]
async fn summary(
    State(state): State<AppState>,
    Path(num): Path<String>,
) -> Result<Json<SummaryResponse>, AppError> {
    let num = extractors::contract_num(&num)?;
    let signatures = state.ledger().status_of(&num).await?;
    let info = ContractInfo::for_contract(&state.signing.resolve(&num, false)?);

    Ok(Json(SummaryResponse {
        success: true,
        contract_num: num.to_string(),
        contract_info: SummaryContractInfo {
            student_name: info.student_name,
            contract_amount: info.contract_amount,
            contract_date: info.contract_date,
        },
        signature_summary: SignatureSummary {
            total_signatures: signatures.total(),
            valid_signatures: signatures.valid_count(),
            status: signatures.status.as_str().to_string(),
            last_signed: signatures.last_signed(),
            has_valid_signatures: signatures.has_valid(),
        },
    }))
}

/// GET /v1/contracts/{num}/artifact: Current rendered document.
#[utoipa::path(
    get,
    path = "/v1/contracts/{num}/artifact",
    params(("num" = String, Path, description = "Contract number")),
    responses(
        (status = 200, description = "Rendered document", content_type = "text/html", body = String),
        (status = 404, description = "Contract or document not found", body = crate::error::ErrorBody),
    ),
    tag = "contracts"
)]
async fn download_artifact(
    State(state): State<AppState>,
    Path(num): Path<String>,
) -> Result<Response, AppError> {
    let num = extractors::contract_num(&num)?;
    let (kind, artifact) = state.ledger().current_artifact(&num)?;
    let artifact = artifact.ok_or_else(|| {
        AppError::NotFound(format!("Документ для контракта {num} ещё не сформирован"))
    })?;

    let headers = [
        (header::CONTENT_TYPE, artifact.content_type.clone()),
        (header::ETAG, format!("\"{}\"", artifact.sha256_hex())),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}.html\"", file_stem(kind)),
        ),
    ];
    Ok((headers, artifact.bytes.to_vec()).into_response())
}

fn file_stem(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Primary => "contract",
        DocumentKind::Supplemental => "supplemental_contract",
    }
}

/// PUT /v1/contracts/{num}: Import a contract view (admin).
#[utoipa::path(
    put,
    path = "/v1/contracts/{num}",
    params(("num" = String, Path, description = "Contract number")),
    request_body = ImportContractRequest,
    responses(
        (status = 200, description = "Contract view stored", body = ImportContractResponse),
        (status = 400, description = "Malformed contract view", body = crate::error::ErrorBody),
        (status = 403, description = "Admin role required", body = crate::error::ErrorBody),
    ),
    tag = "contracts"
)]
async fn import_contract(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(num): Path<String>,
    body: Result<Json<ImportContractRequest>, JsonRejection>,
) -> Result<Json<ImportContractResponse>, AppError> {
    require_role(&caller, Role::Admin)?;
    let num = extractors::contract_num(&num)?;
    let req = extract_validated_json(body)?;
    if req.contract.number != num {
        return Err(AppError::BadRequest(format!(
            "contract.number '{}' does not match path '{num}'",
            req.contract.number
        )));
    }

    let has_supplemental = req.supplemental.is_some();
    state
        .ledger()
        .import_contract(req.contract, req.supplemental)
        .await?;

    Ok(Json(ImportContractResponse {
        success: true,
        contract_num: num.to_string(),
        has_supplemental,
    }))
}
