//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI 3.1 document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI document for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "EduSign API: Contract Signature Verification",
        version = "0.3.12",
        description = "Signing of school contracts with externally verified CMS signatures, integrity fingerprints over the signed documents, and public QR verification.",
        license(name = "BUSL-1.1")
    ),
    paths(
        crate::routes::contracts::sign_contract,
        crate::routes::contracts::list_signatures,
        crate::routes::contracts::signing_data,
        crate::routes::contracts::summary,
        crate::routes::contracts::download_artifact,
        crate::routes::contracts::import_contract,
        crate::routes::signatures::signature_validity,
        crate::routes::signatures::verify_signature,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::auth::Role,
        crate::routes::contracts::SignContractRequest,
        crate::routes::contracts::SignResponse,
        crate::routes::contracts::SignatureEntry,
        crate::routes::contracts::ContractSignaturesResponse,
        crate::routes::contracts::ContractInfoBody,
        crate::routes::contracts::SigningDataResponse,
        crate::routes::contracts::SummaryContractInfo,
        crate::routes::contracts::SignatureSummary,
        crate::routes::contracts::SummaryResponse,
        crate::routes::contracts::ImportContractRequest,
        crate::routes::contracts::ImportContractResponse,
        crate::routes::signatures::ValidityResponse,
        crate::routes::signatures::VerificationStatus,
        crate::routes::signatures::VerificationContractInfo,
        crate::routes::signatures::SignatureInfo,
        crate::routes::signatures::VerificationResponse,
    )),
    tags(
        (name = "contracts", description = "Contract signing and signature status"),
        (name = "signatures", description = "Signature validity and public verification"),
    )
)]
pub struct ApiDoc;

/// Router serving the OpenAPI document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
