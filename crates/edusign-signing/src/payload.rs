//! Signing-data payload handed to the external signer, and validation of
//! submitted signature material.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use edusign_core::{sha256_hex, ContractNumber, DocumentKind};
use edusign_ledger::ResolvedContract;
use serde::Serialize;

use crate::error::SigningError;

/// Label of a supplemental contract in `contract_info`.
pub const SUPPLEMENTAL_LABEL: &str = "Дополнительный договор";

/// Contract summary shown next to the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractInfo {
    pub contract_num: ContractNumber,
    /// Decimal amount, empty when zero.
    pub contract_amount: String,
    /// ISO date.
    pub contract_date: String,
    pub student_name: String,
    pub is_dop_contract: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dop_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ContractInfo {
    pub fn for_contract(resolved: &ResolvedContract) -> Self {
        let contract = &resolved.contract;
        let supplemental = resolved.supplemental.as_ref();
        Self {
            contract_num: contract.number.clone(),
            contract_amount: non_zero(contract.amount),
            contract_date: contract.date.format("%Y-%m-%d").to_string(),
            student_name: contract.student.full_name.clone(),
            is_dop_contract: supplemental.is_some(),
            contract_type: supplemental.map(|_| SUPPLEMENTAL_LABEL),
            dop_amount: supplemental.map(|s| non_zero(s.amount)),
            description: supplemental.map(|s| s.description.clone().unwrap_or_default()),
        }
    }
}

fn non_zero(amount: edusign_core::Amount) -> String {
    if amount.is_zero() {
        String::new()
    } else {
        amount.to_string()
    }
}

/// What the external signer must sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningData {
    pub contract_num: ContractNumber,
    /// Payload, base64.
    pub data: String,
    /// Lowercase hex SHA-256 of the raw payload.
    pub hash: String,
    pub contract_info: ContractInfo,
    pub is_dop_contract: bool,
}

impl SigningData {
    /// Build the payload for the resolved document at its current status.
    pub fn for_contract(resolved: &ResolvedContract) -> Self {
        let payload = canonical_payload(resolved);
        Self {
            contract_num: resolved.contract.number.clone(),
            data: STANDARD.encode(payload.as_bytes()),
            hash: sha256_hex(payload.as_bytes()),
            contract_info: ContractInfo::for_contract(resolved),
            is_dop_contract: resolved.kind() == DocumentKind::Supplemental,
        }
    }
}

/// `CONTRACT_SIGN:{DOP_CONTRACT|MAIN_CONTRACT}:{num}:{amount}:{date}:{student}:{status}`
pub fn canonical_payload(resolved: &ResolvedContract) -> String {
    let kind = match resolved.kind() {
        DocumentKind::Primary => "MAIN_CONTRACT",
        DocumentKind::Supplemental => "DOP_CONTRACT",
    };
    let c = &resolved.contract;
    format!(
        "CONTRACT_SIGN:{kind}:{}:{}:{}:{}:{}",
        c.number,
        c.amount,
        c.date.format("%Y-%m-%d"),
        c.student_ref,
        c.status_ref
    )
}

/// Reject empty fields and `data` that is not valid base64.
pub fn validate_material(cms: &str, data: &str) -> Result<(), SigningError> {
    if cms.trim().is_empty() {
        return Err(SigningError::MissingParameter("cms"));
    }
    if data.trim().is_empty() {
        return Err(SigningError::MissingParameter("data"));
    }
    STANDARD
        .decode(data.trim())
        .map_err(|e| SigningError::InvalidParameter {
            field: "data",
            reason: format!("ожидается base64 ({e})"),
        })?;
    Ok(())
}
