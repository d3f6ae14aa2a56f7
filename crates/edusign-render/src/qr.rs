//! QR payload generator.
//!
//! Payloads are serialized to JSON (field order as declared) and encoded at
//! error-correction level L into an inline SVG fragment.

use chrono::{DateTime, Utc};
use edusign_core::{ContractNumber, Iin, SignatureUid};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use serde::Serialize;

use crate::error::RenderError;

/// Side length in pixels of every rendered QR image.
const QR_DIMENSION: u32 = 144;

/// Prompt printed into the signer QR payload.
pub const SIGNER_QR_MESSAGE: &str = "Сканируйте для проверки подписи контракта";

/// Signer QR: points at the public verification view of one signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignatureQrPayload {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub version: &'static str,
    pub signature_uid: SignatureUid,
    pub contract_num: ContractNumber,
    pub signer_iin: Iin,
    pub signed_at: DateTime<Utc>,
    pub verification_url: String,
    pub message: &'static str,
}

impl SignatureQrPayload {
    /// Build the payload for a signature identifier allocated ahead of
    /// rendering.
    pub fn new(
        frontend_url: &str,
        signature_uid: SignatureUid,
        contract_num: ContractNumber,
        signer_iin: Iin,
        signed_at: DateTime<Utc>,
    ) -> Self {
        let verification_url = format!(
            "{}/signature-verification/{}",
            frontend_url.trim_end_matches('/'),
            signature_uid
        );
        Self {
            kind: "contract_signature",
            version: "1.0",
            signature_uid,
            contract_num,
            signer_iin,
            signed_at,
            verification_url,
            message: SIGNER_QR_MESSAGE,
        }
    }
}

/// Certificate summary embedded in a counter-signer QR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterSignerCertificate {
    pub serial_number: String,
    pub common_name: String,
}

/// Counter-signer QR: one institutional signatory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterSignerQrPayload {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub director: String,
    pub position: String,
    pub contract_num: ContractNumber,
    pub signed_at: DateTime<Utc>,
    pub certificate_info: CounterSignerCertificate,
}

impl CounterSignerQrPayload {
    /// Build the payload for signatory `director` holding `iin`.
    pub fn new(
        director: impl Into<String>,
        position: impl Into<String>,
        iin: &Iin,
        common_name: impl Into<String>,
        contract_num: ContractNumber,
        signed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: "director_signature",
            director: director.into(),
            position: position.into(),
            contract_num,
            signed_at,
            certificate_info: CounterSignerCertificate {
                serial_number: format!("IIN{iin}"),
                common_name: common_name.into(),
            },
        }
    }
}

/// Signed-data QR: points at the contract's signature list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedDataQrPayload {
    pub contract_num: ContractNumber,
    /// `YYYY-MM-DD HH:MM:SS`, UTC.
    pub signed_date: String,
    pub status: &'static str,
    pub verification_url: String,
}

impl SignedDataQrPayload {
    /// Build the payload for `contract_num` as of `at`.
    pub fn new(frontend_url: &str, contract_num: ContractNumber, at: DateTime<Utc>) -> Self {
        let verification_url = format!(
            "{}/contracts/{}/signatures",
            frontend_url.trim_end_matches('/'),
            contract_num
        );
        Self {
            contract_num,
            signed_date: at.format("%Y-%m-%d %H:%M:%S").to_string(),
            status: "Подписан",
            verification_url,
        }
    }
}

/// Encode any payload as JSON into an inline `<svg>` element.
pub fn encode_svg<T: Serialize>(payload: &T) -> Result<String, RenderError> {
    let json = serde_json::to_string(payload).map_err(|e| RenderError::Payload(e.to_string()))?;
    let code = QrCode::with_error_correction_level(json.as_bytes(), EcLevel::L)
        .map_err(|e| RenderError::QrEncoding(e.to_string()))?;
    let image = code
        .render()
        .min_dimensions(QR_DIMENSION, QR_DIMENSION)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();
    Ok(strip_xml_declaration(&image).to_string())
}

/// The SVG renderer emits a standalone XML prolog that is invalid inside HTML.
fn strip_xml_declaration(svg: &str) -> &str {
    if svg.starts_with("<?xml") {
        if let Some(end) = svg.find("?>") {
            return svg[end + 2..].trim_start();
        }
    }
    svg
}
