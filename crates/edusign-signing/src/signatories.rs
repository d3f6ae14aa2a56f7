//! Institutional counter-signatories.
//!
//! After the human signature commits, one record per signatory is appended
//! with the same document hash and no `created_by`. The set and its order
//! (which is also QR slot order) come from YAML: the built-in file below, or
//! `EDUSIGN_COUNTER_SIGNERS_FILE`.

use std::path::Path;

use chrono::{DateTime, Utc};
use edusign_core::{ContractNumber, Iin};
use edusign_render::CounterSignerQrPayload;
use serde::Deserialize;

use crate::config::ConfigError;

const BUILTIN: &str = include_str!("../signatories/default.yaml");

/// One institutional signatory and the signature material stored for it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CounterSigner {
    /// Short name printed next to the QR.
    pub name: String,
    pub position: String,
    pub iin: Iin,
    /// Certificate subject common name.
    pub common_name: String,
    /// Stored certificate metadata, copied onto every counter-signature.
    #[serde(default)]
    pub certificate_info: serde_json::Value,
    /// Stored CMS container.
    pub cms_signature: String,
}

impl CounterSigner {
    /// QR payload for this signatory on `contract_num`.
    pub fn qr_payload(&self, contract_num: ContractNumber, signed_at: DateTime<Utc>) -> CounterSignerQrPayload {
        CounterSignerQrPayload::new(
            &self.name,
            &self.position,
            &self.iin,
            &self.common_name,
            contract_num,
            signed_at,
        )
    }
}

/// The two directors shipped with the service.
pub fn builtin() -> Result<Vec<CounterSigner>, ConfigError> {
    parse(BUILTIN, "<built-in>")
}

/// Read a signatory list from a YAML file.
pub fn load(path: &Path) -> Result<Vec<CounterSigner>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Signatories {
        source_name: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse(&raw, &path.display().to_string())
}

fn parse(raw: &str, source_name: &str) -> Result<Vec<CounterSigner>, ConfigError> {
    serde_yaml::from_str(raw).map_err(|e| ConfigError::Signatories {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })
}
