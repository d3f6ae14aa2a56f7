//! Wire types for the trust authority's verify endpoint.
//!
//! Response types tolerate unknown fields and missing optionals: the
//! authority's schema evolves independently of this client.

use chrono::{DateTime, Utc};
use edusign_core::Iin;
use serde::{Deserialize, Serialize};

/// Body POSTed to the verify endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyRequest<'a> {
    /// CMS signature container, base64.
    pub cms: &'a str,
    /// Signed payload, base64.
    pub data: &'a str,
}

/// Raw verify response as returned by the authority.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub iin: Option<String>,
    #[serde(default, alias = "certificateInfo")]
    pub certificate_info: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, alias = "errorCode")]
    pub error_code: Option<String>,
}

/// A signature the authority confirmed, with the signer it reported.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedSigner {
    /// Signer identity taken from the certificate.
    pub signer_iin: Iin,
    /// Opaque certificate metadata. `Value::Null` when the authority sent none.
    pub certificate_info: serde_json::Value,
    /// When this client received the confirmation.
    pub verified_at: DateTime<Utc>,
}

/// Error body shape used by the authority on non-2xx responses:
/// `{"detail": {"error": "..."}}` or `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorEnvelope {
    pub(crate) fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(map) => map
                .get("error")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            _ => None,
        }
    }
}
