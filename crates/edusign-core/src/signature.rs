//! # Signature Records
//!
//! A [`SignatureRecord`] is one signature event: either the human signer's
//! CMS signature or an automatic institutional counter-signature
//! (`created_by` absent). Records reference their contract by business key
//! only.
//!
//! [`AggregateStatus`] is the derived four-state classification of a
//! contract's signing state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::digest::DocumentHash;
use crate::identity::{ContractNumber, Iin, SignatureUid};

/// Which artifact slot a signature covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// The primary contract document.
    Primary,
    /// The supplemental agreement (addendum) document.
    Supplemental,
}

impl DocumentKind {
    /// Select the kind from the supplemental flag.
    pub fn from_supplemental(is_supplemental: bool) -> Self {
        if is_supplemental {
            Self::Supplemental
        } else {
            Self::Primary
        }
    }

    /// Short machine name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Supplemental => "supplemental",
        }
    }

    /// Parse the short machine name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "primary" => Some(Self::Primary),
            "supplemental" => Some(Self::Supplemental),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One signature event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// Globally unique, immutable identifier.
    pub signature_uid: SignatureUid,
    /// Business-key reference to the contract (not a foreign key).
    pub contract_num: ContractNumber,
    /// Artifact slot this signature covers.
    pub document_kind: DocumentKind,
    /// CMS signature container as submitted (base64).
    pub cms_signature: String,
    /// Signed payload as submitted (base64).
    pub signed_data: String,
    /// Integrity fingerprint of the artifact stored when this record was created.
    pub document_hash: DocumentHash,
    /// Signer identity reported by the trust authority.
    pub signer_iin: Iin,
    /// Opaque certificate metadata reported by the trust authority.
    pub certificate_info: serde_json::Value,
    /// Cleared by lazy invalidation when the artifact no longer matches.
    pub is_valid: bool,
    /// When the signature was recorded.
    pub signed_at: DateTime<Utc>,
    /// When the trust authority verified the signature.
    pub verified_at: DateTime<Utc>,
    /// Identity of the human who submitted the signature. `None` marks an
    /// automatic institutional counter-signature.
    pub created_by: Option<Iin>,
}

impl SignatureRecord {
    /// Whether this is an automatic institutional counter-signature.
    pub fn is_institutional(&self) -> bool {
        self.created_by.is_none()
    }

    /// Whether the stored fingerprint differs from `current`.
    pub fn is_document_modified(&self, current: &DocumentHash) -> bool {
        &self.document_hash != current
    }
}

/// Derived signing state of a contract.
///
/// Precedence, given the records of a contract:
///
/// 1. no records → [`NotSigned`](Self::NotSigned)
/// 2. a valid record whose hash matches the current artifact → [`Signed`](Self::Signed)
/// 3. a record whose hash differs from the current artifact → [`DocumentModified`](Self::DocumentModified)
/// 4. otherwise → [`Invalid`](Self::Invalid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    /// No signature records exist.
    NotSigned,
    /// Records exist but none is valid.
    Invalid,
    /// A signed document was changed after signing.
    DocumentModified,
    /// A valid signature matches the current document.
    Signed,
}

impl AggregateStatus {
    /// Derive the aggregate status from `(is_valid, is_document_modified)`
    /// pairs observed after lazy invalidation.
    pub fn derive(observations: impl IntoIterator<Item = (bool, bool)>) -> Self {
        let mut any = false;
        let mut any_modified = false;
        for (is_valid, is_modified) in observations {
            if is_valid && !is_modified {
                return Self::Signed;
            }
            any = true;
            any_modified |= is_modified;
        }
        match (any, any_modified) {
            (false, _) => Self::NotSigned,
            (true, true) => Self::DocumentModified,
            (true, false) => Self::Invalid,
        }
    }

    /// Short machine name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotSigned => "not_signed",
            Self::Invalid => "invalid",
            Self::DocumentModified => "document_modified",
            Self::Signed => "signed",
        }
    }
}

impl std::fmt::Display for AggregateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_not_signed() {
        assert_eq!(AggregateStatus::derive([]), AggregateStatus::NotSigned);
    }

    #[test]
    fn valid_matching_record_wins() {
        let obs = [(false, true), (true, false), (false, false)];
        assert_eq!(AggregateStatus::derive(obs), AggregateStatus::Signed);
    }

    #[test]
    fn modified_records_read_as_document_modified() {
        // Freshly flipped (was valid) and already-flipped records both count.
        assert_eq!(AggregateStatus::derive([(true, true)]), AggregateStatus::DocumentModified);
        assert_eq!(
            AggregateStatus::derive([(false, true), (false, false)]),
            AggregateStatus::DocumentModified
        );
    }

    #[test]
    fn invalid_without_modification() {
        assert_eq!(AggregateStatus::derive([(false, false)]), AggregateStatus::Invalid);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(AggregateStatus::DocumentModified).unwrap(),
            serde_json::json!("document_modified")
        );
        assert_eq!(AggregateStatus::NotSigned.to_string(), "not_signed");
    }

    #[test]
    fn document_kind_names() {
        assert_eq!(DocumentKind::from_supplemental(true), DocumentKind::Supplemental);
        assert_eq!(DocumentKind::from_name("primary"), Some(DocumentKind::Primary));
        assert_eq!(DocumentKind::from_name("other"), None);
    }
}
