//! # Integrity Hasher
//!
//! Produces the tamper-detection fingerprint stored on every signature
//! record.
//!
//! ## Canonical Input
//!
//! ```text
//! {contract_num}:{amount}:{date}:{student_ref}:{status_ref}[:{sha256_hex(artifact)}]
//! ```
//!
//! `amount` is printed as `major.minor` (two fractional digits) and `date`
//! as ISO `YYYY-MM-DD`. The artifact component is present only when an
//! artifact exists in storage. The fingerprint is the lowercase hex SHA-256
//! of the canonical string.
//!
//! ## Security Invariant
//!
//! The hash recorded at signing time and the hash recomputed during lazy
//! invalidation are produced by the same function over the same
//! [`ContractFields`] view. There is no second formatting path.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::contract::{ContractStatusRef, StudentRef};
use crate::identity::ContractNumber;
use crate::money::Amount;

/// The contract fields covered by the integrity hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractFields<'a> {
    /// Business key.
    pub number: &'a ContractNumber,
    /// Contract amount.
    pub amount: Amount,
    /// Contract date.
    pub date: NaiveDate,
    /// Student reference.
    pub student_ref: StudentRef,
    /// Status reference.
    pub status_ref: ContractStatusRef,
}

impl<'a> ContractFields<'a> {
    /// The same fields with a different status reference.
    ///
    /// Used to fingerprint a document against the status it will carry once
    /// the signing transaction commits.
    pub fn with_status(self, status_ref: ContractStatusRef) -> Self {
        Self { status_ref, ..self }
    }

    /// The canonical colon-separated string, without the artifact component.
    pub fn canonical(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.number,
            self.amount,
            self.date.format("%Y-%m-%d"),
            self.student_ref,
            self.status_ref
        )
    }
}

/// A 64-character lowercase hex SHA-256 fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentHash(String);

impl DocumentHash {
    /// Wrap a stored hex fingerprint (hydration path). Returns `None` unless
    /// `hex` is 64 lowercase hex characters.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let valid = hex.len() == 64
            && hex
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        valid.then(|| Self(hex.to_string()))
    }

    /// The hex fingerprint.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log lines.
    pub fn short(&self) -> &str {
        &self.0[..16]
    }
}

impl std::fmt::Display for DocumentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase hex SHA-256 of arbitrary bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Compute the integrity fingerprint over contract fields and, when present,
/// the bytes of the stored artifact.
pub fn document_hash(fields: &ContractFields<'_>, artifact: Option<&[u8]>) -> DocumentHash {
    let mut canonical = fields.canonical();
    if let Some(bytes) = artifact {
        canonical.push(':');
        canonical.push_str(&sha256_hex(bytes));
    }
    DocumentHash(sha256_hex(canonical.as_bytes()))
}
