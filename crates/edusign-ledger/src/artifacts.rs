//! Artifact slots: exactly one current document per contract number and
//! document kind. Each regeneration overwrites the slot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use edusign_core::{sha256_hex, ContractNumber, DocumentKind};

use crate::store::Store;

/// Stored bytes of a rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub content_type: String,
    /// Template that produced the document.
    pub template: String,
    pub bytes: Arc<[u8]>,
    pub updated_at: DateTime<Utc>,
}

impl StoredArtifact {
    pub fn new(
        content_type: impl Into<String>,
        template: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            template: template.into(),
            bytes: bytes.into(),
            updated_at,
        }
    }

    /// Hex SHA-256 of the bytes, for logs and download ETags.
    pub fn sha256_hex(&self) -> String {
        sha256_hex(&self.bytes)
    }
}

/// Key of an artifact slot.
pub type ArtifactKey = (ContractNumber, DocumentKind);

/// The committed artifact slots.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    slots: Store<ArtifactKey, StoredArtifact>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current artifact of a slot.
    pub fn get(&self, number: &ContractNumber, kind: DocumentKind) -> Option<StoredArtifact> {
        self.slots.get(&(number.clone(), kind))
    }

    /// Replace the artifact of a slot. Returns the previous artifact.
    pub fn put(
        &self,
        number: ContractNumber,
        kind: DocumentKind,
        artifact: StoredArtifact,
    ) -> Option<StoredArtifact> {
        self.slots.insert((number, kind), artifact)
    }

    /// Overwrite the bytes of an existing slot in place, as an out-of-band
    /// edit would. Returns `false` if the slot is empty.
    pub fn overwrite_bytes(
        &self,
        number: &ContractNumber,
        kind: DocumentKind,
        bytes: impl Into<Arc<[u8]>>,
    ) -> bool {
        let bytes = bytes.into();
        self.slots
            .update(&(number.clone(), kind), |a| {
                a.bytes = bytes;
                a.updated_at = Utc::now();
            })
            .is_some()
    }
}
