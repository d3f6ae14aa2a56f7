//! # Unit of Work
//!
//! A signing attempt stages every write into a [`UnitOfWork`]. Nothing is
//! visible to readers until [`SignatureLedger::commit`](crate::SignatureLedger::commit)
//! hands the resulting [`Changeset`] to the [`ChangesetSink`] and then applies
//! it to the in-memory stores. Dropping an uncommitted unit of work discards
//! it, which is the rollback path.

use async_trait::async_trait;
use edusign_core::{
    ContractNumber, ContractRecord, ContractStatusRef, DocumentKind, SignatureRecord,
    SignatureUid, SupplementalContract,
};

use crate::artifacts::StoredArtifact;
use crate::error::StoreError;

/// Status reference change of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub kind: DocumentKind,
    pub status_ref: ContractStatusRef,
}

/// All writes of one committed operation, scoped to a single contract number.
#[derive(Debug, Clone, PartialEq)]
pub struct Changeset {
    pub contract_num: ContractNumber,
    /// Artifact slot replacements.
    pub artifacts: Vec<(DocumentKind, StoredArtifact)>,
    /// Records to append, in append order.
    pub records: Vec<SignatureRecord>,
    pub status: Option<StatusChange>,
    /// Records to flip to invalid.
    pub invalidations: Vec<SignatureUid>,
}

impl Changeset {
    pub fn new(contract_num: ContractNumber) -> Self {
        Self {
            contract_num,
            artifacts: Vec::new(),
            records: Vec::new(),
            status: None,
            invalidations: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
            && self.records.is_empty()
            && self.status.is_none()
            && self.invalidations.is_empty()
    }
}

/// Durable write-through target for committed changes.
///
/// `persist` must be all-or-nothing: on `Err` nothing of the changeset may
/// remain in durable storage.
#[async_trait]
pub trait ChangesetSink: Send + Sync {
    /// Durably write a changeset.
    async fn persist(&self, changeset: &Changeset) -> Result<(), StoreError>;

    /// Durably write an imported contract view and, optionally, its addendum.
    async fn persist_contract(
        &self,
        contract: &ContractRecord,
        supplemental: Option<&SupplementalContract>,
    ) -> Result<(), StoreError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Sink for purely in-memory operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

#[async_trait]
impl ChangesetSink for NoopSink {
    async fn persist(&self, _changeset: &Changeset) -> Result<(), StoreError> {
        Ok(())
    }

    async fn persist_contract(
        &self,
        _contract: &ContractRecord,
        _supplemental: Option<&SupplementalContract>,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Staged, uncommitted writes of one signing attempt.
#[derive(Debug)]
pub struct UnitOfWork {
    changeset: Changeset,
}

impl UnitOfWork {
    pub(crate) fn new(contract_num: ContractNumber) -> Self {
        Self {
            changeset: Changeset::new(contract_num),
        }
    }

    pub fn contract_num(&self) -> &ContractNumber {
        &self.changeset.contract_num
    }

    /// Stage the artifact of a slot, replacing anything staged earlier for it.
    pub fn stage_artifact(&mut self, kind: DocumentKind, artifact: StoredArtifact) {
        self.changeset.artifacts.retain(|(k, _)| *k != kind);
        self.changeset.artifacts.push((kind, artifact));
    }

    /// The artifact staged for `kind`, which is what will be in storage
    /// once this unit of work commits.
    pub fn staged_artifact(&self, kind: DocumentKind) -> Option<&StoredArtifact> {
        self.changeset
            .artifacts
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, a)| a)
    }

    /// Stage a record for append.
    pub fn append(&mut self, record: SignatureRecord) -> &SignatureRecord {
        self.changeset.records.push(record);
        &self.changeset.records[self.changeset.records.len() - 1]
    }

    /// Remove a staged record. Returns `true` if it was staged.
    pub fn discard_record(&mut self, uid: &SignatureUid) -> bool {
        let before = self.changeset.records.len();
        self.changeset.records.retain(|r| &r.signature_uid != uid);
        before != self.changeset.records.len()
    }

    /// Stage the status transition of a document.
    pub fn transition_status(&mut self, kind: DocumentKind, status_ref: ContractStatusRef) {
        self.changeset.status = Some(StatusChange { kind, status_ref });
    }

    pub fn records(&self) -> &[SignatureRecord] {
        &self.changeset.records
    }

    pub fn changeset(&self) -> &Changeset {
        &self.changeset
    }

    pub(crate) fn into_changeset(self) -> Changeset {
        self.changeset
    }
}
