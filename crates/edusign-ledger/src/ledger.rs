//! # Signature Ledger
//!
//! Append-only record of signature events, the artifact slots they cover and
//! the contract book they reference.
//!
//! ## Lazy invalidation
//!
//! Validity is never pushed. [`SignatureLedger::status_of`] and
//! [`SignatureLedger::validity_of`] recompute the fingerprint of the current
//! stored artifact and flip every valid record whose stored hash no longer
//! matches. The flip is persisted through the sink before it becomes visible
//! and is idempotent: a second read finds nothing left to flip.
//!
//! ## Commit
//!
//! Writes of one contract are serialized by a per-contract
//! `tokio::sync::Mutex`. It is taken only inside [`SignatureLedger::commit`]
//! and the invalidating reads, never across the external verification call.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use edusign_core::{
    document_hash, AggregateStatus, ContractNumber, ContractRecord, DocumentHash, DocumentKind,
    SignatureRecord, SignatureUid, SupplementalContract,
};
use parking_lot::RwLock;

use crate::artifacts::{ArtifactStore, StoredArtifact};
use crate::book::ContractBook;
use crate::changeset::{Changeset, ChangesetSink, NoopSink, UnitOfWork};
use crate::error::LedgerError;

/// Condition checked under the contract lock before a changeset is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitGuard {
    /// Apply unconditionally.
    None,
    /// Fail with [`LedgerError::AlreadySigned`] if a valid, unmodified
    /// signature already covers the document of this kind.
    RejectIfSigned(DocumentKind),
}

/// A record together with its freshly computed modification flag.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordView {
    pub record: SignatureRecord,
    pub is_document_modified: bool,
}

/// All records of a contract and the derived aggregate status.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractSignatures {
    pub contract_num: ContractNumber,
    pub status: AggregateStatus,
    /// Newest first.
    pub records: Vec<RecordView>,
}

impl ContractSignatures {
    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn valid_count(&self) -> usize {
        self.records.iter().filter(|r| r.record.is_valid).count()
    }

    pub fn has_valid(&self) -> bool {
        self.valid_count() > 0
    }

    /// Timestamp of the most recent signature.
    pub fn last_signed(&self) -> Option<DateTime<Utc>> {
        self.records.iter().map(|r| r.record.signed_at).max()
    }
}

#[derive(Debug, Default)]
struct SignatureLog {
    records: Vec<SignatureRecord>,
    by_uid: HashMap<SignatureUid, usize>,
    by_contract: HashMap<ContractNumber, Vec<usize>>,
}

impl SignatureLog {
    /// Append. Returns `false` and ignores the record if the uid is taken.
    fn push(&mut self, record: SignatureRecord) -> bool {
        if self.by_uid.contains_key(&record.signature_uid) {
            return false;
        }
        let idx = self.records.len();
        self.by_uid.insert(record.signature_uid, idx);
        self.by_contract
            .entry(record.contract_num.clone())
            .or_default()
            .push(idx);
        self.records.push(record);
        true
    }

    fn get(&self, uid: &SignatureUid) -> Option<&SignatureRecord> {
        self.by_uid.get(uid).map(|&i| &self.records[i])
    }

    fn for_contract(&self, num: &ContractNumber) -> Vec<SignatureRecord> {
        self.by_contract
            .get(num)
            .map(|idxs| idxs.iter().rev().map(|&i| self.records[i].clone()).collect())
            .unwrap_or_default()
    }

    fn invalidate(&mut self, uid: &SignatureUid) -> bool {
        match self.by_uid.get(uid) {
            Some(&i) if self.records[i].is_valid => {
                self.records[i].is_valid = false;
                true
            }
            _ => false,
        }
    }
}

/// Contract book, artifact slots and signature log behind one commit path.
#[derive(Clone)]
pub struct SignatureLedger {
    book: ContractBook,
    artifacts: ArtifactStore,
    log: Arc<RwLock<SignatureLog>>,
    sink: Arc<dyn ChangesetSink>,
    locks: Arc<parking_lot::Mutex<HashMap<ContractNumber, Arc<tokio::sync::Mutex<()>>>>>,
}

impl std::fmt::Debug for SignatureLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureLedger")
            .field("contracts", &self.book.len())
            .field("signatures", &self.log.read().records.len())
            .field("sink", &self.sink.name())
            .finish()
    }
}

impl Default for SignatureLedger {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl SignatureLedger {
    /// Ledger that writes through `sink`.
    pub fn new(sink: Arc<dyn ChangesetSink>) -> Self {
        Self {
            book: ContractBook::new(),
            artifacts: ArtifactStore::new(),
            log: Arc::new(RwLock::new(SignatureLog::default())),
            sink,
            locks: Arc::new(parking_lot::Mutex::new(HashMap::new())),
        }
    }

    /// Ledger without durable storage.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(NoopSink))
    }

    pub fn book(&self) -> &ContractBook {
        &self.book
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    fn lock_for(&self, num: &ContractNumber) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .entry(num.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    // ── Hydration ───────────────────────────────────────────────────

    /// Load a stored record without going through the sink. Records must be
    /// hydrated oldest first.
    pub fn hydrate_signature(&self, record: SignatureRecord) {
        if !self.log.write().push(record) {
            tracing::warn!("duplicate signature uid skipped during hydration");
        }
    }

    pub fn hydrate_artifact(&self, num: ContractNumber, kind: DocumentKind, artifact: StoredArtifact) {
        self.artifacts.put(num, kind, artifact);
    }

    // ── Contract import ─────────────────────────────────────────────

    /// Persist and publish an externally owned contract view.
    pub async fn import_contract(
        &self,
        contract: ContractRecord,
        supplemental: Option<SupplementalContract>,
    ) -> Result<(), LedgerError> {
        let lock = self.lock_for(&contract.number);
        let _guard = lock.lock().await;

        self.sink
            .persist_contract(&contract, supplemental.as_ref())
            .await?;
        tracing::info!(
            contract_num = %contract.number,
            supplemental = supplemental.is_some(),
            "contract view imported"
        );
        self.book.upsert_contract(contract);
        if let Some(addendum) = supplemental {
            self.book.upsert_supplemental(addendum);
        }
        Ok(())
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Start a unit of work for `num`.
    pub fn begin(&self, num: ContractNumber) -> UnitOfWork {
        UnitOfWork::new(num)
    }

    /// Commit a unit of work.
    ///
    /// Under the contract lock: check `guard`, persist through the sink, then
    /// apply to memory. Any error leaves both durable and in-memory state
    /// untouched.
    pub async fn commit(
        &self,
        uow: UnitOfWork,
        guard: CommitGuard,
    ) -> Result<Changeset, LedgerError> {
        let changeset = uow.into_changeset();
        let num = changeset.contract_num.clone();

        let lock = self.lock_for(&num);
        let _held = lock.lock().await;

        if let CommitGuard::RejectIfSigned(kind) = guard {
            if self.is_signed(&num, kind) {
                tracing::info!(contract_num = %num, kind = %kind, "commit rejected: already signed");
                return Err(LedgerError::AlreadySigned(num));
            }
        }

        if let Err(e) = self.sink.persist(&changeset).await {
            tracing::error!(
                contract_num = %num,
                sink = self.sink.name(),
                error = %e,
                "changeset persistence failed; attempt rolled back"
            );
            return Err(e.into());
        }

        self.apply(&changeset);
        tracing::info!(
            contract_num = %num,
            records = changeset.records.len(),
            artifacts = changeset.artifacts.len(),
            status_changed = changeset.status.is_some(),
            "changeset committed"
        );
        Ok(changeset)
    }

    fn apply(&self, changeset: &Changeset) {
        let num = &changeset.contract_num;
        for (kind, artifact) in &changeset.artifacts {
            self.artifacts.put(num.clone(), *kind, artifact.clone());
        }
        if let Some(change) = changeset.status {
            if !self.book.set_status(num, change.kind, change.status_ref) {
                tracing::warn!(contract_num = %num, kind = %change.kind, "status transition on unknown document");
            }
        }
        let mut log = self.log.write();
        for record in &changeset.records {
            if !log.push(record.clone()) {
                tracing::warn!(signature_uid = %record.signature_uid, "duplicate signature uid not appended");
            }
        }
        for uid in &changeset.invalidations {
            log.invalidate(uid);
        }
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// Fingerprint of the `kind` document of `num` as it is stored now.
    /// `None` if the contract is gone.
    pub fn current_hash(&self, num: &ContractNumber, kind: DocumentKind) -> Option<DocumentHash> {
        let contract = self.book.contract(num)?;
        let artifact = self.artifacts.get(num, kind);
        Some(document_hash(
            &contract.hash_fields(),
            artifact.as_ref().map(|a| &a.bytes[..]),
        ))
    }

    /// Whether a valid record matches the current `kind` document of `num`.
    /// Pure read; no invalidation.
    pub fn is_signed(&self, num: &ContractNumber, kind: DocumentKind) -> bool {
        let Some(current) = self.current_hash(num, kind) else {
            return false;
        };
        self.log
            .read()
            .for_contract(num)
            .iter()
            .any(|r| r.document_kind == kind && r.is_valid && !r.is_document_modified(&current))
    }

    /// Fail with [`LedgerError::AlreadySigned`] if the document is signed.
    pub fn ensure_not_signed(&self, num: &ContractNumber, kind: DocumentKind) -> Result<(), LedgerError> {
        if self.is_signed(num, kind) {
            return Err(LedgerError::AlreadySigned(num.clone()));
        }
        Ok(())
    }

    /// Records of a contract, newest first, without invalidation.
    pub fn list_by_contract(&self, num: &ContractNumber) -> Vec<SignatureRecord> {
        self.log.read().for_contract(num)
    }

    pub fn get(&self, uid: &SignatureUid) -> Option<SignatureRecord> {
        self.log.read().get(uid).cloned()
    }

    /// Number of records for `num`.
    pub fn count(&self, num: &ContractNumber) -> usize {
        self.log.read().by_contract.get(num).map_or(0, Vec::len)
    }

    /// Resolve `num` and return its current artifact.
    pub fn current_artifact(
        &self,
        num: &ContractNumber,
    ) -> Result<(DocumentKind, Option<StoredArtifact>), LedgerError> {
        let resolved = self.book.resolve(num, false)?;
        let kind = resolved.kind();
        Ok((kind, self.artifacts.get(num, kind)))
    }

    /// Records and aggregate status of a contract, after lazy invalidation.
    pub async fn status_of(&self, num: &ContractNumber) -> Result<ContractSignatures, LedgerError> {
        if self.book.contract(num).is_none() {
            return Err(LedgerError::ContractNotFound(num.clone()));
        }

        let lock = self.lock_for(num);
        let _held = lock.lock().await;

        let primary = self.current_hash(num, DocumentKind::Primary);
        let supplemental = self.current_hash(num, DocumentKind::Supplemental);

        let mut views: Vec<RecordView> = self
            .list_by_contract(num)
            .into_iter()
            .map(|record| {
                let current = match record.document_kind {
                    DocumentKind::Primary => primary.as_ref(),
                    DocumentKind::Supplemental => supplemental.as_ref(),
                };
                let is_document_modified = current.map_or(true, |h| record.is_document_modified(h));
                RecordView {
                    record,
                    is_document_modified,
                }
            })
            .collect();

        let flips: Vec<SignatureUid> = views
            .iter()
            .filter(|v| v.record.is_valid && v.is_document_modified)
            .map(|v| v.record.signature_uid)
            .collect();
        self.invalidate(num, &flips).await?;
        for view in views.iter_mut().filter(|v| v.is_document_modified) {
            view.record.is_valid = false;
        }

        let status = AggregateStatus::derive(
            views
                .iter()
                .map(|v| (v.record.is_valid, v.is_document_modified)),
        );

        Ok(ContractSignatures {
            contract_num: num.clone(),
            status,
            records: views,
        })
    }

    /// A single record with its current validity, after lazy invalidation.
    pub async fn validity_of(&self, uid: &SignatureUid) -> Result<RecordView, LedgerError> {
        let num = self
            .get(uid)
            .map(|r| r.contract_num)
            .ok_or(LedgerError::SignatureNotFound(*uid))?;

        let lock = self.lock_for(&num);
        let _held = lock.lock().await;

        let mut record = self.get(uid).ok_or(LedgerError::SignatureNotFound(*uid))?;
        let is_document_modified = self
            .current_hash(&num, record.document_kind)
            .map_or(true, |h| record.is_document_modified(&h));

        if record.is_valid && is_document_modified {
            self.invalidate(&num, &[*uid]).await?;
            record.is_valid = false;
        }

        Ok(RecordView {
            record,
            is_document_modified,
        })
    }

    /// Persist and apply invalidation flips. Caller holds the contract lock.
    async fn invalidate(&self, num: &ContractNumber, uids: &[SignatureUid]) -> Result<(), LedgerError> {
        if uids.is_empty() {
            return Ok(());
        }
        let mut changeset = Changeset::new(num.clone());
        changeset.invalidations = uids.to_vec();
        self.sink.persist(&changeset).await?;
        self.apply(&changeset);
        tracing::warn!(
            contract_num = %num,
            invalidated = uids.len(),
            "document modified after signing; signatures invalidated"
        );
        Ok(())
    }
}
