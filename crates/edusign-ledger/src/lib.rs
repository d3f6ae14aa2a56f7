//! # edusign-ledger
//!
//! State side of the signing subsystem:
//!
//! - [`ContractBook`]: read-model of externally owned contracts and addenda,
//!   resolved by business key.
//! - [`ArtifactStore`]: one current rendered document per contract number
//!   and [`DocumentKind`](edusign_core::DocumentKind).
//! - [`SignatureLedger`]: the append-only signature log with lazy
//!   invalidation, and the single commit path for all of the above.
//!
//! Writes are staged in a [`UnitOfWork`] and become visible only through
//! [`SignatureLedger::commit`], which writes through a [`ChangesetSink`]
//! before touching memory.

pub mod artifacts;
pub mod book;
pub mod changeset;
pub mod error;
pub mod ledger;
pub mod store;

pub use artifacts::{ArtifactStore, StoredArtifact};
pub use book::{ContractBook, ResolvedContract};
pub use changeset::{Changeset, ChangesetSink, NoopSink, StatusChange, UnitOfWork};
pub use error::{LedgerError, StoreError};
pub use ledger::{CommitGuard, ContractSignatures, RecordView, SignatureLedger};
pub use store::Store;
