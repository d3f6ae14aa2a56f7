#![deny(missing_docs)]

//! # edusign-core: Foundational Types for Contract Signing
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies, only `serde`, `serde_json`,
//! `thiserror`, `chrono`, `uuid`, and `sha2` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** A [`ContractNumber`] is not
//!    a [`SignatureUid`] is not an [`Iin`]. Business keys are validated once,
//!    at the boundary.
//!
//! 2. **[`document_hash`] is the sole path to a tamper fingerprint.** The
//!    signing path and every lazy-invalidation read go through the same
//!    function over the same [`ContractFields`] view.
//!
//! 3. **Single [`ErrorCode`] taxonomy.** Every user-facing failure in the
//!    workspace maps to exactly one stable, machine-readable code.
//!
//! 4. **Money is integral.** [`Amount`] stores minor units (tiyn) so that
//!    hashing and table rendering never depend on float formatting.

pub mod contract;
pub mod digest;
pub mod error;
pub mod identity;
pub mod money;
pub mod signature;

pub use contract::{
    ContractRecord, ContractStatusRef, Installment, LanguageTrack, ParentInfo, PaymentSchedule,
    SchoolDirection, StudentInfo, StudentRef, SupplementalContract,
};
pub use digest::{document_hash, sha256_hex, ContractFields, DocumentHash};
pub use error::{ErrorCode, ValidationError};
pub use identity::{ContractNumber, Iin, SignatureUid};
pub use money::Amount;
pub use signature::{AggregateStatus, DocumentKind, SignatureRecord};
