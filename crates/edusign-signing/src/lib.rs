//! # edusign-signing
//!
//! The signing protocol. [`SigningOrchestrator::sign`] takes a submitted CMS
//! signature through verification, artifact generation, hashing and
//! persistence, then appends the institutional counter-signatures. The whole
//! attempt commits once or not at all.
//!
//! Each attempt records its progress in a [`PhaseLog`] of [`SigningPhase`]
//! transitions, returned with the [`SignOutcome`].

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod payload;
pub mod phase;
pub mod signatories;

pub use config::{ConfigError, SigningConfig, DEFAULT_SIGNED_STATUS_ID};
pub use error::SigningError;
pub use orchestrator::{SignOutcome, SignRequest, SigningOrchestrator, SIGNED_MESSAGE};
pub use payload::{ContractInfo, SigningData};
pub use phase::{PhaseLog, PhaseTransition, SigningPhase};
pub use signatories::CounterSigner;
