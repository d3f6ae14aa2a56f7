//! # edusign-render -- Signed Contract Artifact Rendering
//!
//! Produces the self-contained HTML artifact that is stored, fingerprinted
//! and signed. Rendering is pure: this crate never touches storage. The
//! caller stages the returned [`RenderedArtifact`] in the ledger's unit of
//! work, and the integrity hash is always computed over those staged bytes.
//!
//! ## Pipeline
//!
//! 1. [`templates::select`] picks a [`TemplateId`] from the decision table.
//! 2. The template body and the payment-schedule section are spliced into the
//!    shared layout.
//! 3. [`placeholders`] substitutes `{Token}` placeholders: contract data,
//!    parties, amounts in digits and words, legal texts, schedule tables.
//! 4. QR slots receive inline SVG encoded by [`qr`].
//!
//! Re-rendering the same contract is not byte-identical: QR payloads carry
//! timestamps.

pub mod calendar;
pub mod error;
pub mod placeholders;
pub mod qr;
pub mod renderer;
pub mod schedule;
pub mod templates;
pub mod words;

pub use error::RenderError;
pub use qr::{CounterSignerQrPayload, SignatureQrPayload, SignedDataQrPayload};
pub use renderer::{ContractView, DocumentRenderer, RenderConfig, RenderedArtifact};
pub use templates::{TemplateId, TemplateKey};

/// Languages a contract prints in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    Russian,
    Kazakh,
    English,
}
