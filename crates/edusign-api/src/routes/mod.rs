//! # API Route Modules
//!
//! - `contracts`: signing, signature listing, signing-data, summary,
//!   artifact download and admin import of contract views.
//! - `signatures`: per-record validity, and the public QR verification
//!   view mounted outside authentication.

pub mod contracts;
pub mod signatures;
