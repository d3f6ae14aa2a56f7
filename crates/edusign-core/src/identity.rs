//! # Identifier Newtypes
//!
//! - [`ContractNumber`]: the immutable business key of a contract, owned by
//!   the external contract registry (e.g. `"2024Д-1400"`).
//! - [`SignatureUid`]: globally unique identifier of a signature event.
//! - [`Iin`]: Kazakhstan individual identification number (12 digits).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Business key of a contract.
///
/// Contract numbers come from the external registry and may contain
/// Cyrillic letters. They must be non-empty, at most 64 characters, and free
/// of whitespace and `/` so that they can travel as a URL path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractNumber(String);

impl ContractNumber {
    /// Validate and wrap a contract number.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidContractNumber`] for empty, overlong,
    /// or path-unsafe input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.chars().count() > 64
            || trimmed.chars().any(|c| c.is_whitespace() || c == '/')
        {
            return Err(ValidationError::InvalidContractNumber(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the contract number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContractNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContractNumber> for String {
    fn from(value: ContractNumber) -> Self {
        value.0
    }
}

impl std::fmt::Display for ContractNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier of a signature event. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureUid(Uuid);

impl SignatureUid {
    /// Allocate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID (used when hydrating from storage).
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse from the hyphenated string form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSignatureUid`] if `s` is not a UUID.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ValidationError::InvalidSignatureUid(s.to_string()))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SignatureUid {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SignatureUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kazakhstan individual identification number.
///
/// Exactly 12 ASCII digits. The trust authority returns the signer's IIN
/// from the certificate subject; the auth layer carries the caller's IIN.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iin(String);

impl Iin {
    /// Validate and wrap an IIN.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidIin`] unless the trimmed input is
    /// exactly 12 digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.len() != 12 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidIin(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the IIN digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Iin {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Iin> for String {
    fn from(value: Iin) -> Self {
        value.0
    }
}

impl std::fmt::Display for Iin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_number_accepts_cyrillic() {
        let num = ContractNumber::new("2024Д-1400").unwrap();
        assert_eq!(num.as_str(), "2024Д-1400");
    }

    #[test]
    fn contract_number_trims_and_rejects_unsafe() {
        assert_eq!(ContractNumber::new(" 15-A ").unwrap().as_str(), "15-A");
        assert!(ContractNumber::new("").is_err());
        assert!(ContractNumber::new("   ").is_err());
        assert!(ContractNumber::new("a/b").is_err());
        assert!(ContractNumber::new("a b").is_err());
        assert!(ContractNumber::new("x".repeat(65)).is_err());
    }

    #[test]
    fn contract_number_serde_validates() {
        let ok: ContractNumber = serde_json::from_str("\"2024Д-1400\"").unwrap();
        assert_eq!(ok.to_string(), "2024Д-1400");
        assert!(serde_json::from_str::<ContractNumber>("\"\"").is_err());
    }

    #[test]
    fn iin_requires_twelve_digits() {
        assert!(Iin::new("123456789012").is_ok());
        assert!(Iin::new("12345678901").is_err());
        assert!(Iin::new("1234567890123").is_err());
        assert!(Iin::new("12345678901a").is_err());
    }

    #[test]
    fn signature_uid_round_trips_through_string() {
        let uid = SignatureUid::new();
        let parsed = SignatureUid::parse(&uid.to_string()).unwrap();
        assert_eq!(uid, parsed);
        assert!(SignatureUid::parse("not-a-uuid").is_err());
    }

    #[test]
    fn signature_uids_are_unique() {
        let a = SignatureUid::new();
        let b = SignatureUid::new();
        assert_ne!(a, b);
    }
}
