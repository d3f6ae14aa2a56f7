//! # Contract Book
//!
//! Read-model of the externally owned contracts, keyed by business key.
//! Signature records point here by contract number only; there is no
//! foreign key. Every cross-store reference is validated through
//! [`ContractBook::resolve`] at orchestration time.
//!
//! An addendum shares its primary's contract number. When one exists for a
//! number, that number resolves to the addendum regardless of what the
//! caller asked for.

use edusign_core::{
    ContractFields, ContractNumber, ContractRecord, ContractStatusRef, DocumentKind,
    SupplementalContract,
};

use crate::error::LedgerError;
use crate::store::Store;

/// A contract resolved for signing or verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContract {
    /// The primary contract. Always present: addenda are reached through it.
    pub contract: ContractRecord,
    /// The addendum, when the document in question is supplemental.
    pub supplemental: Option<SupplementalContract>,
}

impl ResolvedContract {
    /// Artifact slot of the resolved document.
    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_supplemental(self.supplemental.is_some())
    }

    /// Business key.
    pub fn number(&self) -> &ContractNumber {
        &self.contract.number
    }

    /// Contract fields covered by the integrity hash at the current status.
    ///
    /// Both document kinds are fingerprinted over the primary contract's
    /// fields; the artifact component distinguishes them.
    pub fn hash_fields(&self) -> ContractFields<'_> {
        self.contract.hash_fields()
    }

    /// The fields as they will read once `signed` status is applied.
    ///
    /// Signing a primary contract moves the primary's status, so its hash is
    /// projected onto the target status. Signing an addendum moves only the
    /// addendum's status, leaving the hashed fields unchanged.
    pub fn hash_fields_after_signing(&self, signed: ContractStatusRef) -> ContractFields<'_> {
        match self.kind() {
            DocumentKind::Primary => self.hash_fields().with_status(signed),
            DocumentKind::Supplemental => self.hash_fields(),
        }
    }

    /// Status reference of the resolved document.
    pub fn status_ref(&self) -> ContractStatusRef {
        self.supplemental
            .as_ref()
            .map(|s| s.status_ref)
            .unwrap_or(self.contract.status_ref)
    }
}

/// Contracts and addenda by contract number.
#[derive(Debug, Clone, Default)]
pub struct ContractBook {
    contracts: Store<ContractNumber, ContractRecord>,
    supplementals: Store<ContractNumber, SupplementalContract>,
}

impl ContractBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a primary contract.
    pub fn upsert_contract(&self, contract: ContractRecord) {
        self.contracts.insert(contract.number.clone(), contract);
    }

    /// Insert or replace the addendum of `addendum.primary_number`.
    pub fn upsert_supplemental(&self, addendum: SupplementalContract) {
        self.supplementals
            .insert(addendum.primary_number.clone(), addendum);
    }

    pub fn contract(&self, number: &ContractNumber) -> Option<ContractRecord> {
        self.contracts.get(number)
    }

    pub fn supplemental(&self, number: &ContractNumber) -> Option<SupplementalContract> {
        self.supplementals.get(number)
    }

    /// Whether an addendum references `number`.
    pub fn has_supplemental(&self, number: &ContractNumber) -> bool {
        self.supplementals.contains(number)
    }

    /// Number of primary contracts.
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Resolve `number`, treating it as supplemental if `requested_supplemental`
    /// or if an addendum exists.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ContractNotFound`] if the primary is missing, or if a
    /// supplemental document was requested and no addendum exists.
    pub fn resolve(
        &self,
        number: &ContractNumber,
        requested_supplemental: bool,
    ) -> Result<ResolvedContract, LedgerError> {
        let contract = self
            .contract(number)
            .ok_or_else(|| LedgerError::ContractNotFound(number.clone()))?;
        let addendum = self.supplemental(number);

        let supplemental = match (requested_supplemental, addendum) {
            (_, Some(addendum)) => Some(addendum),
            (true, None) => return Err(LedgerError::ContractNotFound(number.clone())),
            (false, None) => None,
        };

        Ok(ResolvedContract {
            contract,
            supplemental,
        })
    }

    /// Set the status reference of the `kind` document of `number`.
    /// Returns `false` if the document does not exist.
    pub(crate) fn set_status(
        &self,
        number: &ContractNumber,
        kind: DocumentKind,
        status_ref: ContractStatusRef,
    ) -> bool {
        match kind {
            DocumentKind::Primary => self
                .contracts
                .update(number, |c| c.status_ref = status_ref)
                .is_some(),
            DocumentKind::Supplemental => self
                .supplementals
                .update(number, |s| s.status_ref = status_ref)
                .is_some(),
        }
    }
}
