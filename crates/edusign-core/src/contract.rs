//! # Contract View
//!
//! Read-model of the contracts owned by the external school registry. This
//! subsystem never creates or edits contracts; it only resolves them by
//! [`ContractNumber`] and mutates the status reference when a signature is
//! accepted.
//!
//! Registry labels (Russian strings such as `"Оплата по месячно"`) are parsed
//! into closed enums at import time so that template selection is an
//! exhaustive `match` rather than string comparison.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::digest::ContractFields;
use crate::identity::ContractNumber;
use crate::money::Amount;

/// Student reference in the external registry (surrogate key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentRef(pub i64);

impl std::fmt::Display for StudentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contract status reference in the external registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractStatusRef(pub i64);

impl std::fmt::Display for ContractStatusRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How tuition is paid over the academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSchedule {
    /// Nine monthly installments.
    Monthly,
    /// Installments grouped by quarter.
    Quarterly,
    /// Single annual payment.
    Yearly,
}

impl PaymentSchedule {
    /// Parse a registry payment-type label. Unknown labels read as yearly.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Оплата по месячно" => Self::Monthly,
            "Оплата по квартально" => Self::Quarterly,
            _ => Self::Yearly,
        }
    }

    /// Short machine name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

/// Language of instruction of the school department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageTrack {
    /// Kazakh-language department.
    Kazakh,
    /// Russian-language (default) department.
    Russian,
}

impl LanguageTrack {
    /// Parse a registry school-language label.
    pub fn from_label(label: &str) -> Self {
        if label.trim() == "Казахское отделение" {
            Self::Kazakh
        } else {
            Self::Russian
        }
    }

    /// Short machine name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kazakh => "kazakh",
            Self::Russian => "russian",
        }
    }
}

/// Academic direction of the school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolDirection {
    /// Cambridge programme.
    Cambridge,
    /// Linguistic school.
    Linguistic,
    /// Physics and mathematics school.
    Physmath,
    /// American school, Advanced Placement.
    AdvancedPlacement,
    /// IT school on Kekilbayuly street.
    ItSchool,
    /// General school; anything not listed above.
    General,
}

impl SchoolDirection {
    /// Parse a registry school-direction label.
    ///
    /// Both historical spellings of the physics-math label are accepted.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Кембридж" => Self::Cambridge,
            "Лингвинистический" => Self::Linguistic,
            "Физико-математический" | "Физико-Математическая" => Self::Physmath,
            "Американская школа Advanced Placement" => Self::AdvancedPlacement,
            "IT-школа на Кекилбайулы" => Self::ItSchool,
            _ => Self::General,
        }
    }

    /// Short machine name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cambridge => "cambridge",
            Self::Linguistic => "linguistic",
            Self::Physmath => "physmath",
            Self::AdvancedPlacement => "advanced_placement",
            Self::ItSchool => "it_school",
            Self::General => "general",
        }
    }
}

/// One row of the installment plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    /// Scheduled payment date, if the registry has one.
    pub pay_date: Option<NaiveDate>,
    /// Quarter index the installment belongs to (1-based).
    pub quarter: u8,
}

/// Student party data used for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentInfo {
    /// Full name.
    pub full_name: String,
    /// Student IIN as recorded by the registry (not validated).
    #[serde(default)]
    pub iin: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

/// Parent (payer) party data used for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentInfo {
    /// Full name.
    pub full_name: String,
    /// Parent IIN as recorded by the registry (not validated).
    #[serde(default)]
    pub iin: Option<String>,
    /// Residential address.
    #[serde(default)]
    pub address: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Identity document number.
    #[serde(default)]
    pub document_number: Option<String>,
    /// Issuing authority of the identity document.
    #[serde(default)]
    pub issued_by: Option<String>,
    /// Issue date of the identity document, as printed.
    #[serde(default)]
    pub issue_date: Option<String>,
}

/// A primary contract as seen by the signing subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRecord {
    /// Business key.
    pub number: ContractNumber,
    /// Contract amount before discounts.
    pub amount: Amount,
    /// Contract date.
    pub date: NaiveDate,
    /// Student reference.
    pub student_ref: StudentRef,
    /// Current status reference. The only field this subsystem mutates.
    pub status_ref: ContractStatusRef,
    /// Payment schedule.
    pub payment_schedule: PaymentSchedule,
    /// School language track.
    pub language_track: LanguageTrack,
    /// School direction.
    pub direction: SchoolDirection,
    /// Academic year label, e.g. `"2024-2025"`.
    #[serde(default)]
    pub edu_year: Option<String>,
    /// Total contract sum (registry `ContractSum`).
    #[serde(default)]
    pub contract_sum: Option<Amount>,
    /// Entrance contribution (registry `ContSum`).
    #[serde(default)]
    pub contribution: Option<Amount>,
    /// Discount percentages, applied in order.
    #[serde(default)]
    pub discounts: Vec<u32>,
    /// Installment plan rows.
    #[serde(default)]
    pub installments: Vec<Installment>,
    /// Student party.
    pub student: StudentInfo,
    /// Parent party.
    pub parent: ParentInfo,
}

impl ContractRecord {
    /// The fields covered by the integrity hash, at the current status.
    pub fn hash_fields(&self) -> ContractFields<'_> {
        ContractFields {
            number: &self.number,
            amount: self.amount,
            date: self.date,
            student_ref: self.student_ref,
            status_ref: self.status_ref,
        }
    }
}

/// A supplemental agreement (addendum) to a primary contract.
///
/// Addenda carry no business key of their own; they are addressed through
/// the primary's contract number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplementalContract {
    /// Contract number of the primary this addendum amends.
    pub primary_number: ContractNumber,
    /// Additional amount.
    pub amount: Amount,
    /// Free-text description of the addendum.
    #[serde(default)]
    pub description: Option<String>,
    /// Addendum date.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Addendum status reference.
    pub status_ref: ContractStatusRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_schedule_labels() {
        assert_eq!(PaymentSchedule::from_label("Оплата по месячно"), PaymentSchedule::Monthly);
        assert_eq!(
            PaymentSchedule::from_label(" Оплата по квартально "),
            PaymentSchedule::Quarterly
        );
        assert_eq!(PaymentSchedule::from_label("Оплата за год"), PaymentSchedule::Yearly);
        assert_eq!(PaymentSchedule::from_label(""), PaymentSchedule::Yearly);
    }

    #[test]
    fn direction_accepts_both_physmath_spellings() {
        assert_eq!(SchoolDirection::from_label("Физико-математический"), SchoolDirection::Physmath);
        assert_eq!(SchoolDirection::from_label("Физико-Математическая"), SchoolDirection::Physmath);
        assert_eq!(SchoolDirection::from_label("Кембридж"), SchoolDirection::Cambridge);
        assert_eq!(SchoolDirection::from_label("Школа"), SchoolDirection::General);
    }

    #[test]
    fn language_track_labels() {
        assert_eq!(LanguageTrack::from_label("Казахское отделение"), LanguageTrack::Kazakh);
        assert_eq!(LanguageTrack::from_label("Русское отделение"), LanguageTrack::Russian);
    }

    #[test]
    fn enums_serialize_snake_case() {
        assert_eq!(
            serde_json::to_value(SchoolDirection::AdvancedPlacement).unwrap(),
            serde_json::json!("advanced_placement")
        );
        assert_eq!(
            serde_json::to_value(PaymentSchedule::Quarterly).unwrap(),
            serde_json::json!("quarterly")
        );
    }
}
