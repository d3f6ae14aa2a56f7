//! Template decision table.
//!
//! | Schedule | Track | Direction | Supplemental | Template |
//! |----------|-------|-----------|--------------|----------|
//! | monthly | kazakh | any | yes | `KazDeptSupplementalMonthly` |
//! | monthly | kazakh | any | no | `KazDeptMonthly` |
//! | monthly | russian | cambridge | any | `CambridgeMonthly` |
//! | monthly | russian | linguistic | yes | `LinguisticSupplementalMonthly` |
//! | monthly | russian | physmath | yes | `PhysmathSupplementalMonthly` |
//! | monthly | russian | advanced_placement | yes | `ApSupplementalMonthly` |
//! | monthly | russian | it_school | yes | `ItSupplementalMonthly` |
//! | monthly | russian | any other | any | `SchoolMonthly` |
//! | quarterly, yearly | any | any | any | `SchoolYearly` (default, warns) |

use edusign_core::{ContractRecord, LanguageTrack, PaymentSchedule, SchoolDirection};

/// Shared page chrome: head, styles, signature block.
pub(crate) const LAYOUT: &str = include_str!("../templates/layout.html");
pub(crate) const SCHEDULE_MONTHLY: &str = include_str!("../templates/schedule_monthly.html");
pub(crate) const SCHEDULE_QUARTERLY: &str = include_str!("../templates/schedule_quarterly.html");
pub(crate) const SCHEDULE_YEARLY: &str = include_str!("../templates/schedule_yearly.html");

/// Lookup key of the decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateKey {
    pub schedule: PaymentSchedule,
    pub track: LanguageTrack,
    pub direction: SchoolDirection,
    pub supplemental: bool,
}

impl TemplateKey {
    /// Key for rendering `contract`, or its addendum when `supplemental`.
    pub fn for_contract(contract: &ContractRecord, supplemental: bool) -> Self {
        Self {
            schedule: contract.payment_schedule,
            track: contract.language_track,
            direction: contract.direction,
            supplemental,
        }
    }
}

/// Contract document templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    KazDeptSupplementalMonthly,
    KazDeptMonthly,
    CambridgeMonthly,
    LinguisticSupplementalMonthly,
    PhysmathSupplementalMonthly,
    ApSupplementalMonthly,
    ItSupplementalMonthly,
    SchoolMonthly,
    /// Default for every key without an explicit row.
    SchoolYearly,
}

impl TemplateId {
    /// Stable identifier, logged and stored with the artifact.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KazDeptSupplementalMonthly => "kaz_dept_supplemental_monthly",
            Self::KazDeptMonthly => "kaz_dept_monthly",
            Self::CambridgeMonthly => "cambridge_monthly",
            Self::LinguisticSupplementalMonthly => "linguistic_supplemental_monthly",
            Self::PhysmathSupplementalMonthly => "physmath_supplemental_monthly",
            Self::ApSupplementalMonthly => "ap_supplemental_monthly",
            Self::ItSupplementalMonthly => "it_supplemental_monthly",
            Self::SchoolMonthly => "school_monthly",
            Self::SchoolYearly => "school_yearly",
        }
    }

    /// Document body inserted into the layout.
    pub(crate) fn body(&self) -> &'static str {
        match self {
            Self::KazDeptSupplementalMonthly => {
                include_str!("../templates/kaz_dept_supplemental_monthly.html")
            }
            Self::KazDeptMonthly => include_str!("../templates/kaz_dept_monthly.html"),
            Self::CambridgeMonthly => include_str!("../templates/cambridge_monthly.html"),
            Self::LinguisticSupplementalMonthly => {
                include_str!("../templates/linguistic_supplemental_monthly.html")
            }
            Self::PhysmathSupplementalMonthly => {
                include_str!("../templates/physmath_supplemental_monthly.html")
            }
            Self::ApSupplementalMonthly => include_str!("../templates/ap_supplemental_monthly.html"),
            Self::ItSupplementalMonthly => include_str!("../templates/it_supplemental_monthly.html"),
            Self::SchoolMonthly => include_str!("../templates/school_monthly.html"),
            Self::SchoolYearly => include_str!("../templates/school_yearly.html"),
        }
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit rows of the table. `None` means the key has no row.
fn lookup(key: TemplateKey) -> Option<TemplateId> {
    use LanguageTrack::*;
    use PaymentSchedule::*;
    use SchoolDirection::*;

    let id = match (key.schedule, key.track, key.direction, key.supplemental) {
        (Monthly, Kazakh, _, true) => TemplateId::KazDeptSupplementalMonthly,
        (Monthly, Kazakh, _, false) => TemplateId::KazDeptMonthly,
        (Monthly, Russian, Cambridge, _) => TemplateId::CambridgeMonthly,
        (Monthly, Russian, Linguistic, true) => TemplateId::LinguisticSupplementalMonthly,
        (Monthly, Russian, Physmath, true) => TemplateId::PhysmathSupplementalMonthly,
        (Monthly, Russian, AdvancedPlacement, true) => TemplateId::ApSupplementalMonthly,
        (Monthly, Russian, ItSchool, true) => TemplateId::ItSupplementalMonthly,
        (Monthly, Russian, _, _) => TemplateId::SchoolMonthly,
        (Quarterly | Yearly, _, _, _) => return None,
    };
    Some(id)
}

/// Select the template for `key`, falling back to [`TemplateId::SchoolYearly`].
pub fn select(key: TemplateKey) -> TemplateId {
    lookup(key).unwrap_or_else(|| {
        tracing::warn!(
            schedule = key.schedule.as_str(),
            track = key.track.as_str(),
            direction = key.direction.as_str(),
            supplemental = key.supplemental,
            "no template row for contract, using default yearly school template"
        );
        TemplateId::SchoolYearly
    })
}

/// Payment-schedule section for `schedule`.
pub(crate) fn schedule_section(schedule: PaymentSchedule) -> &'static str {
    match schedule {
        PaymentSchedule::Monthly => SCHEDULE_MONTHLY,
        PaymentSchedule::Quarterly => SCHEDULE_QUARTERLY,
        PaymentSchedule::Yearly => SCHEDULE_YEARLY,
    }
}
