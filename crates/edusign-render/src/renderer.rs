//! Document renderer.

use chrono::{DateTime, Utc};
use edusign_core::{ContractRecord, DocumentKind, SupplementalContract};

use crate::error::RenderError;
use crate::placeholders::{DocumentAmounts, Placeholders, QrSlot};
use crate::qr::{self, CounterSignerQrPayload, SignatureQrPayload, SignedDataQrPayload};
use crate::templates::{self, TemplateId, TemplateKey, LAYOUT};

/// Media type of every rendered artifact.
pub const ARTIFACT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Renderer settings.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Base URL of the parent cabinet; QR verification links point here.
    pub frontend_url: String,
    /// Installment divisor for the payment schedule.
    pub installments: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            installments: 9,
        }
    }
}

/// What is being rendered: a primary contract, or its addendum.
#[derive(Debug, Clone, Copy)]
pub struct ContractView<'a> {
    pub contract: &'a ContractRecord,
    pub supplemental: Option<&'a SupplementalContract>,
}

impl<'a> ContractView<'a> {
    /// View of the primary contract document.
    pub fn primary(contract: &'a ContractRecord) -> Self {
        Self {
            contract,
            supplemental: None,
        }
    }

    /// View of the addendum document.
    pub fn supplemental(contract: &'a ContractRecord, addendum: &'a SupplementalContract) -> Self {
        Self {
            contract,
            supplemental: Some(addendum),
        }
    }

    /// Which artifact slot this view renders into.
    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_supplemental(self.supplemental.is_some())
    }
}

/// A rendered document, ready to be staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub kind: DocumentKind,
    pub template: TemplateId,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub rendered_at: DateTime<Utc>,
}

/// Renders contracts into signed HTML artifacts.
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    config: RenderConfig,
}

impl DocumentRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `view` with the signer QR and one QR per counter-signer
    /// (slot order as given). Slots without a payload render empty.
    pub fn render(
        &self,
        view: &ContractView<'_>,
        signer: &SignatureQrPayload,
        counter_signers: &[CounterSignerQrPayload],
    ) -> Result<RenderedArtifact, RenderError> {
        let contract = view.contract;
        let key = TemplateKey::for_contract(contract, view.supplemental.is_some());
        let template = templates::select(key);

        let amounts = DocumentAmounts::compute(contract, view.supplemental.map(|s| s.amount))?;
        let mut values = Placeholders::for_contract(contract, &amounts, self.config.installments);

        values.set_qr(QrSlot::Signer, &qr::encode_svg(signer)?);
        for (i, payload) in counter_signers.iter().enumerate() {
            values.set_qr(QrSlot::CounterSigner(i), &qr::encode_svg(payload)?);
        }
        let signed_data = SignedDataQrPayload::new(
            &self.config.frontend_url,
            contract.number.clone(),
            signer.signed_at,
        );
        values.set_qr(QrSlot::SignedData, &qr::encode_svg(&signed_data)?);

        let page = LAYOUT
            .replace("{{BODY}}", template.body())
            .replace("{{SCHEDULE}}", templates::schedule_section(contract.payment_schedule));
        let html = values.substitute(&page);

        tracing::info!(
            contract_num = %contract.number,
            kind = %view.kind(),
            template = %template,
            bytes = html.len(),
            "rendered contract artifact"
        );

        Ok(RenderedArtifact {
            kind: view.kind(),
            template,
            content_type: ARTIFACT_CONTENT_TYPE,
            bytes: html.into_bytes(),
            rendered_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use edusign_core::{
        Amount, ContractNumber, ContractStatusRef, Iin, Installment, LanguageTrack, ParentInfo,
        PaymentSchedule, SchoolDirection, SignatureUid, StudentInfo, StudentRef,
    };

    fn contract(schedule: PaymentSchedule, track: LanguageTrack) -> ContractRecord {
        ContractRecord {
            number: ContractNumber::new("2024Д-1400").unwrap(),
            amount: Amount::from_major(500_000),
            date: NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
            student_ref: StudentRef(77),
            status_ref: ContractStatusRef(1),
            payment_schedule: schedule,
            language_track: track,
            direction: SchoolDirection::General,
            edu_year: Some("2024-2025".into()),
            contract_sum: None,
            contribution: None,
            discounts: vec![],
            installments: (1..=9)
                .map(|i| Installment {
                    pay_date: NaiveDate::from_ymd_opt(2024, 9, i),
                    quarter: ((i - 1) / 3 + 1) as u8,
                })
                .collect(),
            student: StudentInfo {
                full_name: "Ахметов Арман".into(),
                ..Default::default()
            },
            parent: ParentInfo {
                full_name: "Ахметова Динара".into(),
                ..Default::default()
            },
        }
    }

    fn signer(c: &ContractRecord) -> SignatureQrPayload {
        SignatureQrPayload::new(
            "http://localhost:3000",
            SignatureUid::new(),
            c.number.clone(),
            Iin::new("123456789012").unwrap(),
            Utc::now(),
        )
    }

    fn director(c: &ContractRecord, name: &str, iin: &str) -> CounterSignerQrPayload {
        CounterSignerQrPayload::new(
            name,
            "Директор",
            &Iin::new(iin).unwrap(),
            format!("{name} CN"),
            c.number.clone(),
            Utc::now(),
        )
    }

    #[test]
    fn monthly_primary_renders_full_document() {
        let c = contract(PaymentSchedule::Monthly, LanguageTrack::Russian);
        let renderer = DocumentRenderer::default();
        let counters = [
            director(&c, "ОМАРОВ", "540217301387"),
            director(&c, "СЕРИКОВ", "861205300997"),
        ];
        let art = renderer
            .render(&ContractView::primary(&c), &signer(&c), &counters)
            .unwrap();
        let html = String::from_utf8(art.bytes).unwrap();

        assert_eq!(art.template, TemplateId::SchoolMonthly);
        assert_eq!(art.kind, DocumentKind::Primary);
        assert_eq!(art.content_type, ARTIFACT_CONTENT_TYPE);
        assert!(html.contains("ДОГОВОР № 2024Д-1400"));
        assert!(html.contains("<td>55 556</td>"));
        // Signer, two directors, signed-data.
        assert_eq!(html.matches("<svg").count(), 4);
        assert!(!html.contains("{ContractNum}"));
        assert!(!html.contains("QRCodeDataSigned"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn quarterly_contract_uses_default_body_with_quarter_table() {
        let c = contract(PaymentSchedule::Quarterly, LanguageTrack::Russian);
        let art = DocumentRenderer::default()
            .render(&ContractView::primary(&c), &signer(&c), &[])
            .unwrap();
        let html = String::from_utf8(art.bytes).unwrap();
        assert_eq!(art.template, TemplateId::SchoolYearly);
        assert!(html.contains(&format!("<td>{}</td>", "166 668")));
        // Missing counter-signer slots render empty.
        assert_eq!(html.matches("<svg").count(), 2);
    }

    #[test]
    fn kazakh_addendum_prints_addendum_amount() {
        let c = contract(PaymentSchedule::Monthly, LanguageTrack::Kazakh);
        let addendum = SupplementalContract {
            primary_number: c.number.clone(),
            amount: Amount::from_major(120_000),
            description: Some("Робототехника".into()),
            date: None,
            status_ref: ContractStatusRef(1),
        };
        let art = DocumentRenderer::default()
            .render(&ContractView::supplemental(&c, &addendum), &signer(&c), &[])
            .unwrap();
        let html = String::from_utf8(art.bytes).unwrap();
        assert_eq!(art.template, TemplateId::KazDeptSupplementalMonthly);
        assert_eq!(art.kind, DocumentKind::Supplemental);
        assert!(html.contains("120000 (жүз жиырма мың)"));
        assert!(html.contains("тамыз"));
    }

    #[test]
    fn rerender_is_not_byte_identical_but_same_template() {
        let c = contract(PaymentSchedule::Monthly, LanguageTrack::Russian);
        let r = DocumentRenderer::default();
        let a = r.render(&ContractView::primary(&c), &signer(&c), &[]).unwrap();
        let b = r.render(&ContractView::primary(&c), &signer(&c), &[]).unwrap();
        assert_eq!(a.template, b.template);
        // Fresh signature ids land in the signer QR.
        assert_ne!(a.bytes, b.bytes);
    }
}
