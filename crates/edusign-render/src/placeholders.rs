//! Placeholder catalogue and substitution.
//!
//! Tokens are `{Name}` where `Name` is ASCII alphanumeric or `_`. Unknown
//! tokens, and brace pairs that are not tokens, are copied verbatim. The
//! signed-data QR slot is the bare word `QRCodeDataSigned`.
//!
//! Text values are HTML-escaped when inserted into the catalogue; markup
//! values (tables, QR images) are inserted as-is. Substituted values are
//! never rescanned.

use std::collections::HashMap;

use edusign_core::{Amount, ContractRecord, ParentInfo};

use crate::calendar::{month_name, term_finish_year};
use crate::error::RenderError;
use crate::schedule;
use crate::words::{spell, zero};
use crate::Lang;

/// Bare (brace-less) token for the signed-data QR.
pub const SIGNED_DATA_QR_TOKEN: &str = "QRCodeDataSigned";

/// Longest accepted token name.
const MAX_TOKEN_LEN: usize = 64;

pub const QR_TEXT_RUS: &str = "QR-код содержит данные об электронно-цифровой подписи подписанта";
pub const QR_TEXT_KAZ: &str =
    "QR-кодта қол қоюшының электрондық-цифрлық қолтаңбасы туралы деректер қамтылады";
pub const POLICE_KAZ: &str = "Осы құжат «Электрондық құжат және электрондық цифрлық қолтаңба туралы» Қазақстан Республикасының 2003 жылғы 7 қаңтардағы N 370-II Заңы 7 бабының 1 тармағына сәйкес қағаз тасығыштағы құжатпен бірдей.";
pub const POLICE_RUS: &str = "Данный документ согласно пункту 1 статьи 7 ЗРК от 7 января 2003 года «Об электронном документе и электронной цифровой подписи» равнозначен документу на бумажном носителе.";

/// Which QR image a slot shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrSlot {
    /// The human signer.
    Signer,
    /// Institutional counter-signer by position in the configured set.
    CounterSigner(usize),
    /// The signed-data summary.
    SignedData,
}

impl QrSlot {
    /// Tokens that render this slot, canonical name first.
    pub fn tokens(&self) -> &'static [&'static str] {
        match self {
            Self::Signer => &["QRCodeSignature", "QRCode"],
            Self::CounterSigner(0) => &["QRCodeDirectorOmarov", "QRcodeDirector"],
            Self::CounterSigner(1) => &["QRCodeDirectorSerikov", "QRCodeDirector2"],
            Self::CounterSigner(_) => &[],
            Self::SignedData => &[SIGNED_DATA_QR_TOKEN],
        }
    }
}

/// Computed amounts a document prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentAmounts {
    pub amount: Amount,
    pub sum: Amount,
    pub with_discount: Amount,
    pub dop_amount: Amount,
    pub contribution: Amount,
}

impl DocumentAmounts {
    /// Derive the printed amounts. `dop_amount` is the addendum amount for a
    /// supplemental document and the contract amount otherwise.
    pub fn compute(contract: &ContractRecord, addendum: Option<Amount>) -> Result<Self, RenderError> {
        Ok(Self {
            amount: contract.amount,
            sum: contract.contract_sum.unwrap_or(Amount::ZERO),
            with_discount: contract.amount.apply_discounts(&contract.discounts)?,
            dop_amount: addendum.unwrap_or(contract.amount),
            contribution: contract.contribution.unwrap_or(Amount::ZERO),
        })
    }
}

/// Token → value map for one rendering.
#[derive(Debug, Clone, Default)]
pub struct Placeholders {
    values: HashMap<&'static str, String>,
}

impl Placeholders {
    /// Build the full text catalogue for `contract`. QR slots start empty.
    pub fn for_contract(
        contract: &ContractRecord,
        amounts: &DocumentAmounts,
        installments: u32,
    ) -> Self {
        let mut p = Self::default();
        p.contract_data(contract);
        p.parties(contract);
        p.amounts(amounts);
        p.legal_texts();
        p.tables(contract, amounts.with_discount, installments);
        for slot in [
            QrSlot::Signer,
            QrSlot::CounterSigner(0),
            QrSlot::CounterSigner(1),
            QrSlot::SignedData,
        ] {
            p.set_qr(slot, "");
        }
        p
    }

    /// Put an already-encoded QR image into every token of `slot`.
    pub fn set_qr(&mut self, slot: QrSlot, svg: &str) {
        for token in slot.tokens() {
            self.values.insert(token, svg.to_string());
        }
    }

    /// Current value of `token`.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    fn text(&mut self, token: &'static str, value: &str) {
        self.values.insert(token, escape_html(value));
    }

    fn markup(&mut self, token: &'static str, value: String) {
        self.values.insert(token, value);
    }

    fn contract_data(&mut self, c: &ContractRecord) {
        let year = c.date.format("%Y").to_string();
        self.text("ContractNum", c.number.as_str());
        self.text("ContractYear", &year);
        self.text("ContractYearFinish", &term_finish_year(c.date).to_string());
        self.text("ContractDate", &c.date.format("%d.%m.%Y").to_string());
        self.text("ContractDay", &c.date.format("%d").to_string());
        self.text("ContractMonthRUS", month_name(c.date, Lang::Russian));
        self.text("ContractMonthKAZ", month_name(c.date, Lang::Kazakh));
        self.text("ContractMonthENG", month_name(c.date, Lang::English));
        self.text("EduYear", c.edu_year.as_deref().unwrap_or_default());
    }

    fn parties(&mut self, c: &ContractRecord) {
        let s = &c.student;
        let parent = &c.parent;
        let address = parent.address.as_deref().unwrap_or_default();
        self.text("ParentFullName", &parent.full_name);
        self.text("StudentFullName", &s.full_name);
        self.text("StudentIIN", s.iin.as_deref().unwrap_or_default());
        self.text("StudentAddress", address);
        self.text(
            "StudentPhoneNumber",
            s.phone.as_deref().filter(|p| !p.is_empty()).unwrap_or("-"),
        );
        self.text("ParentAddress", address);
        self.text("ParentPhoneNumber", parent.phone.as_deref().unwrap_or_default());
        self.text("ParentIIN", parent.iin.as_deref().unwrap_or_default());

        let [ru, kk, en] = passport_strings(parent);
        self.text("ParentPassport", &ru);
        self.text("ParentPassportKAZ", &kk);
        self.text("ParentPassportENG", &en);
    }

    fn amounts(&mut self, a: &DocumentAmounts) {
        self.text("ContractAmount", &a.amount.whole().to_string());
        self.text("ContractSum", &a.sum.whole().to_string());
        self.text("ContractAmountWithDiscount", &a.with_discount.whole().to_string());
        self.text("ContractDopAmount", &a.dop_amount.whole().to_string());
        self.text("ContractContr", &a.contribution.whole().to_string());

        // Absent base amounts print no words at all.
        for (lang, amount_tok, sum_tok) in [
            (Lang::Russian, "ContractAmountWords", "ContractSumWords"),
            (Lang::Kazakh, "ContractAmountWordsKaz", "ContractSumWordsKaz"),
            (Lang::English, "ContractAmountWordsEng", "ContractSumWordsEng"),
        ] {
            self.text(amount_tok, &words_or_empty(a.amount, lang));
            self.text(sum_tok, &words_or_empty(a.sum, lang));
        }

        for (lang, tok) in [
            (Lang::Russian, "ContractAmountWithDiscountWords"),
            (Lang::Kazakh, "ContractAmountWithDiscountWordsKaz"),
            (Lang::English, "ContractAmountWithDiscountWordsEng"),
        ] {
            self.text(tok, &spell(a.with_discount.whole(), lang));
        }

        self.text("ContractDopAmountWords", &spell(a.dop_amount.whole(), Lang::Russian));
        self.text("ContractDopAmountWordsKaz", &spell(a.dop_amount.whole(), Lang::Kazakh));

        for (lang, tok) in [
            (Lang::Russian, "ContractContrWords"),
            (Lang::Kazakh, "ContractContrWordsKaz"),
            (Lang::English, "ContractContrWordsEng"),
        ] {
            let whole = a.contribution.whole();
            let value = if whole > 0 {
                spell(whole, lang)
            } else {
                zero(lang).to_string()
            };
            self.text(tok, &value);
        }
    }

    fn legal_texts(&mut self) {
        self.text("QRCodeTextRus", QR_TEXT_RUS);
        self.text("QRCodeTextKaz", QR_TEXT_KAZ);
        self.text("police_rus", POLICE_RUS);
        self.text("police_kaz", POLICE_KAZ);
    }

    fn tables(&mut self, c: &ContractRecord, discounted: Amount, installments: u32) {
        let monthly = schedule::monthly_rows(discounted, installments, &c.installments);
        let quarterly = schedule::quarterly_rows(discounted, installments, &c.installments);
        self.markup("customtable_monthpay", schedule::to_html(&monthly));
        self.markup("customtable_quarterpay", schedule::to_html(&quarterly));
    }

    /// Replace every known token in `template`.
    pub fn substitute(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len() * 2);
        let mut rest = template;

        while let Some(pos) = next_marker(rest) {
            out.push_str(&rest[..pos]);
            rest = &rest[pos..];

            if let Some(tail) = rest.strip_prefix(SIGNED_DATA_QR_TOKEN) {
                out.push_str(self.get(SIGNED_DATA_QR_TOKEN).unwrap_or(SIGNED_DATA_QR_TOKEN));
                rest = tail;
                continue;
            }

            let replaced = brace_token(rest)
                .and_then(|(name, len)| self.get(name).map(|value| (value, len)));
            match replaced {
                Some((value, len)) => {
                    out.push_str(value);
                    rest = &rest[len..];
                }
                None => {
                    out.push('{');
                    rest = &rest[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

fn words_or_empty(amount: Amount, lang: Lang) -> String {
    if amount.whole() == 0 {
        String::new()
    } else {
        spell(amount.whole(), lang)
    }
}

/// Russian, Kazakh and English identity-document strings.
fn passport_strings(parent: &ParentInfo) -> [String; 3] {
    let number = parent.document_number.as_deref().unwrap_or_default();
    let date = parent.issue_date.as_deref().unwrap_or_default();
    let issuer = parent.issued_by.as_deref().unwrap_or_default();
    let [by_ru, by_kk, by_en] = if issuer.contains('?') {
        ["Не указано", "Көрсетілмеген", "Not specified"]
    } else {
        [issuer; 3]
    };

    [
        format!("Удостоверение личности: №{number}, Орган выдачи: {by_ru}, Дата выдачи: {date}"),
        format!("Жеке куәлік: №{number}, Берген орган: {by_kk}, Берілген күні: {date}"),
        format!("ID: No.{number}, Issued by: {by_en}, Issue date: {date}"),
    ]
}

/// Offset of the next `{` or bare signed-data token.
fn next_marker(s: &str) -> Option<usize> {
    match (s.find('{'), s.find(SIGNED_DATA_QR_TOKEN)) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// If `s` starts with `{Name}`, return `Name` and the byte length consumed.
fn brace_token(s: &str) -> Option<(&str, usize)> {
    let inner = s.strip_prefix('{')?;
    let end = inner.find('}')?;
    let name = &inner[..end];
    let valid = !name.is_empty()
        && name.len() <= MAX_TOKEN_LEN
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
    valid.then_some((name, end + 2))
}

/// Minimal HTML text escaping.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
