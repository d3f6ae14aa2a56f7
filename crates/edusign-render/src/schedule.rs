//! Payment-schedule tables.
//!
//! The discounted total is amortized over a fixed installment count with
//! per-period ceiling rounding. The monthly table has one row per plan row;
//! the quarterly table groups plan rows by quarter index, summing the
//! per-period amount and taking the earliest payment date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use edusign_core::{Amount, Installment};

/// One printed row of a schedule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    /// 1-based row number.
    pub index: usize,
    /// Amount due, whole tenge.
    pub amount: i64,
    /// Payment date, if known.
    pub pay_date: Option<NaiveDate>,
}

/// Rows of the monthly table.
pub fn monthly_rows(discounted: Amount, installments: u32, plan: &[Installment]) -> Vec<ScheduleRow> {
    let per_period = discounted.per_installment_ceil(installments).whole();
    plan.iter()
        .enumerate()
        .map(|(i, row)| ScheduleRow {
            index: i + 1,
            amount: per_period,
            pay_date: row.pay_date,
        })
        .collect()
}

/// Rows of the quarterly table, ordered by quarter index.
pub fn quarterly_rows(
    discounted: Amount,
    installments: u32,
    plan: &[Installment],
) -> Vec<ScheduleRow> {
    let per_period = discounted.per_installment_ceil(installments).whole();

    let mut by_quarter: BTreeMap<u8, (i64, Option<NaiveDate>)> = BTreeMap::new();
    for row in plan {
        let entry = by_quarter.entry(row.quarter).or_insert((0, None));
        entry.0 += 1;
        entry.1 = match (entry.1, row.pay_date) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }

    by_quarter
        .into_values()
        .enumerate()
        .map(|(i, (count, earliest))| ScheduleRow {
            index: i + 1,
            amount: per_period * count,
            pay_date: earliest,
        })
        .collect()
}

/// Render rows as an HTML table with the `№ | Сумма | Дата оплаты` header.
pub fn to_html(rows: &[ScheduleRow]) -> String {
    let mut html = String::from(
        "<table class=\"schedule\"><thead><tr><th>№</th><th>Сумма</th><th>Дата оплаты</th></tr></thead><tbody>",
    );
    for row in rows {
        let date = row
            .pay_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.index,
            group_thousands(row.amount),
            date
        ));
    }
    html.push_str("</tbody></table>");
    html
}

/// Format an integer with a space as thousands separator: `55 556`.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    let lead = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}
