//! Month names for contract dates.

use chrono::{Datelike, NaiveDate};

use crate::Lang;

const RU: [&str; 12] = [
    "январь", "февраль", "март", "апрель", "май", "июнь", "июль", "август", "сентябрь", "октябрь",
    "ноябрь", "декабрь",
];
const KK: [&str; 12] = [
    "қаңтар", "ақпан", "наурыз", "сәуір", "мамыр", "маусым", "шілде", "тамыз", "қыркүйек", "қазан",
    "қараша", "желтоқсан",
];
const EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Month name of `date` in `lang`.
pub fn month_name(date: NaiveDate, lang: Lang) -> &'static str {
    let idx = date.month0() as usize;
    match lang {
        Lang::Russian => RU[idx],
        Lang::Kazakh => KK[idx],
        Lang::English => EN[idx],
    }
}

/// Year in which a one-year term starting on `date` ends (date + 365 days).
pub fn term_finish_year(date: NaiveDate) -> i32 {
    date.checked_add_days(chrono::Days::new(365))
        .map(|d| d.year())
        .unwrap_or_else(|| date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months_in_three_languages() {
        let d = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        assert_eq!(month_name(d, Lang::Russian), "август");
        assert_eq!(month_name(d, Lang::Kazakh), "тамыз");
        assert_eq!(month_name(d, Lang::English), "August");
    }

    #[test]
    fn finish_year_rolls_over() {
        assert_eq!(term_finish_year(NaiveDate::from_ymd_opt(2024, 8, 15).unwrap()), 2025);
        // 2024 is a leap year: Jan 1 + 365 days is still Dec 31 2024.
        assert_eq!(term_finish_year(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), 2024);
    }
}
