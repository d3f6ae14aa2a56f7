//! # Monetary Amounts
//!
//! Contract amounts are stored in minor units (tiyn, 1/100 KZT). The
//! canonical string form used by the integrity hasher and the signing-data
//! payload is `major.minor` with exactly two fractional digits, matching the
//! registry's `DECIMAL(18,2)` columns.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A non-negative amount of money in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Zero tenge.
    pub const ZERO: Amount = Amount(0);

    /// Construct from minor units (tiyn).
    pub fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Construct from whole tenge.
    pub fn from_major(major: i64) -> Self {
        Self(major.saturating_mul(100))
    }

    /// The amount in minor units.
    pub fn minor(&self) -> i64 {
        self.0
    }

    /// The whole-tenge part, truncating tiyn (as printed in document bodies).
    pub fn whole(&self) -> i64 {
        self.0 / 100
    }

    /// Whether the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Apply a sequence of percentage discounts, each to the running
    /// remainder, and round the result to whole tiyn.
    ///
    /// Two discounts of 10% on 1000.00 give 810.00, not 800.00.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDiscount`] if any percentage
    /// exceeds 100.
    pub fn apply_discounts(&self, percents: &[u32]) -> Result<Self, ValidationError> {
        let mut running = self.0 as f64 / 100.0;
        for &p in percents {
            if p > 100 {
                return Err(ValidationError::InvalidDiscount(p));
            }
            running -= running * f64::from(p) / 100.0;
        }
        Ok(Self((running * 100.0).round() as i64))
    }

    /// Split into `parts` installments, rounding each up to whole tenge.
    ///
    /// Returns the per-installment amount. The remainder is distributed by
    /// ceiling rounding, so `parts * result >= self`.
    pub fn per_installment_ceil(&self, parts: u32) -> Self {
        if parts == 0 {
            return Self::ZERO;
        }
        let divisor = 100 * i64::from(parts);
        let whole = (self.0 + divisor - 1).div_euclid(divisor);
        Self::from_major(whole)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_has_two_fraction_digits() {
        assert_eq!(Amount::from_major(500_000).to_string(), "500000.00");
        assert_eq!(Amount::from_minor(12_345).to_string(), "123.45");
        assert_eq!(Amount::from_minor(5).to_string(), "0.05");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn discounts_compound_on_remainder() {
        let amount = Amount::from_major(1_000);
        assert_eq!(amount.apply_discounts(&[10, 10]).unwrap(), Amount::from_major(810));
        assert_eq!(amount.apply_discounts(&[]).unwrap(), amount);
        assert_eq!(amount.apply_discounts(&[100]).unwrap(), Amount::ZERO);
    }

    #[test]
    fn discounts_round_to_tiyn() {
        // 333.33 * 0.85 = 283.3305
        let amount = Amount::from_minor(33_333);
        assert_eq!(amount.apply_discounts(&[15]).unwrap(), Amount::from_minor(28_333));
    }

    #[test]
    fn discount_over_hundred_rejected() {
        assert_eq!(
            Amount::from_major(1).apply_discounts(&[101]),
            Err(ValidationError::InvalidDiscount(101))
        );
    }

    #[test]
    fn installments_round_up() {
        assert_eq!(Amount::from_major(500_000).per_installment_ceil(9), Amount::from_major(55_556));
        assert_eq!(Amount::from_major(900).per_installment_ceil(9), Amount::from_major(100));
        assert_eq!(Amount::from_minor(90_001).per_installment_ceil(9), Amount::from_major(101));
        assert_eq!(Amount::from_major(900).per_installment_ceil(0), Amount::ZERO);
    }

    #[test]
    fn whole_truncates() {
        assert_eq!(Amount::from_minor(123_499).whole(), 1234);
    }
}
