//! Money amounts in euro cents.
//!
//! Stripe reports `unit_amount` in minor units; the application stores the
//! same integer and only converts to major units at the JSON boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of money in minor units (cents).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Builds an amount from whole euros.
    pub fn from_euros(euros: i64) -> Self {
        Self(euros * 100)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Major-unit value (cents / 100) for display and API responses.
    pub fn as_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn major_units_divide_by_one_hundred() {
        assert_eq!(Money::from_cents(19_899).as_major(), 198.99);
        assert_eq!(Money::from_euros(129).cents(), 12_900);
    }

    #[test]
    fn display_pads_cents() {
        assert_eq!(Money::from_cents(12_905).to_string(), "129.05");
        assert_eq!(Money::from_cents(-50).to_string(), "-0.50");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }
}
