//! Fixed-point currency amounts.
//!
//! Amounts are stored as whole cents so that sums over a ledger are exact
//! integer arithmetic. Dollars only appear at presentation and serialization
//! boundaries.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

use serde::{Serialize, Serializer};

use crate::Error;

/// A monetary amount in whole cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(i64);

impl Amount {
    /// Zero dollars and zero cents.
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from a count of whole cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount as a count of whole cents.
    pub fn as_cents(self) -> i64 {
        self.0
    }

    /// The amount in dollars, for display and chart payloads.
    ///
    /// The conversion is exact for any amount a ledger will realistically
    /// hold (the mantissa of an `f64` covers ±2^53 cents).
    pub fn to_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parse a dollar amount entered by a user, e.g. `"12.50"` or `"100"`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `text` is not a number with at most
    /// two decimal places, or if the parsed amount is zero or negative.
    /// Signs are not accepted, so negative inputs fail the same way.
    pub fn parse_positive(text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidAmount(text.to_owned());

        let trimmed = text.trim();
        let (whole_text, fraction_text) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        if whole_text.is_empty() && fraction_text.is_empty() {
            return Err(invalid());
        }

        let all_digits = |text: &str| text.bytes().all(|byte| byte.is_ascii_digit());
        if !all_digits(whole_text) || !all_digits(fraction_text) {
            return Err(invalid());
        }

        let whole: i64 = if whole_text.is_empty() {
            0
        } else {
            whole_text.parse().map_err(|_| invalid())?
        };

        let fraction_cents = match fraction_text.len() {
            0 => 0,
            1 => 10 * fraction_text.parse::<i64>().map_err(|_| invalid())?,
            2 => fraction_text.parse::<i64>().map_err(|_| invalid())?,
            _ => return Err(invalid()),
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction_cents))
            .ok_or_else(invalid)?;

        if cents <= 0 {
            return Err(invalid());
        }

        Ok(Self(cents))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

/// Formats the amount as unsigned-style dollars, e.g. `-1250` cents as `-12.50`.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();

        write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

/// Serializes as dollars so chart payloads contain plain numbers.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_dollars())
    }
}

#[cfg(test)]
mod amount_tests {
    use crate::Error;

    use super::Amount;

    #[test]
    fn parses_dollars_and_cents() {
        let cases = [
            ("12.50", 1250),
            ("100", 10_000),
            ("0.01", 1),
            (".5", 50),
            ("7.", 700),
            (" 3.99 ", 399),
        ];

        for (text, want) in cases {
            let got = Amount::parse_positive(text).expect("Could not parse amount");

            assert_eq!(
                got.as_cents(),
                want,
                "want {want} cents for {text:?}, got {}",
                got.as_cents()
            );
        }
    }

    #[test]
    fn parse_rejects_non_positive_amounts() {
        for text in ["0", "0.00", "0.0", "-5", "-0.01"] {
            let got = Amount::parse_positive(text);

            assert_eq!(
                got,
                Err(Error::InvalidAmount(text.to_owned())),
                "want InvalidAmount for {text:?}, got {got:?}"
            );
        }
    }

    #[test]
    fn parse_rejects_malformed_amounts() {
        for text in ["", ".", "abc", "12.345", "1.2.3", "1e3", "+5", "12,50"] {
            let got = Amount::parse_positive(text);

            assert_eq!(
                got,
                Err(Error::InvalidAmount(text.to_owned())),
                "want InvalidAmount for {text:?}, got {got:?}"
            );
        }
    }

    #[test]
    fn displays_as_dollars() {
        assert_eq!(Amount::from_cents(1250).to_string(), "12.50");
        assert_eq!(Amount::from_cents(5).to_string(), "0.05");
        assert_eq!(Amount::from_cents(-1250).to_string(), "-12.50");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn sums_exactly() {
        // The classic float trap: 0.1 + 0.2 != 0.3, but 10 + 20 == 30 cents.
        let total: Amount = [Amount::from_cents(10), Amount::from_cents(20)]
            .into_iter()
            .sum();

        assert_eq!(total, Amount::from_cents(30));
    }

    #[test]
    fn serializes_as_dollars() {
        let json =
            serde_json::to_string(&Amount::from_cents(1250)).expect("Could not serialize amount");

        assert_eq!(json, "12.5");
    }
}
