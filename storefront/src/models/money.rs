// storefront/src/models/money.rs

//! Monetary amounts held as whole cents.
//!
//! JSON carries them as decimal numbers (`25.0`, `10.5`) the way the browser
//! client sends them; storage and arithmetic stay in integer cents so order
//! totals are exact.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct Money(i64);

impl Money {
  pub const ZERO: Money = Money(0);

  pub const fn from_cents(cents: i64) -> Self {
    Money(cents)
  }

  pub const fn cents(self) -> i64 {
    self.0
  }

  pub fn is_negative(self) -> bool {
    self.0 < 0
  }

  /// Converts a decimal amount. Only binary float noise is rounded away;
  /// amounts with a fraction of a cent give `None`.
  pub fn from_decimal(amount: f64) -> Option<Self> {
    let scaled = amount * 100.0;
    let cents = scaled.round();
    if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
      return None;
    }
    let noise = (cents.abs() * f64::EPSILON * 4.0).max(1e-6);
    if (scaled - cents).abs() > noise {
      return None;
    }
    Some(Money(cents as i64))
  }

  pub fn as_decimal(self) -> f64 {
    self.0 as f64 / 100.0
  }

  /// Unit price times quantity, saturating at the representable bounds.
  pub fn times(self, quantity: i32) -> Money {
    Money(self.0.saturating_mul(i64::from(quantity)))
  }

  pub fn abs_diff(self, other: Money) -> Money {
    Money(self.0.abs_diff(other.0).min(i64::MAX as u64) as i64)
  }
}

impl std::ops::Add for Money {
  type Output = Money;

  fn add(self, rhs: Money) -> Money {
    Money(self.0.saturating_add(rhs.0))
  }
}

impl Sum for Money {
  fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
    iter.fold(Money::ZERO, |acc, m| acc + m)
  }
}

impl fmt::Display for Money {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = if self.0 < 0 { "-" } else { "" };
    let abs = self.0.unsigned_abs();
    write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
  }
}

impl Serialize for Money {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(self.as_decimal())
  }
}

impl<'de> Deserialize<'de> for Money {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let amount = f64::deserialize(deserializer)?;
    Money::from_decimal(amount).ok_or_else(|| de::Error::custom(format!("Invalid amount {}: use at most two decimal places", amount)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decimal_amounts_map_to_whole_cents() {
    assert_eq!(Money::from_decimal(10.0), Some(Money::from_cents(1000)));
    assert_eq!(Money::from_decimal(299.99), Some(Money::from_cents(29999)));
    // 0.1 + 0.2 style drift must not leak into cents
    assert_eq!(Money::from_decimal(0.1 + 0.2), Some(Money::from_cents(30)));
    assert_eq!(Money::from_decimal(f64::NAN), None);
  }

  #[test]
  fn fractions_of_a_cent_are_rejected() {
    assert_eq!(Money::from_decimal(19.999), None);
    assert_eq!(Money::from_decimal(0.005), None);
    assert!(serde_json::from_str::<Money>("19.999").is_err());
    assert_eq!(Money::from_decimal(19.99), Some(Money::from_cents(1999)));
  }

  #[test]
  fn json_uses_decimal_numbers() {
    let m: Money = serde_json::from_str("12.5").unwrap();
    assert_eq!(m.cents(), 1250);
    assert_eq!(serde_json::to_string(&Money::from_cents(2500)).unwrap(), "25.0");
    assert!(serde_json::from_str::<Money>("\"ten\"").is_err());
  }

  #[test]
  fn totals_are_exact_sums_of_line_amounts() {
    let total: Money = [(Money::from_cents(1000), 2), (Money::from_cents(500), 1)]
      .into_iter()
      .map(|(price, qty)| price.times(qty))
      .sum();
    assert_eq!(total, Money::from_cents(2500));
  }

  #[test]
  fn display_formats_dollars_and_cents() {
    assert_eq!(Money::from_cents(29999).to_string(), "$299.99");
    assert_eq!(Money::from_cents(-5).to_string(), "-$0.05");
  }
}
