//! # Money Module
//!
//! Provides the `Money` and `Percentage` types for fixed-point arithmetic.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Purchase costing is re-derived on every save. With floats:            │
//! │    100.00 / 3 = 33.333333... → × 1.2 → 39.99999... → drift per edit    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Points                             │
//! │    10000 cents / 3 = 3333 cents (rounded half-up, explicitly)          │
//! │    20.00% = 2000 bps → 3333 × 2000 / 10000 = 667 cents margin          │
//! │    Every recomputation from the same inputs yields the same cents      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::money::{Money, Percentage};
//!
//! let unit_cost = Money::from_cents(1000);            // $10.00
//! let margin = unit_cost.apply_percentage(Percentage::from_bps(2000)); // 20%
//! assert_eq!(margin, Some(Money::from_cents(200)));
//!
//! let parsed: Money = "12.50".parse().unwrap();
//! assert_eq!(parsed.cents(), 1250);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Basis points in 100%.
const BPS_SCALE: i128 = 10_000;

/// Integer division rounding half away from zero.
///
/// `den` must be positive; callers validate that before dividing.
fn div_round_half_up(num: i128, den: i128) -> i128 {
    if num >= 0 {
        (num + den / 2) / den
    } else {
        -((-num + den / 2) / den)
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in cents (2 fixed decimal places).
///
/// ## Where Money is Used
/// ```text
/// Purchase.total_cost ──► unit_cost ──► sale_price ──► PriceHistoryEntry
///                                  └──► unit_margin ──► total_margin
///
/// Sale.unit_price × quantity ──► Sale.total ──► DailyAnalytics.total_sales
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns `self × rate`, rounded half away from zero to the cent.
    ///
    /// `None` when the result does not fit in an `i64` of cents.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::{Money, Percentage};
    ///
    /// let sales = Money::from_cents(20_000); // $200.00
    /// let margin = sales.apply_percentage(Percentage::from_bps(2000)); // 20%
    /// assert_eq!(margin, Some(Money::from_cents(4000))); // $40.00
    ///
    /// // $0.05 × 30% = $0.015 → $0.02
    /// let rounded = Money::from_cents(5).apply_percentage(Percentage::from_bps(3000));
    /// assert_eq!(rounded, Some(Money::from_cents(2)));
    ///
    /// assert!(Money::from_cents(i64::MAX).apply_percentage(Percentage::from_bps(20_000)).is_none());
    /// ```
    pub fn apply_percentage(&self, rate: Percentage) -> Option<Money> {
        let scaled = self.0 as i128 * rate.bps() as i128;
        i64::try_from(div_round_half_up(scaled, BPS_SCALE)).ok().map(Money)
    }

    /// Splits the amount evenly across `parts`, rounded half away from zero.
    ///
    /// Returns `None` when `parts` is not positive, so the caller decides how
    /// a zero divisor is reported.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// let unit = Money::from_cents(1000).divide_by(3).unwrap();
    /// assert_eq!(unit.cents(), 333);
    /// assert!(Money::from_cents(1000).divide_by(0).is_none());
    /// ```
    pub fn divide_by(&self, parts: i64) -> Option<Money> {
        if parts <= 0 {
            return None;
        }
        Some(Money(div_round_half_up(self.0 as i128, parts as i128) as i64))
    }

    /// Multiplies money by a quantity, returning `None` on overflow.
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts `other`, returning `None` on overflow.
    #[inline]
    pub fn checked_sub(&self, other: Money) -> Option<Self> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Sums a sequence of amounts, returning `None` on overflow.
    ///
    /// An empty sequence sums to zero.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// let day = [Money::from_cents(5_000), Money::from_cents(15_000)];
    /// assert_eq!(Money::checked_sum(day), Some(Money::from_cents(20_000)));
    /// assert!(Money::checked_sum([Money::from_cents(i64::MAX), Money::from_cents(1)]).is_none());
    /// ```
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the plain decimal amount (`12.50`, `-5.50`).
///
/// Currency symbols are a presentation concern of the caller.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

/// Parses a decimal amount with at most two fraction digits.
///
/// Accepts `12`, `12.5`, `12.50` and `-3.25`.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed_2(s, "amount").map(Money)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Percentage
// =============================================================================

/// A percentage with two fixed decimals, stored in basis points.
///
/// 1 basis point = 0.01%, so 2000 bps = 20.00% and 1250 bps = 12.50%.
/// Used for purchase margins and the fixed analytics ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percentage(u32);

impl Percentage {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// Returns the percentage in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    /// Checks if the percentage is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Percentage::zero()
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

/// Parses `20`, `12.5` or `12.50` (percent, not fraction). A trailing `%`
/// is allowed.
impl FromStr for Percentage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_end_matches('%');
        let bps = parse_fixed_2(s, "percentage")?;
        if bps < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "percentage".to_string(),
            });
        }
        u32::try_from(bps)
            .map(Percentage)
            .map_err(|_| ValidationError::OutOfRange {
                field: "percentage".to_string(),
                min: 0,
                max: u32::MAX as i64 / 100,
            })
    }
}

/// Parses a decimal string into hundredths.
fn parse_fixed_2(input: &str, field: &str) -> Result<i64, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let s = input.trim();
    if s.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid("no digits"));
    }
    if frac.len() > 2 {
        return Err(invalid("at most two decimal places"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("must be a decimal number"));
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("too large"))?
    };
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| invalid("bad fraction"))? * 10,
        _ => frac.parse().map_err(|_| invalid("bad fraction"))?,
    };

    let value = whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| invalid("too large"))?;

    Ok(if negative { -value } else { value })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!(a.checked_add(b), Some(Money::from_cents(1500)));
        assert_eq!(a.checked_sub(b), Some(Money::from_cents(500)));
        assert_eq!(a.checked_multiply_quantity(3), Some(Money::from_cents(3000)));
        assert_eq!(Money::checked_sum([a, b, b]), Some(Money::from_cents(2000)));
        assert_eq!(Money::checked_sum(Vec::new()), Some(Money::zero()));
    }

    #[test]
    fn test_arithmetic_overflow_is_none() {
        let max = Money::from_cents(i64::MAX);
        assert!(max.checked_add(Money::from_cents(1)).is_none());
        assert!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)).is_none());
        assert!(Money::checked_sum([Money::from_cents(i64::MAX / 2 + 1); 2]).is_none());
        // 1e18 × 999.99% does not fit in i64 cents
        assert!(Money::from_cents(1_000_000_000_000_000_000)
            .apply_percentage(Percentage::from_bps(99_999))
            .is_none());
    }

    #[test]
    fn test_apply_percentage_rounds_half_away_from_zero() {
        // 0.05 × 30% = 0.015 → 0.02
        let pct = |cents: i64| Money::from_cents(cents).apply_percentage(Percentage::from_bps(3000)).unwrap();
        assert_eq!(pct(5).cents(), 2);
        // 0.04 × 30% = 0.012 → 0.01
        assert_eq!(pct(4).cents(), 1);
        // Negative amounts round symmetrically
        assert_eq!(pct(-5).cents(), -2);
    }

    #[test]
    fn test_divide_by() {
        assert_eq!(Money::from_cents(10_000).divide_by(10).unwrap().cents(), 1000);
        // 10.00 / 3 = 3.333 → 3.33
        assert_eq!(Money::from_cents(1000).divide_by(3).unwrap().cents(), 333);
        // 20.00 / 3 = 6.666 → 6.67
        assert_eq!(Money::from_cents(2000).divide_by(3).unwrap().cents(), 667);
        assert!(Money::from_cents(1000).divide_by(0).is_none());
        assert!(Money::from_cents(1000).divide_by(-2).is_none());
    }

    #[test]
    fn test_checked_multiply_overflow() {
        assert!(Money::from_cents(i64::MAX).checked_multiply_quantity(2).is_none());
        assert_eq!(
            Money::from_cents(299).checked_multiply_quantity(3),
            Some(Money::from_cents(897))
        );
    }

    #[test]
    fn test_parse_money() {
        assert_eq!("12".parse::<Money>().unwrap().cents(), 1200);
        assert_eq!("12.5".parse::<Money>().unwrap().cents(), 1250);
        assert_eq!("12.05".parse::<Money>().unwrap().cents(), 1205);
        assert_eq!("-3.25".parse::<Money>().unwrap().cents(), -325);
        assert_eq!(".75".parse::<Money>().unwrap().cents(), 75);

        assert!("".parse::<Money>().is_err());
        assert!("12.345".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
    }

    #[test]
    fn test_parse_percentage() {
        assert_eq!("20".parse::<Percentage>().unwrap().bps(), 2000);
        assert_eq!("12.5%".parse::<Percentage>().unwrap().bps(), 1250);
        assert!("-5".parse::<Percentage>().is_err());
        assert_eq!(Percentage::from_bps(1250).to_string(), "12.50%");
    }
}
