//! # Daily Analytics
//!
//! Pure rollup math for the per-day sales summary.
//!
//! ```text
//! Sales created on D ──► Σ total ──► total_sales
//!                                      │ × 20%
//!                                      ▼
//!                               estimated_margin
//!                                      │ × 30%
//!                                      ▼
//!                               estimated_savings
//! ```
//!
//! The store (stockbook-db) decides which sales belong to a day and upserts
//! the result; this module only turns a set of totals into the three figures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Money, Percentage};
use crate::validation::ValidationResult;

/// Share of total sales reported as estimated margin (20%).
pub const ESTIMATED_MARGIN_RATE: Percentage = Percentage::from_bps(2000);

/// Share of estimated margin reported as estimated savings (30%).
pub const ESTIMATED_SAVINGS_RATE: Percentage = Percentage::from_bps(3000);

/// The three figures stored per calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyRollup {
    pub total_sales: Money,
    pub estimated_margin: Money,
    pub estimated_savings: Money,
}

impl DailyRollup {
    /// Builds the rollup from the day's summed sales.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::{DailyRollup, Money};
    ///
    /// let rollup = DailyRollup::from_total_sales(Money::from_cents(20_000)).unwrap();
    /// assert_eq!(rollup.estimated_margin.cents(), 4_000);
    /// assert_eq!(rollup.estimated_savings.cents(), 1_200);
    /// ```
    pub fn from_total_sales(total_sales: Money) -> ValidationResult<Self> {
        let estimated_margin = total_sales
            .apply_percentage(ESTIMATED_MARGIN_RATE)
            .ok_or_else(|| out_of_range("estimated_margin"))?;
        let estimated_savings = estimated_margin
            .apply_percentage(ESTIMATED_SAVINGS_RATE)
            .ok_or_else(|| out_of_range("estimated_savings"))?;

        Ok(DailyRollup {
            total_sales,
            estimated_margin,
            estimated_savings,
        })
    }

    /// Builds the rollup from individual sale totals.
    ///
    /// An empty day yields all zeros. A day whose totals overflow cents is
    /// an `OutOfRange` error on `total_sales`.
    pub fn from_sale_totals<I>(totals: I) -> ValidationResult<Self>
    where
        I: IntoIterator<Item = Money>,
    {
        let total_sales = Money::checked_sum(totals).ok_or_else(|| out_of_range("total_sales"))?;
        DailyRollup::from_total_sales(total_sales)
    }
}

fn out_of_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

/// Whether a sale write on `sale_date` should trigger the post-commit
/// recompute. Future-dated sales are skipped.
pub fn should_recompute(sale_date: NaiveDate, today: NaiveDate) -> bool {
    sale_date <= today
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_sales_same_day() {
        let rollup = DailyRollup::from_sale_totals([Money::from_cents(5_000), Money::from_cents(15_000)]).unwrap();
        assert_eq!(rollup.total_sales.cents(), 20_000);
        assert_eq!(rollup.estimated_margin.cents(), 4_000);
        assert_eq!(rollup.estimated_savings.cents(), 1_200);
    }

    #[test]
    fn test_empty_day_is_all_zero() {
        let rollup = DailyRollup::from_sale_totals(Vec::new()).unwrap();
        assert_eq!(rollup, DailyRollup::default());
    }

    #[test]
    fn test_ratios_are_applied_in_sequence() {
        // 12.34 × 20% = 2.468 → 2.47; 2.47 × 30% = 0.741 → 0.74
        let rollup = DailyRollup::from_total_sales(Money::from_cents(1_234)).unwrap();
        assert_eq!(rollup.estimated_margin.cents(), 247);
        assert_eq!(rollup.estimated_savings.cents(), 74);
        assert_eq!(
            rollup.estimated_savings,
            rollup.estimated_margin.apply_percentage(ESTIMATED_SAVINGS_RATE).unwrap()
        );
    }

    #[test]
    fn test_overflowing_day_is_out_of_range() {
        let err = DailyRollup::from_sale_totals([Money::from_cents(i64::MAX / 2 + 1); 2]).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "total_sales"));

        // The largest representable day still rolls up
        let rollup = DailyRollup::from_total_sales(Money::from_cents(i64::MAX)).unwrap();
        assert!(rollup.estimated_margin < rollup.total_sales);
    }

    #[test]
    fn test_should_recompute() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert!(should_recompute(today, today));
        assert!(should_recompute(today.pred_opt().unwrap(), today));
        assert!(!should_recompute(today.succ_opt().unwrap(), today));
    }
}
