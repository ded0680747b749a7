//! # Costing Module
//!
//! Derived money fields of purchases and sales.
//!
//! ## Purchase Derivatives
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  total_cost, quantity, margin%, unit_cost_override?                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  unit_cost   = override (if non-zero) else total_cost / quantity       │
//! │  sale_price  = unit_cost + round(unit_cost × margin%)                  │
//! │  unit_margin = sale_price - unit_cost                                  │
//! │  total_margin= unit_margin × quantity                                  │
//! │                                                                         │
//! │  Re-run on EVERY save: editing any input re-derives all four outputs.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is exactly one formula. The margin is rounded once and the sale
//! price is built from it, so `sale_price - unit_cost == unit_margin` and
//! `unit_margin × quantity == total_margin` hold exactly in cents whether the
//! unit cost was derived or overridden. Every step is checked; a result that
//! does not fit in cents is an `OutOfRange` error, never a wrapped value.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Money, Percentage};
use crate::validation::{validate_amount_cents, validate_margin_bps, validate_quantity, ValidationResult};

// =============================================================================
// Purchase Costing
// =============================================================================

/// The four derived money fields of a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseDerivatives {
    pub unit_cost: Money,
    pub sale_price: Money,
    pub unit_margin: Money,
    pub total_margin: Money,
}

/// Computes unit cost, sale price, unit margin and total margin.
///
/// ## Errors
/// `ValidationError` when `quantity <= 0`, `total_cost < 0`, the override is
/// negative, the margin is out of range, or the result does not fit in cents.
/// The quantity check runs before any division.
///
/// ## Example
/// ```rust
/// use stockbook_core::costing::compute_purchase_derivatives;
/// use stockbook_core::{Money, Percentage};
///
/// // Override wins over total / quantity
/// let d = compute_purchase_derivatives(
///     Money::from_cents(10_000),
///     10,
///     Percentage::from_bps(5000),
///     Some(Money::from_cents(800)),
/// )
/// .unwrap();
/// assert_eq!(d.unit_cost.cents(), 800);
/// assert_eq!(d.sale_price.cents(), 1200);
/// ```
pub fn compute_purchase_derivatives(
    total_cost: Money,
    quantity: i64,
    margin: Percentage,
    unit_cost_override: Option<Money>,
) -> ValidationResult<PurchaseDerivatives> {
    validate_quantity(quantity)?;
    validate_amount_cents("total_cost", total_cost.cents())?;
    validate_margin_bps(margin.bps())?;

    let unit_cost = match unit_cost_override.filter(|cost| !cost.is_zero()) {
        Some(cost) => {
            validate_amount_cents("unit_cost", cost.cents())?;
            cost
        }
        None => total_cost.divide_by(quantity).ok_or(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        })?,
    };

    let unit_margin = unit_cost
        .apply_percentage(margin)
        .ok_or_else(|| overflow("unit_margin"))?;
    let sale_price = unit_cost
        .checked_add(unit_margin)
        .ok_or_else(|| overflow("sale_price"))?;
    let total_margin = unit_margin
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| overflow("total_margin"))?;

    Ok(PurchaseDerivatives {
        unit_cost,
        sale_price,
        unit_margin,
        total_margin,
    })
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Computes a sale line total: `unit_price × quantity`.
///
/// Called on every sale save; whatever total the caller had is replaced.
///
/// ## Example
/// ```rust
/// use stockbook_core::costing::compute_sale_total;
/// use stockbook_core::Money;
///
/// let total = compute_sale_total(Money::from_cents(1250), 4).unwrap();
/// assert_eq!(total.cents(), 5000);
/// assert!(compute_sale_total(Money::from_cents(1250), 0).is_err());
/// ```
pub fn compute_sale_total(unit_price: Money, quantity: i64) -> ValidationResult<Money> {
    validate_quantity(quantity)?;
    validate_amount_cents("unit_price", unit_price.cents())?;

    unit_price
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| overflow("total"))
}

fn overflow(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
