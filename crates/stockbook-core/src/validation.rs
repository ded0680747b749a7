//! # Validation Module
//!
//! Input validation for ledger writes.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request handler (deserialization, types)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - field rules (required, ranges, positivity)     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: stockbook-db write transaction                               │
//! │  ├── unique keys checked before insert (invoice, company)              │
//! │  ├── referenced rows checked before insert                             │
//! │  └── SQLite NOT NULL / UNIQUE / FOREIGN KEY as the last backstop       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{NewCustomer, NewProduct, NewPurchase, NewSale, NewSupplier};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a product name.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;
/// Maximum length of brands and customer names.
pub const MAX_SHORT_TEXT_LEN: usize = 100;
/// Maximum length of a supplier company name.
pub const MAX_COMPANY_LEN: usize = 200;
/// Maximum length of a phone number.
pub const MAX_PHONE_LEN: usize = 20;
/// Maximum length of an invoice number.
pub const MAX_INVOICE_LEN: usize = 50;
/// Largest accepted margin: 999.99%.
pub const MAX_MARGIN_BPS: u32 = 99_999;
/// Largest accepted money amount: 99,999,999.99.
pub const MAX_AMOUNT_CENTS: i64 = 9_999_999_999;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required, length-bounded text field.
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_required_text;
///
/// assert!(validate_required_text("name", "Arroz 1kg", 200).is_ok());
/// assert!(validate_required_text("name", "   ", 200).is_err());
/// assert!(validate_required_text("name", &"A".repeat(201), 200).is_err());
/// ```
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    validate_max_len(field, value, max)
}

/// Validates an optional, length-bounded text field.
pub fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) => validate_max_len(field, v.trim(), max),
        None => Ok(()),
    }
}

fn validate_max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a search query and returns it trimmed.
///
/// Empty queries are allowed and mean "no filter".
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// Purchases divide by this value, so it is checked before any costing runs.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a money amount in cents.
///
/// ## Rules
/// - Must not be negative
/// - At most [`MAX_AMOUNT_CENTS`] (ten digits, two of them decimals)
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::{validate_amount_cents, MAX_AMOUNT_CENTS};
///
/// assert!(validate_amount_cents("total_cost", 1099).is_ok());
/// assert!(validate_amount_cents("total_cost", 0).is_ok());
/// assert!(validate_amount_cents("total_cost", MAX_AMOUNT_CENTS).is_ok());
/// assert!(validate_amount_cents("total_cost", -100).is_err());
/// assert!(validate_amount_cents("total_cost", MAX_AMOUNT_CENTS + 1).is_err());
/// ```
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Validates a margin percentage in basis points.
pub fn validate_margin_bps(bps: u32) -> ValidationResult<()> {
    if bps > MAX_MARGIN_BPS {
        return Err(ValidationError::OutOfRange {
            field: "margin_percentage".to_string(),
            min: 0,
            max: MAX_MARGIN_BPS as i64,
        });
    }

    Ok(())
}

/// Validates a surrogate identifier used as a reference.
pub fn validate_reference_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates product fields.
pub fn validate_new_product(input: &NewProduct) -> ValidationResult<()> {
    validate_required_text("name", &input.name, MAX_PRODUCT_NAME_LEN)?;
    validate_optional_text("brand", input.brand.as_deref(), MAX_SHORT_TEXT_LEN)
}

/// Validates supplier fields.
pub fn validate_new_supplier(input: &NewSupplier) -> ValidationResult<()> {
    validate_required_text("company", &input.company, MAX_COMPANY_LEN)?;
    validate_optional_text("phone", input.phone.as_deref(), MAX_PHONE_LEN)
}

/// Validates customer fields.
pub fn validate_new_customer(input: &NewCustomer) -> ValidationResult<()> {
    validate_required_text("first_name", &input.first_name, MAX_SHORT_TEXT_LEN)?;
    validate_required_text("last_name", &input.last_name, MAX_SHORT_TEXT_LEN)
}

/// Validates purchase inputs. Costing repeats the numeric checks it relies on.
pub fn validate_new_purchase(input: &NewPurchase) -> ValidationResult<()> {
    validate_required_text("invoice_number", &input.invoice_number, MAX_INVOICE_LEN)?;
    validate_reference_id("supplier_id", input.supplier_id)?;
    validate_reference_id("product_id", input.product_id)?;
    validate_quantity(input.quantity)?;
    validate_amount_cents("total_cost", input.total_cost_cents)?;
    validate_margin_bps(input.margin_bps)?;
    if let Some(unit_cost) = input.unit_cost_cents {
        validate_amount_cents("unit_cost", unit_cost)?;
    }
    Ok(())
}

/// Validates sale inputs.
pub fn validate_new_sale(input: &NewSale) -> ValidationResult<()> {
    validate_reference_id("product_id", input.product_id)?;
    if let Some(customer_id) = input.customer_id {
        validate_reference_id("customer_id", customer_id)?;
    }
    validate_quantity(input.quantity)?;
    validate_amount_cents("unit_price", input.unit_price_cents)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn purchase() -> NewPurchase {
        NewPurchase {
            invoice_number: "F-001".to_string(),
            purchased_on: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            supplier_id: 1,
            product_id: 1,
            total_cost_cents: 10_000,
            quantity: 10,
            margin_bps: 2000,
            unit_cost_cents: None,
        }
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(5000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_required_text_counts_chars() {
        // 100 two-byte characters are still 100 characters
        assert!(validate_required_text("brand", &"ñ".repeat(100), 100).is_ok());
        assert!(validate_required_text("brand", &"ñ".repeat(101), 100).is_err());
    }

    #[test]
    fn test_validate_new_purchase() {
        assert!(validate_new_purchase(&purchase()).is_ok());

        let mut p = purchase();
        p.invoice_number = " ".to_string();
        assert!(matches!(
            validate_new_purchase(&p),
            Err(ValidationError::Required { .. })
        ));

        let mut p = purchase();
        p.quantity = 0;
        assert!(matches!(
            validate_new_purchase(&p),
            Err(ValidationError::MustBePositive { .. })
        ));

        let mut p = purchase();
        p.supplier_id = 0;
        assert!(validate_new_purchase(&p).is_err());

        let mut p = purchase();
        p.margin_bps = MAX_MARGIN_BPS + 1;
        assert!(matches!(
            validate_new_purchase(&p),
            Err(ValidationError::OutOfRange { .. })
        ));

        let mut p = purchase();
        p.unit_cost_cents = Some(-1);
        assert!(validate_new_purchase(&p).is_err());

        let mut p = purchase();
        p.unit_cost_cents = Some(1_000_000_000_000_000_000);
        assert!(matches!(
            validate_new_purchase(&p),
            Err(ValidationError::OutOfRange { .. })
        ));

        let mut p = purchase();
        p.total_cost_cents = MAX_AMOUNT_CENTS + 1;
        assert!(matches!(
            validate_new_purchase(&p),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_new_sale() {
        let sale = NewSale {
            product_id: 1,
            customer_id: None,
            unit_price_cents: 1200,
            quantity: 2,
            created_at: None,
        };
        assert!(validate_new_sale(&sale).is_ok());

        let bad = NewSale { quantity: 0, ..sale.clone() };
        assert!(validate_new_sale(&bad).is_err());

        let bad = NewSale { unit_price_cents: -1, ..sale.clone() };
        assert!(validate_new_sale(&bad).is_err());

        let bad = NewSale {
            unit_price_cents: MAX_AMOUNT_CENTS + 1,
            ..sale
        };
        assert!(matches!(
            validate_new_sale(&bad),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_entities() {
        assert!(validate_new_supplier(&NewSupplier {
            company: "Distribuidora Norte".to_string(),
            phone: Some("555-0101".to_string()),
            products: None,
        })
        .is_ok());

        assert!(validate_new_supplier(&NewSupplier {
            company: "X".to_string(),
            phone: Some("0".repeat(21)),
            products: None,
        })
        .is_err());

        assert!(validate_new_customer(&NewCustomer {
            first_name: "Ana".to_string(),
            last_name: String::new(),
        })
        .is_err());

        assert!(validate_new_product(&NewProduct {
            name: "Arroz".to_string(),
            brand: None,
        })
        .is_ok());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  arroz ").unwrap(), "arroz");
        assert!(validate_search_query(&"a".repeat(101)).is_err());
    }
}
