//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Reference data          Transactions              Derived records      │
//! │  ┌──────────────┐        ┌──────────────────┐      ┌──────────────────┐ │
//! │  │  Product     │◄───────│  Purchase        │─────►│ PriceHistoryEntry│ │
//! │  │  Supplier    │◄───────│   unit_cost      │      │  (append-only)   │ │
//! │  │  Customer    │◄──┐    │   sale_price ... │      └──────────────────┘ │
//! │  └──────────────┘   │    └──────────────────┘      ┌──────────────────┐ │
//! │                     └────│  Sale            │─────►│ DailyAnalytics   │ │
//! │                  (nullable)  total         │      │  (upsert by date)│ │
//! │                          └──────────────────┘      └──────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Storage Conventions
//! - Identifiers are surrogate integers assigned by the store.
//! - Money fields are integer cents (`*_cents`), exposed as [`Money`] via accessors.
//! - Percentages are basis points (`*_bps`), exposed as [`Percentage`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, Percentage};

// =============================================================================
// Product
// =============================================================================

/// A product that is bought from suppliers and sold to customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating or editing a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub brand: Option<String>,
}

// =============================================================================
// Supplier
// =============================================================================

/// A supplier ("proveedor"). The company name is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: i64,
    pub company: String,
    pub phone: Option<String>,
    /// Free-text list of the products this supplier carries.
    pub products: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating or editing a supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSupplier {
    pub company: String,
    pub phone: Option<String>,
    pub products: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer. Sales may reference one, or none for anonymous sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// "First Last", as shown on sale listings.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields for creating or editing a customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
}

// =============================================================================
// Purchase
// =============================================================================

/// A recorded acquisition of stock from a supplier.
///
/// `unit_cost_cents`, `sale_price_cents`, `unit_margin_cents` and
/// `total_margin_cents` are derived; see [`crate::costing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Purchase {
    pub id: i64,
    /// Supplier invoice number, unique across purchases.
    pub invoice_number: String,
    #[ts(as = "String")]
    pub purchased_on: NaiveDate,
    pub supplier_id: i64,
    pub product_id: i64,
    pub total_cost_cents: i64,
    pub quantity: i64,
    pub unit_cost_cents: i64,
    /// Margin input in basis points (2000 = 20%).
    pub margin_bps: u32,
    pub sale_price_cents: i64,
    pub unit_margin_cents: i64,
    pub total_margin_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Purchase {
    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }

    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }

    #[inline]
    pub fn margin(&self) -> Percentage {
        Percentage::from_bps(self.margin_bps)
    }

    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    #[inline]
    pub fn unit_margin(&self) -> Money {
        Money::from_cents(self.unit_margin_cents)
    }

    #[inline]
    pub fn total_margin(&self) -> Money {
        Money::from_cents(self.total_margin_cents)
    }
}

/// Input fields of a purchase, used for both create and edit.
///
/// The derived money fields are never accepted from the caller, with one
/// exception: `unit_cost_cents` may carry an explicit override.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPurchase {
    pub invoice_number: String,
    #[ts(as = "String")]
    pub purchased_on: NaiveDate,
    pub supplier_id: i64,
    pub product_id: i64,
    pub total_cost_cents: i64,
    pub quantity: i64,
    pub margin_bps: u32,
    /// Explicit unit cost. `None` or zero means "derive from total / quantity".
    #[serde(default)]
    pub unit_cost_cents: Option<i64>,
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded disposal of stock, optionally to a known customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    pub product_id: i64,
    pub customer_id: Option<i64>,
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// Always `unit_price_cents × quantity`.
    pub total_cents: i64,
    /// UTC calendar day of `created_at`; the daily analytics key.
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Input fields of a sale, used for both create and edit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub product_id: i64,
    #[serde(default)]
    pub customer_id: Option<i64>,
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// Creation timestamp. On create `None` means now; on edit `None` keeps
    /// the stored timestamp.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Price History
// =============================================================================

/// An immutable, timestamped suggested sale price for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PriceHistoryEntry {
    pub id: i64,
    pub product_id: i64,
    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
    pub suggested_price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl PriceHistoryEntry {
    #[inline]
    pub fn suggested_price(&self) -> Money {
        Money::from_cents(self.suggested_price_cents)
    }
}

/// A price-history entry joined with its product, for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PriceHistoryListing {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_brand: Option<String>,
    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
    pub suggested_price_cents: i64,
}

// =============================================================================
// Daily Analytics
// =============================================================================

/// Per-calendar-day rollup of sales. One row per date, overwritten on
/// every recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DailyAnalytics {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total_sales_cents: i64,
    pub estimated_margin_cents: i64,
    pub estimated_savings_cents: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl DailyAnalytics {
    #[inline]
    pub fn total_sales(&self) -> Money {
        Money::from_cents(self.total_sales_cents)
    }

    #[inline]
    pub fn estimated_margin(&self) -> Money {
        Money::from_cents(self.estimated_margin_cents)
    }

    #[inline]
    pub fn estimated_savings(&self) -> Money {
        Money::from_cents(self.estimated_savings_cents)
    }
}

// =============================================================================
// Listings & Dashboard
// =============================================================================

/// A purchase joined with its supplier and product names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseListing {
    pub id: i64,
    pub invoice_number: String,
    #[ts(as = "String")]
    pub purchased_on: NaiveDate,
    pub supplier_id: i64,
    pub supplier_company: String,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub total_cost_cents: i64,
    pub unit_cost_cents: i64,
    pub margin_bps: u32,
    pub sale_price_cents: i64,
    pub total_margin_cents: i64,
}

/// A sale joined with its product and (optional) customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleListing {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub customer_id: Option<i64>,
    /// "First Last", absent for anonymous sales.
    pub customer_name: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Best seller entry on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TopProduct {
    pub product_id: i64,
    pub name: String,
    pub units_sold: i64,
    pub revenue_cents: i64,
}

/// Landing page summary: entity counts, month-to-date totals and the five
/// best-selling products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardSummary {
    pub product_count: i64,
    pub supplier_count: i64,
    pub customer_count: i64,
    #[ts(as = "String")]
    pub month_start: NaiveDate,
    pub month_purchases_cents: i64,
    pub month_purchased_units: i64,
    pub month_sales_cents: i64,
    pub month_sold_units: i64,
    pub top_products: Vec<TopProduct>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_customer_full_name() {
        let customer = Customer {
            id: 1,
            first_name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            created_at: ts(),
            updated_at: ts(),
        };
        assert_eq!(customer.full_name(), "Ana Pérez");
    }

    #[test]
    fn test_new_purchase_override_defaults_to_none() {
        let json = r#"{
            "invoice_number": "F-001",
            "purchased_on": "2026-03-01",
            "supplier_id": 1,
            "product_id": 2,
            "total_cost_cents": 10000,
            "quantity": 10,
            "margin_bps": 2000
        }"#;
        let input: NewPurchase = serde_json::from_str(json).unwrap();
        assert_eq!(input.unit_cost_cents, None);
        assert_eq!(input.purchased_on, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }

    #[test]
    fn test_money_accessors() {
        let sale = Sale {
            id: 1,
            product_id: 1,
            customer_id: None,
            unit_price_cents: 1250,
            quantity: 4,
            total_cents: 5000,
            sale_date: ts().date_naive(),
            created_at: ts(),
            updated_at: ts(),
        };
        assert_eq!(sale.unit_price(), Money::from_cents(1250));
        assert_eq!(sale.total().to_string(), "50.00");
    }
}
