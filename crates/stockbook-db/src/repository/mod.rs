//! # Repository Module
//!
//! Database repository implementations for Stockbook.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.purchases().create(&input)                                 │
//! │       ▼                                                                 │
//! │  PurchaseRepository                                                    │
//! │  ├── validate + derive costing (stockbook-core)                        │
//! │  ├── BEGIN                                                             │
//! │  ├── reference / uniqueness checks                                     │
//! │  ├── INSERT purchase                                                   │
//! │  ├── price_history::append_entry  ← same transaction                   │
//! │  └── COMMIT                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Sale writes follow the same shape, with                               │
//! │  analytics::refresh_after_sale_write in place of the price append.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Product CRUD, delete guarded by purchases/sales
//! - [`SupplierRepository`] - Supplier CRUD, unique company, delete guarded by purchases
//! - [`CustomerRepository`] - Customer CRUD, delete detaches sales
//! - [`PurchaseRepository`] - Purchases with derived costing and price history
//! - [`SaleRepository`] - Sales with derived total and daily analytics
//! - [`PriceHistoryRepository`] - Append-only suggested prices
//! - [`AnalyticsRepository`] - Daily rollups
//! - [`InventoryRepository`] - On-read stock valuation
//! - [`ReportRepository`] - Dashboard figures
//!
//! [`ProductRepository`]: product::ProductRepository
//! [`SupplierRepository`]: supplier::SupplierRepository
//! [`CustomerRepository`]: customer::CustomerRepository
//! [`PurchaseRepository`]: purchase::PurchaseRepository
//! [`SaleRepository`]: sale::SaleRepository
//! [`PriceHistoryRepository`]: price_history::PriceHistoryRepository
//! [`AnalyticsRepository`]: analytics::AnalyticsRepository
//! [`InventoryRepository`]: inventory::InventoryRepository
//! [`ReportRepository`]: report::ReportRepository

pub mod analytics;
pub mod customer;
pub mod inventory;
pub mod price_history;
pub mod product;
pub mod purchase;
pub mod report;
pub mod sale;
pub mod supplier;

use sqlx::SqliteConnection;
use stockbook_core::validation::validate_search_query;
use stockbook_core::ValidationError;

use crate::error::DbResult;

// =============================================================================
// Shared helpers
// =============================================================================
// These take a bare connection so they run inside whichever transaction the
// calling repository has open.

/// Whether a row with `id` exists in `table`.
pub(crate) async fn row_exists(conn: &mut SqliteConnection, table: &'static str, id: i64) -> DbResult<bool> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE id = ?1");
    let count: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(&mut *conn).await?;
    Ok(count > 0)
}

/// Fails with `UnknownReference` when `id` is not a row of `table`.
pub(crate) async fn require_reference(
    conn: &mut SqliteConnection,
    table: &'static str,
    field: &str,
    id: i64,
) -> DbResult<()> {
    if !row_exists(conn, table, id).await? {
        return Err(ValidationError::unknown_reference(field, id).into());
    }
    Ok(())
}

/// Number of rows in `table` whose `column` equals `id`.
pub(crate) async fn count_referencing(
    conn: &mut SqliteConnection,
    table: &'static str,
    column: &'static str,
    id: i64,
) -> DbResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1");
    let count: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(&mut *conn).await?;
    Ok(count)
}

/// Turns a user search term into a `LIKE` pattern.
///
/// Returns `None` for an empty term, which the queries treat as "no filter"
/// via `?1 IS NULL`. `%`, `_` and `\` are escaped; queries use `ESCAPE '\'`.
pub(crate) fn like_pattern(query: Option<&str>) -> DbResult<Option<String>> {
    let Some(query) = query else {
        return Ok(None);
    };

    let query = validate_search_query(query)?;
    if query.is_empty() {
        return Ok(None);
    }

    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    Ok(Some(escaped))
}

/// Trims an optional text field, mapping blank to `None`.
pub(crate) fn clean_optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

// =============================================================================
// Test support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use stockbook_core::{Customer, NewCustomer, NewProduct, NewPurchase, NewSale, NewSupplier, Product, Supplier};

    use crate::{Database, DbConfig};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn product(db: &Database, name: &str) -> Product {
        db.products()
            .create(&NewProduct {
                name: name.to_string(),
                brand: None,
            })
            .await
            .unwrap()
    }

    pub async fn supplier(db: &Database, company: &str) -> Supplier {
        db.suppliers()
            .create(&NewSupplier {
                company: company.to_string(),
                phone: None,
                products: None,
            })
            .await
            .unwrap()
    }

    pub async fn customer(db: &Database, first_name: &str, last_name: &str) -> Customer {
        db.customers()
            .create(&NewCustomer {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            })
            .await
            .unwrap()
    }

    pub fn purchase_input(
        invoice: &str,
        supplier_id: i64,
        product_id: i64,
        total_cost_cents: i64,
        quantity: i64,
        margin_bps: u32,
    ) -> NewPurchase {
        NewPurchase {
            invoice_number: invoice.to_string(),
            purchased_on: chrono::Utc::now().date_naive(),
            supplier_id,
            product_id,
            total_cost_cents,
            quantity,
            margin_bps,
            unit_cost_cents: None,
        }
    }

    pub fn sale_input(product_id: i64, unit_price_cents: i64, quantity: i64) -> NewSale {
        NewSale {
            product_id,
            customer_id: None,
            unit_price_cents,
            quantity,
            created_at: None,
        }
    }
}
