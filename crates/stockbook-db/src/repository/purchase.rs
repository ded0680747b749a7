//! # Purchase Repository
//!
//! Database operations for purchases.
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Purchase Save (create / update)                   │
//! │                                                                         │
//! │  1. VALIDATE + DERIVE (no I/O)                                         │
//! │     └── compute_purchase_derivatives → unit_cost, sale_price, margins   │
//! │                                                                         │
//! │  2. BEGIN                                                              │
//! │     ├── supplier / product exist?        else UnknownReference         │
//! │     ├── invoice number free?             else Duplicate                │
//! │     ├── INSERT / UPDATE purchase (derived columns overwritten)         │
//! │     └── append price_history(product, sale_price, now)                 │
//! │                                                                         │
//! │  3. COMMIT  (any failure above rolls everything back)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Caller-supplied derived values never reach the table: [`NewPurchase`]
//! only carries inputs, and `unit_cost_cents` there is an explicit override.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::{like_pattern, price_history, require_reference};
use crate::error::{DbError, DbResult};
use stockbook_core::costing::compute_purchase_derivatives;
use stockbook_core::validation::validate_new_purchase;
use stockbook_core::{
    Money, NewPurchase, Percentage, Purchase, PurchaseDerivatives, PurchaseListing, ValidationError,
};

const PURCHASE_COLUMNS: &str = r#"
    id, invoice_number, purchased_on, supplier_id, product_id,
    total_cost_cents, quantity, unit_cost_cents, margin_bps,
    sale_price_cents, unit_margin_cents, total_margin_cents,
    created_at, updated_at
"#;

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Records a purchase and appends its suggested price to the history.
    ///
    /// ## Returns
    /// * `Ok(Purchase)` - Stored purchase with derived fields
    /// * `Err(DbError::Validation)` - Bad input, duplicate invoice or unknown reference
    pub async fn create(&self, input: &NewPurchase) -> DbResult<Purchase> {
        let derived = derive(input)?;
        let invoice = input.invoice_number.trim();

        debug!(invoice = %invoice, product_id = input.product_id, "Creating purchase");

        let mut tx = self.pool.begin().await?;
        check_references(&mut tx, input).await?;
        ensure_invoice_free(&mut tx, invoice, None).await?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO purchases (
                invoice_number, purchased_on, supplier_id, product_id,
                total_cost_cents, quantity, unit_cost_cents, margin_bps,
                sale_price_cents, unit_margin_cents, total_margin_cents,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, ?8,
                ?9, ?10, ?11,
                ?12, ?12
            )
            "#,
        )
        .bind(invoice)
        .bind(input.purchased_on)
        .bind(input.supplier_id)
        .bind(input.product_id)
        .bind(input.total_cost_cents)
        .bind(input.quantity)
        .bind(derived.unit_cost.cents())
        .bind(input.margin_bps)
        .bind(derived.sale_price.cents())
        .bind(derived.unit_margin.cents())
        .bind(derived.total_margin.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        price_history::append_entry(&mut tx, input.product_id, derived.sale_price, now).await?;

        let purchase = fetch(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Purchase", id))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id,
            invoice = %purchase.invoice_number,
            unit_cost = %derived.unit_cost,
            sale_price = %derived.sale_price,
            "Purchase recorded"
        );

        Ok(purchase)
    }

    /// Edits a purchase. Derived fields are recomputed from the new inputs
    /// and a new price-history entry is appended.
    pub async fn update(&self, id: i64, input: &NewPurchase) -> DbResult<Purchase> {
        let derived = derive(input)?;
        let invoice = input.invoice_number.trim();

        debug!(id, invoice = %invoice, "Updating purchase");

        let mut tx = self.pool.begin().await?;
        if fetch(&mut tx, id).await?.is_none() {
            return Err(DbError::not_found("Purchase", id));
        }
        check_references(&mut tx, input).await?;
        ensure_invoice_free(&mut tx, invoice, Some(id)).await?;

        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE purchases SET
                invoice_number = ?2,
                purchased_on = ?3,
                supplier_id = ?4,
                product_id = ?5,
                total_cost_cents = ?6,
                quantity = ?7,
                unit_cost_cents = ?8,
                margin_bps = ?9,
                sale_price_cents = ?10,
                unit_margin_cents = ?11,
                total_margin_cents = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(invoice)
        .bind(input.purchased_on)
        .bind(input.supplier_id)
        .bind(input.product_id)
        .bind(input.total_cost_cents)
        .bind(input.quantity)
        .bind(derived.unit_cost.cents())
        .bind(input.margin_bps)
        .bind(derived.sale_price.cents())
        .bind(derived.unit_margin.cents())
        .bind(derived.total_margin.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        price_history::append_entry(&mut tx, input.product_id, derived.sale_price, now).await?;

        let purchase = fetch(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Purchase", id))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(purchase)
    }

    /// Deletes a purchase. Price history is left untouched.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting purchase");

        let result = sqlx::query("DELETE FROM purchases WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Purchase", id));
        }

        Ok(())
    }

    /// Gets a purchase by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Purchase>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    /// Lists purchases, newest first, optionally filtered by invoice number,
    /// supplier company or product name.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<PurchaseListing>> {
        let pattern = like_pattern(search)?;

        let purchases = sqlx::query_as::<_, PurchaseListing>(
            r#"
            SELECT
                c.id,
                c.invoice_number,
                c.purchased_on,
                c.supplier_id,
                s.company AS supplier_company,
                c.product_id,
                p.name AS product_name,
                c.quantity,
                c.total_cost_cents,
                c.unit_cost_cents,
                c.margin_bps,
                c.sale_price_cents,
                c.total_margin_cents
            FROM purchases c
            INNER JOIN suppliers s ON s.id = c.supplier_id
            INNER JOIN products p ON p.id = c.product_id
            WHERE ?1 IS NULL
               OR c.invoice_number LIKE ?1 ESCAPE '\'
               OR s.company LIKE ?1 ESCAPE '\'
               OR p.name LIKE ?1 ESCAPE '\'
            ORDER BY c.purchased_on DESC, c.id DESC
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    /// Counts total purchases.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn derive(input: &NewPurchase) -> DbResult<PurchaseDerivatives> {
    validate_new_purchase(input)?;

    let derived = compute_purchase_derivatives(
        Money::from_cents(input.total_cost_cents),
        input.quantity,
        Percentage::from_bps(input.margin_bps),
        input.unit_cost_cents.map(Money::from_cents),
    )?;

    Ok(derived)
}

async fn check_references(conn: &mut SqliteConnection, input: &NewPurchase) -> DbResult<()> {
    require_reference(conn, "suppliers", "supplier_id", input.supplier_id).await?;
    require_reference(conn, "products", "product_id", input.product_id).await
}

/// Fails with `Duplicate` when another purchase already uses `invoice`.
async fn ensure_invoice_free(conn: &mut SqliteConnection, invoice: &str, except_id: Option<i64>) -> DbResult<()> {
    let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE invoice_number = ?1 AND id != ?2")
        .bind(invoice)
        .bind(except_id.unwrap_or(0))
        .fetch_one(&mut *conn)
        .await?;

    if taken > 0 {
        return Err(ValidationError::duplicate("invoice_number", invoice).into());
    }
    Ok(())
}

async fn fetch(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Purchase>> {
    let sql = format!("SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = ?1");
    let purchase = sqlx::query_as::<_, Purchase>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(purchase)
}

// =============================================================================
// Unit Tests
// =============================================================================
