//! # Sale Repository
//!
//! Database operations for sales.
//!
//! ## Sale Write Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Write                                        │
//! │                                                                         │
//! │  1. VALIDATE + TOTAL (no I/O)                                          │
//! │     └── compute_sale_total → unit_price × quantity                     │
//! │                                                                         │
//! │  2. BEGIN                                                              │
//! │     ├── product exists? customer exists (if given)?                    │
//! │     ├── INSERT / UPDATE / DELETE sale                                  │
//! │     └── refresh_after_sale_write(days touched)                         │
//! │             └── recompute DailyAnalytics for each day ≤ today          │
//! │                                                                         │
//! │  3. COMMIT                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `sale_date` is the UTC day of `created_at` and is the key the daily
//! analytics are grouped by.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::{analytics, like_pattern, require_reference};
use crate::error::{DbError, DbResult};
use stockbook_core::costing::compute_sale_total;
use stockbook_core::validation::validate_new_sale;
use stockbook_core::{Money, NewSale, Sale, SaleListing};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale and refreshes that day's analytics.
    ///
    /// `created_at` defaults to now. The stored total is always
    /// `unit_price × quantity`.
    pub async fn create(&self, input: &NewSale) -> DbResult<Sale> {
        let total = derive_total(input)?;
        let created_at = input.created_at.unwrap_or_else(Utc::now);
        let sale_date = created_at.date_naive();

        debug!(product_id = input.product_id, total = %total, %sale_date, "Creating sale");

        let mut tx = self.pool.begin().await?;
        check_references(&mut tx, input).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO sales (
                product_id, customer_id, unit_price_cents, quantity,
                total_cents, sale_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(input.product_id)
        .bind(input.customer_id)
        .bind(input.unit_price_cents)
        .bind(input.quantity)
        .bind(total.cents())
        .bind(sale_date)
        .bind(created_at)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        analytics::refresh_after_sale_write(&mut tx, &[sale_date]).await?;

        let sale = fetch(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id, total = %total, %sale_date, "Sale recorded");

        Ok(sale)
    }

    /// Edits a sale. The total is recomputed; `created_at: None` keeps the
    /// stored timestamp. Both the old and the new day are refreshed.
    pub async fn update(&self, id: i64, input: &NewSale) -> DbResult<Sale> {
        let total = derive_total(input)?;

        debug!(id, total = %total, "Updating sale");

        let mut tx = self.pool.begin().await?;
        let existing = fetch(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;
        check_references(&mut tx, input).await?;

        let created_at = input.created_at.unwrap_or(existing.created_at);
        let sale_date = created_at.date_naive();

        sqlx::query(
            r#"
            UPDATE sales SET
                product_id = ?2,
                customer_id = ?3,
                unit_price_cents = ?4,
                quantity = ?5,
                total_cents = ?6,
                sale_date = ?7,
                created_at = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.product_id)
        .bind(input.customer_id)
        .bind(input.unit_price_cents)
        .bind(input.quantity)
        .bind(total.cents())
        .bind(sale_date)
        .bind(created_at)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        analytics::refresh_after_sale_write(&mut tx, &[existing.sale_date, sale_date]).await?;

        let sale = fetch(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(sale)
    }

    /// Deletes a sale and refreshes its day.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting sale");

        let mut tx = self.pool.begin().await?;
        let existing = fetch(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        analytics::refresh_after_sale_write(&mut tx, &[existing.sale_date]).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    /// Lists sales, newest first, optionally filtered by product name or
    /// customer first/last name.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<SaleListing>> {
        let pattern = like_pattern(search)?;

        let sales = sqlx::query_as::<_, SaleListing>(
            r#"
            SELECT
                v.id,
                v.product_id,
                p.name AS product_name,
                v.customer_id,
                CASE WHEN c.id IS NULL THEN NULL
                     ELSE c.first_name || ' ' || c.last_name
                END AS customer_name,
                v.unit_price_cents,
                v.quantity,
                v.total_cents,
                v.sale_date,
                v.created_at
            FROM sales v
            INNER JOIN products p ON p.id = v.product_id
            LEFT JOIN customers c ON c.id = v.customer_id
            WHERE ?1 IS NULL
               OR p.name LIKE ?1 ESCAPE '\'
               OR c.first_name LIKE ?1 ESCAPE '\'
               OR c.last_name LIKE ?1 ESCAPE '\'
            ORDER BY v.created_at DESC, v.id DESC
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Counts total sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn derive_total(input: &NewSale) -> DbResult<Money> {
    validate_new_sale(input)?;
    Ok(compute_sale_total(Money::from_cents(input.unit_price_cents), input.quantity)?)
}

async fn check_references(conn: &mut SqliteConnection, input: &NewSale) -> DbResult<()> {
    require_reference(conn, "products", "product_id", input.product_id).await?;
    if let Some(customer_id) = input.customer_id {
        require_reference(conn, "customers", "customer_id", customer_id).await?;
    }
    Ok(())
}

async fn fetch(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>(
        r#"
        SELECT
            id, product_id, customer_id, unit_price_cents, quantity,
            total_cents, sale_date, created_at, updated_at
        FROM sales
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(sale)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;
    use chrono::{NaiveDate, TimeZone};
    use stockbook_core::ValidationError;

    #[tokio::test]
    async fn test_total_is_derived() {
        let db = test_db().await;
        let p = product(&db, "Leche").await;

        let sale = db.sales().create(&sale_input(p.id, 1_250, 4)).await.unwrap();

        assert_eq!(sale.total_cents, 5_000);
        assert_eq!(sale.sale_date, sale.created_at.date_naive());
    }

    #[tokio::test]
    async fn test_negative_quantity_rejected() {
        let db = test_db().await;
        let p = product(&db, "Leche").await;

        let err = db.sales().create(&sale_input(p.id, 1_250, -1)).await.unwrap_err();

        assert!(matches!(err, DbError::Validation(ValidationError::MustBePositive { .. })));
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(db.analytics().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_customer_rejected() {
        let db = test_db().await;
        let p = product(&db, "Leche").await;

        let mut input = sale_input(p.id, 100, 1);
        input.customer_id = Some(12);
        let err = db.sales().create(&input).await.unwrap_err();

        assert!(matches!(
            err,
            DbError::Validation(ValidationError::UnknownReference { id: 12, .. })
        ));
    }

    #[tokio::test]
    async fn test_moving_a_sale_refreshes_both_days() {
        let db = test_db().await;
        let p = product(&db, "Leche").await;
        let day1 = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap();

        let mut input = sale_input(p.id, 1_000, 3);
        input.created_at = Some(day1);
        let sale = db.sales().create(&input).await.unwrap();

        input.created_at = Some(day2);
        input.quantity = 2;
        let moved = db.sales().update(sale.id, &input).await.unwrap();
        assert_eq!(moved.total_cents, 2_000);

        let d1 = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        assert_eq!(db.analytics().get(d1).await.unwrap().unwrap().total_sales_cents, 0);
        assert_eq!(db.analytics().get(d2).await.unwrap().unwrap().total_sales_cents, 2_000);
    }

    #[tokio::test]
    async fn test_update_without_timestamp_keeps_day() {
        let db = test_db().await;
        let p = product(&db, "Leche").await;
        let day = Utc.with_ymd_and_hms(2025, 4, 10, 18, 30, 0).unwrap();

        let mut input = sale_input(p.id, 500, 1);
        input.created_at = Some(day);
        let sale = db.sales().create(&input).await.unwrap();

        let edited = db.sales().update(sale.id, &sale_input(p.id, 700, 1)).await.unwrap();
        assert_eq!(edited.created_at, day);
        assert_eq!(edited.total_cents, 700);
    }

    #[tokio::test]
    async fn test_delete_recomputes_day() {
        let db = test_db().await;
        let p = product(&db, "Leche").await;
        let today = Utc::now().date_naive();

        let keep = db.sales().create(&sale_input(p.id, 1_000, 1)).await.unwrap();
        let gone = db.sales().create(&sale_input(p.id, 4_000, 1)).await.unwrap();
        assert_eq!(db.analytics().get(today).await.unwrap().unwrap().total_sales_cents, 5_000);

        db.sales().delete(gone.id).await.unwrap();

        assert_eq!(db.analytics().get(today).await.unwrap().unwrap().total_sales_cents, 1_000);
        assert!(db.sales().get_by_id(keep.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_shows_customer_name() {
        let db = test_db().await;
        let p = product(&db, "Leche").await;
        let c = customer(&db, "Ana", "Pérez").await;

        let mut input = sale_input(p.id, 100, 1);
        input.customer_id = Some(c.id);
        db.sales().create(&input).await.unwrap();
        db.sales().create(&sale_input(p.id, 200, 1)).await.unwrap();

        let all = db.sales().list(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].customer_name, None);
        assert_eq!(all[1].customer_name.as_deref(), Some("Ana Pérez"));

        let by_customer = db.sales().list(Some("pérez")).await.unwrap();
        assert_eq!(by_customer.len(), 1);
    }
}
