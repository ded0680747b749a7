//! # Report Repository
//!
//! Read-only figures for the landing dashboard.

use chrono::{Datelike, NaiveDate};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockbook_core::{DashboardSummary, TopProduct};

/// Number of best sellers shown on the dashboard.
pub const TOP_PRODUCTS_LIMIT: i64 = 5;

/// Repository for dashboard reporting.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Builds the dashboard for the month containing `today`.
    ///
    /// Month totals cover purchases dated, and sales made, on or after the
    /// first of that month. Sales money is the sum of sale totals. The top
    /// products ranking is all-time, by units sold.
    pub async fn dashboard(&self, today: NaiveDate) -> DbResult<DashboardSummary> {
        let month_start = today
            .with_day(1)
            .ok_or_else(|| DbError::Internal(format!("no first day for {today}")))?;

        debug!(%month_start, "Building dashboard");

        let (product_count, supplier_count, customer_count): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products),
                (SELECT COUNT(*) FROM suppliers),
                (SELECT COUNT(*) FROM customers)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let (month_purchases_cents, month_purchased_units): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_cost_cents), 0), COALESCE(SUM(quantity), 0)
            FROM purchases
            WHERE purchased_on >= ?1
            "#,
        )
        .bind(month_start)
        .fetch_one(&self.pool)
        .await?;

        let (month_sales_cents, month_sold_units): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_cents), 0), COALESCE(SUM(quantity), 0)
            FROM sales
            WHERE sale_date >= ?1
            "#,
        )
        .bind(month_start)
        .fetch_one(&self.pool)
        .await?;

        let top_products = self.top_products(TOP_PRODUCTS_LIMIT).await?;

        Ok(DashboardSummary {
            product_count,
            supplier_count,
            customer_count,
            month_start,
            month_purchases_cents,
            month_purchased_units,
            month_sales_cents,
            month_sold_units,
            top_products,
        })
    }

    /// Best sellers by units sold, ties broken by product id.
    pub async fn top_products(&self, limit: i64) -> DbResult<Vec<TopProduct>> {
        let rows = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT
                p.id AS product_id,
                p.name,
                SUM(v.quantity) AS units_sold,
                SUM(v.total_cents) AS revenue_cents
            FROM sales v
            INNER JOIN products p ON p.id = v.product_id
            GROUP BY p.id, p.name
            ORDER BY units_sold DESC, p.id
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_empty_dashboard() {
        let db = test_db().await;
        let today = NaiveDate::from_ymd_opt(2026, 2, 17).unwrap();

        let summary = db.reports().dashboard(today).await.unwrap();

        assert_eq!(summary.month_start, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(summary.product_count, 0);
        assert_eq!(summary.month_sales_cents, 0);
        assert!(summary.top_products.is_empty());
    }

    #[tokio::test]
    async fn test_month_totals_and_top_products() {
        let db = test_db().await;
        let s = supplier(&db, "Norte").await;
        let cafe = product(&db, "Cafe").await;
        let te = product(&db, "Te").await;
        customer(&db, "Ana", "Pérez").await;

        db.purchases()
            .create(&purchase_input("F-1", s.id, cafe.id, 10_000, 10, 2000))
            .await
            .unwrap();
        let mut old = purchase_input("F-0", s.id, te.id, 3_000, 3, 2000);
        old.purchased_on = Utc::now().date_naive() - Duration::days(400);
        db.purchases().create(&old).await.unwrap();

        db.sales().create(&sale_input(cafe.id, 1_200, 2)).await.unwrap();
        db.sales().create(&sale_input(te.id, 1_000, 5)).await.unwrap();

        let summary = db.reports().dashboard(Utc::now().date_naive()).await.unwrap();

        assert_eq!(summary.product_count, 2);
        assert_eq!(summary.supplier_count, 1);
        assert_eq!(summary.customer_count, 1);
        assert_eq!(summary.month_purchases_cents, 10_000);
        assert_eq!(summary.month_purchased_units, 10);
        assert_eq!(summary.month_sales_cents, 2_400 + 5_000);
        assert_eq!(summary.month_sold_units, 7);

        assert_eq!(summary.top_products.len(), 2);
        assert_eq!(summary.top_products[0].name, "Te");
        assert_eq!(summary.top_products[0].units_sold, 5);
        assert_eq!(summary.top_products[1].revenue_cents, 2_400);
    }
}
