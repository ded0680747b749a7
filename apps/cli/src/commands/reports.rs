//! # Report Commands
//!
//! Read-mostly views over the ledger: inventory, daily analytics and the
//! dashboard. `recompute` is the one write here; it rebuilds daily rollups
//! from the stored sales.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use stockbook_core::{DailyAnalytics, DashboardSummary, InventoryQuery, InventoryStatistics, ProductStockLine};
use stockbook_db::Database;

/// What `recompute` rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeScope {
    Day(NaiveDate),
    All,
}

/// Result of a recompute run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recomputed {
    pub days: usize,
    pub rows: Vec<DailyAnalytics>,
}

// =============================================================================
// Inventory
// =============================================================================

pub async fn inventory(db: &Database, query: &InventoryQuery) -> Result<Vec<ProductStockLine>, ApiError> {
    Ok(db.inventory().snapshot(query).await?)
}

pub async fn inventory_stats(db: &Database, query: &InventoryQuery) -> Result<InventoryStatistics, ApiError> {
    Ok(db.inventory().statistics(query).await?)
}

pub async fn product_stock(db: &Database, product_id: i64) -> Result<ProductStockLine, ApiError> {
    db.inventory()
        .for_product(product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", product_id))
}

// =============================================================================
// Analytics & Dashboard
// =============================================================================

/// Stored rollups between two dates, inclusive, oldest first.
pub async fn analytics(db: &Database, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyAnalytics>, ApiError> {
    if from > to {
        return Err(ApiError::validation(format!("--from {} is after --to {}", from, to)));
    }
    Ok(db.analytics().range(from, to).await?)
}

pub async fn recompute(db: &Database, scope: RecomputeScope) -> Result<Recomputed, ApiError> {
    let rows = match scope {
        RecomputeScope::Day(date) => vec![db.analytics().recompute(date).await?],
        RecomputeScope::All => db.analytics().recompute_all().await?,
    };

    info!(days = rows.len(), "Daily analytics recomputed");
    Ok(Recomputed { days: rows.len(), rows })
}

pub async fn dashboard(db: &Database, today: NaiveDate) -> Result<DashboardSummary, ApiError> {
    Ok(db.reports().dashboard(today).await?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use crate::error::ErrorCode;
    use chrono::{TimeZone, Utc};
    use stockbook_core::{NewSale, StockBand};

    #[tokio::test]
    async fn test_inventory_after_purchase_and_sales() {
        let db = test_db().await;
        let (_, product_id) = stocked_product(&db, "Harina").await;
        for _ in 0..7 {
            sell(&db, product_id, None).await;
        }

        let line = product_stock(&db, product_id).await.unwrap();
        assert_eq!(line.stock, 3);
        assert_eq!(line.band, StockBand::Bajo);
        assert_eq!(line.valuation.cents(), 3_000);

        let stats = inventory_stats(&db, &InventoryQuery::default()).await.unwrap();
        assert_eq!(stats.total_stock, 3);
        assert_eq!(stats.bajo, 1);

        let filtered = inventory(
            &db,
            &InventoryQuery {
                band: Some(StockBand::Normal),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(filtered.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_stock_is_not_found() {
        let db = test_db().await;
        let err = product_stock(&db, 12).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_recompute_day_and_range() {
        let db = test_db().await;
        let (_, product_id) = stocked_product(&db, "Harina").await;
        let at = Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap();
        for price in [5_000, 15_000] {
            db.sales()
                .create(&NewSale {
                    product_id,
                    customer_id: None,
                    unit_price_cents: price,
                    quantity: 1,
                    created_at: Some(at),
                })
                .await
                .unwrap();
        }
        let day = at.date_naive();

        let out = recompute(&db, RecomputeScope::Day(day)).await.unwrap();
        assert_eq!(out.days, 1);
        assert_eq!(out.rows[0].total_sales_cents, 20_000);
        assert_eq!(out.rows[0].estimated_margin_cents, 4_000);
        assert_eq!(out.rows[0].estimated_savings_cents, 1_200);

        let rows = analytics(&db, day, day).await.unwrap();
        assert_eq!(rows.len(), 1);

        let all = recompute(&db, RecomputeScope::All).await.unwrap();
        assert_eq!(all.days, 1);
        assert_eq!(all.rows[0].date, rows[0].date);
        assert_eq!(all.rows[0].total_sales_cents, rows[0].total_sales_cents);
    }

    #[tokio::test]
    async fn test_inverted_range_rejected() {
        let db = test_db().await;
        let from = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        let err = analytics(&db, from, to).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let db = test_db().await;
        let (_, product_id) = stocked_product(&db, "Harina").await;
        sell(&db, product_id, None).await;

        let summary = dashboard(&db, Utc::now().date_naive()).await.unwrap();
        assert_eq!(summary.product_count, 1);
        assert_eq!(summary.supplier_count, 1);
        assert_eq!(summary.month_sold_units, 1);
        assert_eq!(summary.top_products.len(), 1);
        assert_eq!(summary.top_products[0].product_id, product_id);
    }
}
