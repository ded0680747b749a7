//! # Inventory Repository
//!
//! Stock is never stored. Every read aggregates purchases, sales and the
//! latest price per product in one statement, then hands the raw figures to
//! [`ProductStockLine::from_aggregates`] for the derived values.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stockbook_core::inventory::ProductAggregates;
use stockbook_core::{InventoryQuery, InventoryStatistics, Money, ProductStockLine};

/// Per-product aggregates; `?1` optionally narrows to one product.
const AGGREGATES_SQL: &str = r#"
    SELECT
        p.id AS product_id,
        p.name,
        p.brand,
        p.updated_at,
        COALESCE((SELECT SUM(quantity) FROM purchases WHERE product_id = p.id), 0) AS total_purchased,
        COALESCE((SELECT SUM(quantity) FROM sales WHERE product_id = p.id), 0) AS total_sold,
        COALESCE((SELECT SUM(unit_cost_cents) FROM purchases WHERE product_id = p.id), 0) AS unit_cost_sum_cents,
        (SELECT COUNT(*) FROM purchases WHERE product_id = p.id) AS purchase_count,
        (SELECT suggested_price_cents FROM price_history
            WHERE product_id = p.id
            ORDER BY recorded_at DESC, id DESC
            LIMIT 1) AS latest_price_cents
    FROM products p
    WHERE ?1 IS NULL OR p.id = ?1
    ORDER BY p.id
"#;

#[derive(Debug, sqlx::FromRow)]
struct AggregateRow {
    product_id: i64,
    name: String,
    brand: Option<String>,
    updated_at: DateTime<Utc>,
    total_purchased: i64,
    total_sold: i64,
    unit_cost_sum_cents: i64,
    purchase_count: i64,
    latest_price_cents: Option<i64>,
}

impl From<AggregateRow> for ProductAggregates {
    fn from(row: AggregateRow) -> Self {
        ProductAggregates {
            product_id: row.product_id,
            name: row.name,
            brand: row.brand,
            total_purchased: row.total_purchased,
            total_sold: row.total_sold,
            unit_cost_sum: Money::from_cents(row.unit_cost_sum_cents),
            purchase_count: row.purchase_count,
            latest_price: row.latest_price_cents.map(Money::from_cents),
            updated_at: row.updated_at,
        }
    }
}

/// Repository for on-read inventory valuation.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// One stock line per product, filtered and sorted by `query`.
    pub async fn snapshot(&self, query: &InventoryQuery) -> DbResult<Vec<ProductStockLine>> {
        let lines = self.load(None).await?;
        let lines = query.apply(lines);

        debug!(lines = lines.len(), band = ?query.band, "Inventory snapshot");
        Ok(lines)
    }

    /// Stock line of a single product, `None` if it does not exist.
    pub async fn for_product(&self, product_id: i64) -> DbResult<Option<ProductStockLine>> {
        Ok(self.load(Some(product_id)).await?.into_iter().next())
    }

    /// Statistics over the lines `query` selects.
    pub async fn statistics(&self, query: &InventoryQuery) -> DbResult<InventoryStatistics> {
        let lines = self.snapshot(query).await?;
        Ok(InventoryStatistics::from_lines(&lines)?)
    }

    async fn load(&self, product_id: Option<i64>) -> DbResult<Vec<ProductStockLine>> {
        let rows = sqlx::query_as::<_, AggregateRow>(AGGREGATES_SQL)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        let lines = rows
            .into_iter()
            .map(|row| ProductStockLine::from_aggregates(row.into()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lines)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;
    use stockbook_core::inventory::{InventorySort, SortField};
    use stockbook_core::StockBand;

    #[tokio::test]
    async fn test_bought_thirty_sold_twenty_five() {
        let db = test_db().await;
        let p = product(&db, "Fideos").await;
        let s = supplier(&db, "Norte").await;

        db.purchases()
            .create(&purchase_input("F-1", s.id, p.id, 6_000, 10, 2000))
            .await
            .unwrap();
        db.purchases()
            .create(&purchase_input("F-2", s.id, p.id, 8_000, 20, 2000))
            .await
            .unwrap();
        db.sales().create(&sale_input(p.id, 900, 25)).await.unwrap();

        let line = db.inventory().for_product(p.id).await.unwrap().unwrap();
        assert_eq!(line.total_purchased, 30);
        assert_eq!(line.total_sold, 25);
        assert_eq!(line.stock, 5);
        // mean(600, 400) = 500
        assert_eq!(line.avg_unit_cost, Money::from_cents(500));
        assert_eq!(line.valuation, Money::from_cents(2_500));
        assert_eq!(line.band, StockBand::Bajo);
        // latest price comes from the second purchase: 400 + 20%
        assert_eq!(line.recommended_price, Money::from_cents(480));
    }

    #[tokio::test]
    async fn test_product_without_activity() {
        let db = test_db().await;
        let p = product(&db, "Sal").await;

        let line = db.inventory().for_product(p.id).await.unwrap().unwrap();
        assert_eq!(line.stock, 0);
        assert_eq!(line.avg_unit_cost, Money::zero());
        assert_eq!(line.recommended_price, Money::zero());
        assert_eq!(line.band, StockBand::Agotado);

        assert!(db.inventory().for_product(p.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_oversold_stock_is_negative() {
        let db = test_db().await;
        let p = product(&db, "Sal").await;
        let s = supplier(&db, "Norte").await;
        db.purchases()
            .create(&purchase_input("F-1", s.id, p.id, 1_000, 2, 0))
            .await
            .unwrap();
        db.sales().create(&sale_input(p.id, 600, 5)).await.unwrap();

        let line = db.inventory().for_product(p.id).await.unwrap().unwrap();
        assert_eq!(line.stock, -3);
        assert_eq!(line.valuation, Money::from_cents(-1_500));
        assert_eq!(line.band, StockBand::Agotado);
    }

    #[tokio::test]
    async fn test_snapshot_filter_sort_and_statistics() {
        let db = test_db().await;
        let s = supplier(&db, "Norte").await;
        let mut ids = Vec::new();
        for (i, (name, qty)) in [("Agua", 1), ("Cerveza", 10), ("Vino", 4), ("Soda", 0)].iter().enumerate() {
            let p = product(&db, name).await;
            if *qty > 0 {
                db.purchases()
                    .create(&purchase_input(&format!("F-{i}"), s.id, p.id, 100 * qty, *qty, 0))
                    .await
                    .unwrap();
            }
            ids.push(p.id);
        }

        let all = db.inventory().snapshot(&InventoryQuery::default()).await.unwrap();
        assert_eq!(all.len(), 4);

        let critical = db
            .inventory()
            .snapshot(&InventoryQuery {
                band: Some(StockBand::Critico),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].name, "Agua");

        let by_stock = db
            .inventory()
            .snapshot(&InventoryQuery {
                sort: Some(InventorySort {
                    field: SortField::Stock,
                    descending: true,
                }),
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<_> = by_stock.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Cerveza", "Vino", "Agua", "Soda"]);

        let stats = db.inventory().statistics(&InventoryQuery::default()).await.unwrap();
        assert_eq!(stats.product_count, 4);
        assert_eq!(stats.total_stock, 15);
        assert_eq!(stats.total_valuation, Money::from_cents(1_500));
        assert_eq!(stats.agotado, 1);
        assert_eq!(stats.critico, 1);
        assert_eq!(stats.bajo, 1);
        assert_eq!(stats.normal, 1);
    }
}
