//! # Daily Analytics Repository
//!
//! Stores one [`DailyAnalytics`] row per calendar date.
//!
//! ## Recompute Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SaleRepository write (create/update/delete), inside its tx            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  refresh_after_sale_write(dates)                                       │
//! │       │  date > today? ──► skipped                                     │
//! │       ▼                                                                 │
//! │  recompute_day(date)                                                   │
//! │       │  SELECT total_cents FROM sales WHERE sale_date = date          │
//! │       │  DailyRollup::from_sale_totals (stockbook-core)                │
//! │       ▼                                                                 │
//! │  INSERT ... ON CONFLICT(date) DO UPDATE  (never a second row)          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Recomputing reads only the sales of that date and overwrites the row, so
//! running it any number of times gives the same figures.

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use stockbook_core::analytics::should_recompute;
use stockbook_core::{DailyAnalytics, DailyRollup, Money};

/// Repository for daily analytics.
#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    /// Creates a new AnalyticsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AnalyticsRepository { pool }
    }

    /// Recomputes and stores the rollup for one date.
    ///
    /// A date with no sales stores all zeros.
    pub async fn recompute(&self, date: NaiveDate) -> DbResult<DailyAnalytics> {
        let mut tx = self.pool.begin().await?;
        let row = recompute_day(&mut tx, date).await?;
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(row)
    }

    /// Recomputes every date that has at least one sale.
    ///
    /// Each date commits on its own, so a failure part-way leaves the
    /// already-processed dates updated; re-running is safe.
    pub async fn recompute_all(&self) -> DbResult<Vec<DailyAnalytics>> {
        let dates: Vec<NaiveDate> = sqlx::query_scalar("SELECT DISTINCT sale_date FROM sales ORDER BY sale_date")
            .fetch_all(&self.pool)
            .await?;

        info!(days = dates.len(), "Recomputing daily analytics");

        let mut rows = Vec::with_capacity(dates.len());
        for date in dates {
            rows.push(self.recompute(date).await?);
        }

        Ok(rows)
    }

    /// Stored rollup for a date, if any.
    pub async fn get(&self, date: NaiveDate) -> DbResult<Option<DailyAnalytics>> {
        let row = sqlx::query_as::<_, DailyAnalytics>(
            r#"
            SELECT date, total_sales_cents, estimated_margin_cents, estimated_savings_cents, updated_at
            FROM daily_analytics
            WHERE date = ?1
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Stored rollups with `from <= date <= to`, oldest first.
    pub async fn range(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Vec<DailyAnalytics>> {
        let rows = sqlx::query_as::<_, DailyAnalytics>(
            r#"
            SELECT date, total_sales_cents, estimated_margin_cents, estimated_savings_cents, updated_at
            FROM daily_analytics
            WHERE date >= ?1 AND date <= ?2
            ORDER BY date
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Number of stored rows.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_analytics")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Recomputes one date on the caller's connection and upserts the row.
pub(crate) async fn recompute_day(conn: &mut SqliteConnection, date: NaiveDate) -> DbResult<DailyAnalytics> {
    let totals: Vec<i64> = sqlx::query_scalar("SELECT total_cents FROM sales WHERE sale_date = ?1")
        .bind(date)
        .fetch_all(&mut *conn)
        .await?;

    let sales = totals.len();
    let rollup = DailyRollup::from_sale_totals(totals.into_iter().map(Money::from_cents))?;
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO daily_analytics (
            date, total_sales_cents, estimated_margin_cents, estimated_savings_cents, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(date) DO UPDATE SET
            total_sales_cents = excluded.total_sales_cents,
            estimated_margin_cents = excluded.estimated_margin_cents,
            estimated_savings_cents = excluded.estimated_savings_cents,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(date)
    .bind(rollup.total_sales.cents())
    .bind(rollup.estimated_margin.cents())
    .bind(rollup.estimated_savings.cents())
    .bind(now)
    .execute(&mut *conn)
    .await?;

    debug!(%date, sales, total = %rollup.total_sales, "Daily analytics recomputed");

    Ok(DailyAnalytics {
        date,
        total_sales_cents: rollup.total_sales.cents(),
        estimated_margin_cents: rollup.estimated_margin.cents(),
        estimated_savings_cents: rollup.estimated_savings.cents(),
        updated_at: now,
    })
}

/// Hook run by every sale write, inside the write's transaction.
///
/// `dates` are the days the write touched (old and new day on an edit).
/// Days after today are left alone.
pub(crate) async fn refresh_after_sale_write(conn: &mut SqliteConnection, dates: &[NaiveDate]) -> DbResult<()> {
    let today = Utc::now().date_naive();

    for (i, date) in dates.iter().enumerate() {
        if dates[..i].contains(date) {
            continue;
        }
        if should_recompute(*date, today) {
            recompute_day(conn, *date).await?;
        } else {
            debug!(%date, %today, "Future-dated sale; analytics not recomputed");
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;
    use chrono::{Duration, TimeZone};
    use stockbook_core::ValidationError;

    #[tokio::test]
    async fn test_sales_on_same_day_roll_up() {
        let db = test_db().await;
        let p = product(&db, "Pan").await;
        let today = Utc::now().date_naive();

        db.sales().create(&sale_input(p.id, 5_000, 1)).await.unwrap();
        db.sales().create(&sale_input(p.id, 7_500, 2)).await.unwrap();

        let row = db.analytics().get(today).await.unwrap().unwrap();
        assert_eq!(row.total_sales_cents, 20_000);
        assert_eq!(row.estimated_margin_cents, 4_000);
        assert_eq!(row.estimated_savings_cents, 1_200);
        assert_eq!(db.analytics().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_day_overflowing_cents_rejects_the_sale() {
        let db = test_db().await;
        let p = product(&db, "Oro").await;
        let big = sale_input(p.id, stockbook_core::validation::MAX_AMOUNT_CENTS, 500_000_000);

        db.sales().create(&big).await.unwrap();
        let err = db.sales().create(&big).await.unwrap_err();

        assert!(matches!(err, DbError::Validation(ValidationError::OutOfRange { .. })));
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let db = test_db().await;
        let p = product(&db, "Pan").await;
        let today = Utc::now().date_naive();
        db.sales().create(&sale_input(p.id, 1_234, 1)).await.unwrap();

        let first = db.analytics().recompute(today).await.unwrap();
        let second = db.analytics().recompute(today).await.unwrap();

        assert_eq!(first.total_sales_cents, second.total_sales_cents);
        assert_eq!(first.estimated_margin_cents, 247);
        assert_eq!(second.estimated_savings_cents, 74);
        assert_eq!(db.analytics().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_day_stores_zeros() {
        let db = test_db().await;
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        let row = db.analytics().recompute(date).await.unwrap();

        assert_eq!(row.total_sales_cents, 0);
        assert_eq!(row.estimated_margin_cents, 0);
        assert_eq!(db.analytics().get(date).await.unwrap().unwrap().date, date);
    }

    #[tokio::test]
    async fn test_future_sale_not_rolled_up() {
        let db = test_db().await;
        let p = product(&db, "Pan").await;
        let tomorrow = Utc::now() + Duration::days(2);

        let mut input = sale_input(p.id, 1_000, 1);
        input.created_at = Some(tomorrow);
        db.sales().create(&input).await.unwrap();

        assert!(db.analytics().get(tomorrow.date_naive()).await.unwrap().is_none());

        // A manual recompute still works for that date.
        let row = db.analytics().recompute(tomorrow.date_naive()).await.unwrap();
        assert_eq!(row.total_sales_cents, 1_000);
    }

    #[tokio::test]
    async fn test_recompute_all_covers_every_sale_date() {
        let db = test_db().await;
        let p = product(&db, "Pan").await;

        for day in [3, 3, 5] {
            let mut input = sale_input(p.id, 1_000, 1);
            input.created_at = Some(Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap());
            db.sales().create(&input).await.unwrap();
        }

        // Simulate drift, then rebuild.
        sqlx::query("DELETE FROM daily_analytics")
            .execute(db.pool())
            .await
            .unwrap();

        let rows = db.analytics().recompute_all().await.unwrap();
        assert_eq!(rows.len(), 2);

        let june = db
            .analytics()
            .range(
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(june.len(), 2);
        assert_eq!(june[0].total_sales_cents, 2_000);
        assert_eq!(june[1].total_sales_cents, 1_000);

        // Second run changes nothing.
        let again = db.analytics().recompute_all().await.unwrap();
        assert_eq!(again.len(), 2);
        assert_eq!(db.analytics().count().await.unwrap(), 2);
    }
}
