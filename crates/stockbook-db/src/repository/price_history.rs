//! # Price History Repository
//!
//! Append-only log of suggested sale prices per product.
//!
//! ## Where Entries Come From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  PurchaseRepository::create/update ──┐                                 │
//! │     (inside the purchase tx)         ├──► append_entry ──► price_history│
//! │  PriceHistoryRepository::record ─────┘                                 │
//! │     (manual entry)                                                     │
//! │                                                                         │
//! │  latest = ORDER BY recorded_at DESC, id DESC LIMIT 1                   │
//! │  (ties on recorded_at go to the most recent insert)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here updates or deletes an entry.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::{like_pattern, require_reference};
use crate::error::{DbError, DbResult};
use stockbook_core::validation::validate_amount_cents;
use stockbook_core::{Money, PriceHistoryEntry, PriceHistoryListing};

/// Repository for price history operations.
#[derive(Debug, Clone)]
pub struct PriceHistoryRepository {
    pool: SqlitePool,
}

impl PriceHistoryRepository {
    /// Creates a new PriceHistoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PriceHistoryRepository { pool }
    }

    /// Records a suggested price by hand.
    ///
    /// `recorded_at` defaults to now.
    pub async fn record(
        &self,
        product_id: i64,
        suggested_price: Money,
        recorded_at: Option<DateTime<Utc>>,
    ) -> DbResult<PriceHistoryEntry> {
        validate_amount_cents("suggested_price", suggested_price.cents())?;

        let mut tx = self.pool.begin().await?;
        require_reference(&mut tx, "products", "product_id", product_id).await?;

        let entry = append_entry(&mut tx, product_id, suggested_price, recorded_at.unwrap_or_else(Utc::now)).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(entry)
    }

    /// Latest suggested price for a product, `None` if it has no history.
    pub async fn latest_price(&self, product_id: i64) -> DbResult<Option<Money>> {
        Ok(self
            .latest_entry(product_id)
            .await?
            .map(|entry| entry.suggested_price()))
    }

    /// Latest entry for a product.
    pub async fn latest_entry(&self, product_id: i64) -> DbResult<Option<PriceHistoryEntry>> {
        let mut conn = self.pool.acquire().await?;
        latest_entry(&mut conn, product_id).await
    }

    /// Full history of one product, newest first.
    pub async fn for_product(&self, product_id: i64) -> DbResult<Vec<PriceHistoryEntry>> {
        let entries = sqlx::query_as::<_, PriceHistoryEntry>(
            r#"
            SELECT id, product_id, recorded_at, suggested_price_cents, created_at
            FROM price_history
            WHERE product_id = ?1
            ORDER BY recorded_at DESC, id DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// All entries joined with their product, newest first, optionally
    /// filtered by product name or brand.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<PriceHistoryListing>> {
        let pattern = like_pattern(search)?;

        let entries = sqlx::query_as::<_, PriceHistoryListing>(
            r#"
            SELECT
                h.id,
                h.product_id,
                p.name AS product_name,
                p.brand AS product_brand,
                h.recorded_at,
                h.suggested_price_cents
            FROM price_history h
            INNER JOIN products p ON p.id = h.product_id
            WHERE ?1 IS NULL
               OR p.name LIKE ?1 ESCAPE '\'
               OR p.brand LIKE ?1 ESCAPE '\'
            ORDER BY h.recorded_at DESC, h.id DESC
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

/// Appends one entry on the caller's connection (usually a transaction).
pub(crate) async fn append_entry(
    conn: &mut SqliteConnection,
    product_id: i64,
    suggested_price: Money,
    recorded_at: DateTime<Utc>,
) -> DbResult<PriceHistoryEntry> {
    debug!(product_id, price = %suggested_price, "Appending price history entry");

    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO price_history (product_id, recorded_at, suggested_price_cents, created_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(product_id)
    .bind(recorded_at)
    .bind(suggested_price.cents())
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(PriceHistoryEntry {
        id: result.last_insert_rowid(),
        product_id,
        recorded_at,
        suggested_price_cents: suggested_price.cents(),
        created_at: now,
    })
}

async fn latest_entry(conn: &mut SqliteConnection, product_id: i64) -> DbResult<Option<PriceHistoryEntry>> {
    let entry = sqlx::query_as::<_, PriceHistoryEntry>(
        r#"
        SELECT id, product_id, recorded_at, suggested_price_cents, created_at
        FROM price_history
        WHERE product_id = ?1
        ORDER BY recorded_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(entry)
}

// =============================================================================
// Unit Tests
// =============================================================================
