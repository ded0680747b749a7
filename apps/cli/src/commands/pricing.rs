//! # Pricing Commands
//!
//! Read the suggested-price history that purchases append to, and add
//! manual entries.

use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use stockbook_core::{Money, PriceHistoryEntry, PriceHistoryListing};
use stockbook_db::Database;

/// Latest suggested price of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestPrice {
    pub product_id: i64,
    /// `None` when the product has no history yet.
    pub suggested_price_cents: Option<i64>,
}

/// Latest suggested price, `NOT_FOUND` for an unknown product.
pub async fn latest_price(db: &Database, product_id: i64) -> Result<LatestPrice, ApiError> {
    ensure_product(db, product_id).await?;

    let price = db.price_history().latest_price(product_id).await?;
    Ok(LatestPrice {
        product_id,
        suggested_price_cents: price.map(|p| p.cents()),
    })
}

/// One product's history newest first.
pub async fn product_history(db: &Database, product_id: i64) -> Result<Vec<PriceHistoryEntry>, ApiError> {
    ensure_product(db, product_id).await?;
    Ok(db.price_history().for_product(product_id).await?)
}

/// Every entry newest first, optionally filtered by product name or brand.
pub async fn list_history(db: &Database, search: Option<&str>) -> Result<Vec<PriceHistoryListing>, ApiError> {
    Ok(db.price_history().list(search).await?)
}

pub async fn record_price(
    db: &Database,
    product_id: i64,
    price: Money,
    recorded_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<PriceHistoryEntry, ApiError> {
    let entry = db.price_history().record(product_id, price, recorded_at).await?;
    info!(product_id, price = %price, "Manual price recorded");
    Ok(entry)
}

async fn ensure_product(db: &Database, product_id: i64) -> Result<(), ApiError> {
    match db.products().get_by_id(product_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found("Product", product_id)),
    }
}
