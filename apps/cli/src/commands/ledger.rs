//! # Ledger Commands
//!
//! Purchases (stock in) and sales (stock out).
//!
//! ## What a Write Triggers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add-purchase / edit-purchase                                          │
//! │     └──► derived costing + one price history entry (sale price)        │
//! │                                                                         │
//! │  add-sale / edit-sale / delete sale                                    │
//! │     └──► daily analytics recomputed for every affected day             │
//! │                                                                         │
//! │  Both happen in the same transaction as the write itself.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use super::Deleted;
use crate::error::ApiError;
use stockbook_core::{NewPurchase, NewSale, Purchase, PurchaseListing, Sale, SaleListing};
use stockbook_db::Database;

// =============================================================================
// Purchases
// =============================================================================

pub async fn list_purchases(db: &Database, search: Option<&str>) -> Result<Vec<PurchaseListing>, ApiError> {
    Ok(db.purchases().list(search).await?)
}

pub async fn add_purchase(db: &Database, input: &NewPurchase) -> Result<Purchase, ApiError> {
    let purchase = db.purchases().create(input).await?;
    info!(
        id = purchase.id,
        invoice_number = %purchase.invoice_number,
        sale_price_cents = purchase.sale_price_cents,
        "Purchase recorded"
    );
    Ok(purchase)
}

pub async fn edit_purchase(db: &Database, id: i64, input: &NewPurchase) -> Result<Purchase, ApiError> {
    Ok(db.purchases().update(id, input).await?)
}

pub async fn delete_purchase(db: &Database, id: i64) -> Result<Deleted, ApiError> {
    db.purchases().delete(id).await?;
    Ok(Deleted::new("purchase", id))
}

// =============================================================================
// Sales
// =============================================================================

pub async fn list_sales(db: &Database, search: Option<&str>) -> Result<Vec<SaleListing>, ApiError> {
    Ok(db.sales().list(search).await?)
}

pub async fn add_sale(db: &Database, input: &NewSale) -> Result<Sale, ApiError> {
    let sale = db.sales().create(input).await?;
    info!(
        id = sale.id,
        product_id = sale.product_id,
        total_cents = sale.total_cents,
        "Sale recorded"
    );
    Ok(sale)
}

pub async fn edit_sale(db: &Database, id: i64, input: &NewSale) -> Result<Sale, ApiError> {
    Ok(db.sales().update(id, input).await?)
}

pub async fn delete_sale(db: &Database, id: i64) -> Result<Deleted, ApiError> {
    db.sales().delete(id).await?;
    Ok(Deleted::new("sale", id))
}

// =============================================================================
// Unit Tests
// =============================================================================
