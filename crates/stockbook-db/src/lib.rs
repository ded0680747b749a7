//! # stockbook-db: Database Layer for Stockbook
//!
//! Persistence for the ledger: SQLite through sqlx, with every derived
//! write (price history, daily analytics) made in the same transaction as
//! the purchase or sale that caused it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Data Flow                              │
//! │                                                                         │
//! │  stockbook-cli command (record-sale, inventory, ...)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 stockbook-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │   │   │
//! │  │   │               │    │ PurchaseRepo   │   │              │   │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo       │   │ 001_initial  │   │   │
//! │  │   │ Transactions  │    │ InventoryRepo  │   │   _schema    │   │   │
//! │  │   │               │    │ AnalyticsRepo  │   │              │   │   │
//! │  │   └───────────────┘    └───────┬────────┘   └──────────────┘   │   │
//! │  │                                │ costing, rollups, bands        │   │
//! │  │                                ▼                                │   │
//! │  │                         stockbook-core                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (STOCKBOOK_DB_PATH)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("stockbook.db")).await?;
//!
//! let purchase = db.purchases().create(&new_purchase).await?;
//! let price = db.price_history().latest_price(purchase.product_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::analytics::AnalyticsRepository;
pub use repository::customer::CustomerRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::price_history::PriceHistoryRepository;
pub use repository::product::ProductRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
pub use repository::supplier::SupplierRepository;
