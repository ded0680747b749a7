//! # stockbook-core: Pure Ledger Logic for Stockbook
//!
//! This crate holds the derived-value and aggregation rules of the ledger
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Request handlers / stockbook-cli                │   │
//! │  │   create_purchase, create_sale, inventory, recompute, ...       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌───────────────┐    │   │
//! │  │   │  money   │ │ costing  │ │ analytics │ │   inventory   │    │   │
//! │  │   │  Money   │ │ Purchase │ │ DailyRoll │ │ StockLine     │    │   │
//! │  │   │ Percent  │ │ SaleTotal│ │   up      │ │ StockBand     │    │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └───────────────┘    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockbook-db (Database Layer)                   │   │
//! │  │        SQLite queries, migrations, transactional writes         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Product, Purchase, Sale, ...) and their inputs
//! - [`money`] - Fixed-point money (cents) and percentages (basis points)
//! - [`costing`] - Purchase derivatives and sale totals
//! - [`analytics`] - Daily sales rollup
//! - [`inventory`] - Stock lines, stock bands, statistics
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockbook_core::costing::compute_purchase_derivatives;
//! use stockbook_core::{Money, Percentage};
//!
//! let derived = compute_purchase_derivatives(
//!     Money::from_cents(10_000), // $100.00 paid
//!     10,                        // for 10 units
//!     Percentage::from_bps(2000), // 20% margin
//!     None,
//! )
//! .unwrap();
//!
//! assert_eq!(derived.unit_cost.cents(), 1000);
//! assert_eq!(derived.sale_price.cents(), 1200);
//! assert_eq!(derived.total_margin.cents(), 2000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod costing;
pub mod error;
pub mod inventory;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use analytics::DailyRollup;
pub use costing::PurchaseDerivatives;
pub use error::{CoreError, CoreResult, ValidationError};
pub use inventory::{InventoryQuery, InventoryStatistics, ProductStockLine, StockBand};
pub use money::{Money, Percentage};
pub use types::*;
