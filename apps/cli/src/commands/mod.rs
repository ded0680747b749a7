//! # Commands Module
//!
//! Every operation the CLI exposes, parsed by `clap` into a [`Command`] and
//! run against the [`Database`].
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (Cli, Command, dispatch)
//! ├── args.rs     ◄─── clap argument groups → New* inputs
//! ├── catalog.rs  ◄─── Products, suppliers, customers
//! ├── ledger.rs   ◄─── Purchases and sales
//! ├── pricing.rs  ◄─── Price history
//! └── reports.rs  ◄─── Inventory, analytics, dashboard, recompute
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  stockbook add-sale --product 3 --price 12.00 --qty 2                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Cli (clap)      ──► Command::AddSale(SaleArgs { .. })                  │
//! │         │            (bad flag? VALIDATION_ERROR, nothing runs)         │
//! │         ▼                                                               │
//! │  App::execute    ──► AccessPolicy::authorize_write("add-sale")          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  commands::execute ──► ledger::add_sale ──► db.sales().create(..)       │
//! │         │                                                               │
//! │         ▼ (JSON serialization)                                          │
//! │  stdout: { "id": 41, "total_cents": 2400, ... }                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts on the command line are decimal (`12.50`); margins are percent
//! (`20` or `12.5%`). Output carries integer cents and basis points.

pub mod args;
pub mod catalog;
pub mod ledger;
pub mod pricing;
pub mod reports;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use args::{
    AnalyticsArgs, CustomerArgs, Entity, InventoryArgs, ProductArgs, PurchaseArgs, RecomputeArgs, SaleArgs,
    SearchArgs, SupplierArgs,
};
pub use reports::RecomputeScope;
use stockbook_core::Money;
use stockbook_db::Database;

const ENVIRONMENT_HELP: &str = "\
Environment:
  STOCKBOOK_DB_PATH          Ledger file (default ./stockbook.db)
  STOCKBOOK_USER             Acting account (default admin)
  STOCKBOOK_DEMO_USER        Read-only account (default demo; USER_DEMO also works)
  STOCKBOOK_MAX_CONNECTIONS  Pool size (default 5)
  RUST_LOG                   Log filter (default info,sqlx=warn)";

// =============================================================================
// Command Line
// =============================================================================

/// Stockbook - inventory and sales ledger
#[derive(Debug, Parser)]
#[command(name = "stockbook", version, about, long_about = None)]
#[command(arg_required_else_help = true, after_help = ENVIRONMENT_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parses `args` without the program name.
    pub fn parse_args(args: &[String]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("stockbook").chain(args.iter().map(String::as_str)))
    }
}

/// One parsed invocation.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    // === Catalog ===
    /// List products
    Products(SearchArgs),
    /// List suppliers
    Suppliers(SearchArgs),
    /// List customers
    Customers(SearchArgs),
    /// Add a product
    AddProduct(ProductArgs),
    /// Edit a product
    EditProduct {
        id: i64,
        #[command(flatten)]
        input: ProductArgs,
    },
    /// Add a supplier
    AddSupplier(SupplierArgs),
    /// Edit a supplier
    EditSupplier {
        id: i64,
        #[command(flatten)]
        input: SupplierArgs,
    },
    /// Add a customer
    AddCustomer(CustomerArgs),
    /// Edit a customer
    EditCustomer {
        id: i64,
        #[command(flatten)]
        input: CustomerArgs,
    },

    // === Ledger ===
    /// List purchases (search invoice, supplier or product)
    Purchases(SearchArgs),
    /// List sales (search product or customer)
    Sales(SearchArgs),
    /// Record a purchase; derives unit cost, sale price and margins
    AddPurchase(PurchaseArgs),
    /// Edit a purchase; derived fields are recomputed
    EditPurchase {
        id: i64,
        #[command(flatten)]
        input: PurchaseArgs,
    },
    /// Record a sale; the total is unit price × quantity
    AddSale(SaleArgs),
    /// Edit a sale
    EditSale {
        id: i64,
        #[command(flatten)]
        input: SaleArgs,
    },
    /// Delete a record
    Delete {
        #[arg(value_enum)]
        kind: Entity,
        id: i64,
    },

    // === Pricing ===
    /// Latest suggested price of a product
    LatestPrice { product_id: i64 },
    /// Price history of one product, or all of it
    PriceHistory {
        /// Only this product
        #[arg(long, conflicts_with = "search")]
        product: Option<i64>,
        /// Match product name or brand
        #[arg(long)]
        search: Option<String>,
    },
    /// Record a suggested price by hand
    RecordPrice {
        product_id: i64,
        /// Suggested price, e.g. 12.00
        price: Money,
        /// Entry time (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    // === Reports ===
    /// Stock line per product
    Inventory(InventoryArgs),
    /// Inventory statistics
    Stats(InventoryArgs),
    /// Stock line of one product
    Stock { product_id: i64 },
    /// Daily analytics rows (last 30 days by default)
    Analytics(AnalyticsArgs),
    /// Rebuild daily analytics
    Recompute(RecomputeArgs),
    /// Counts, month-to-date totals and top products
    Dashboard {
        /// Reference day (YYYY-MM-DD); defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

impl Command {
    /// Parses `<name> [args...]`; usage errors become `VALIDATION_ERROR`.
    pub fn from_args(args: &[String]) -> Result<Command, ApiError> {
        Ok(Cli::parse_args(args)?.command)
    }

    /// Command name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Products(_) => "products",
            Command::Suppliers(_) => "suppliers",
            Command::Customers(_) => "customers",
            Command::AddProduct(_) => "add-product",
            Command::EditProduct { .. } => "edit-product",
            Command::AddSupplier(_) => "add-supplier",
            Command::EditSupplier { .. } => "edit-supplier",
            Command::AddCustomer(_) => "add-customer",
            Command::EditCustomer { .. } => "edit-customer",
            Command::Purchases(_) => "purchases",
            Command::Sales(_) => "sales",
            Command::AddPurchase(_) => "add-purchase",
            Command::EditPurchase { .. } => "edit-purchase",
            Command::AddSale(_) => "add-sale",
            Command::EditSale { .. } => "edit-sale",
            Command::Delete { .. } => "delete",
            Command::LatestPrice { .. } => "latest-price",
            Command::PriceHistory { .. } => "price-history",
            Command::RecordPrice { .. } => "record-price",
            Command::Inventory(_) => "inventory",
            Command::Stats(_) => "stats",
            Command::Stock { .. } => "stock",
            Command::Analytics(_) => "analytics",
            Command::Recompute(_) => "recompute",
            Command::Dashboard { .. } => "dashboard",
        }
    }

    /// Whether the command changes stored data.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Command::AddProduct(_)
                | Command::EditProduct { .. }
                | Command::AddSupplier(_)
                | Command::EditSupplier { .. }
                | Command::AddCustomer(_)
                | Command::EditCustomer { .. }
                | Command::AddPurchase(_)
                | Command::EditPurchase { .. }
                | Command::AddSale(_)
                | Command::EditSale { .. }
                | Command::Delete { .. }
                | Command::RecordPrice { .. }
                | Command::Recompute(_)
        )
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// =============================================================================
// Dispatch
// =============================================================================

/// Outcome of a `delete` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub deleted: &'static str,
    pub id: i64,
    /// Customer deletes only: sales that became anonymous.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detached_sales: Option<u64>,
}

impl Deleted {
    pub fn new(deleted: &'static str, id: i64) -> Self {
        Deleted {
            deleted,
            id,
            detached_sales: None,
        }
    }

    pub fn with_detached_sales(mut self, count: u64) -> Self {
        self.detached_sales = Some(count);
        self
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(format!("Failed to serialize output: {}", e)))
}

/// Runs a parsed command. Access checks happen before this, in
/// [`crate::App::execute`].
pub async fn execute(db: &Database, command: Command) -> Result<Value, ApiError> {
    match command {
        Command::Products(args) => to_json(catalog::list_products(db, args.search.as_deref()).await?),
        Command::Suppliers(args) => to_json(catalog::list_suppliers(db, args.search.as_deref()).await?),
        Command::Customers(args) => to_json(catalog::list_customers(db, args.search.as_deref()).await?),
        Command::AddProduct(input) => to_json(catalog::add_product(db, &input.into()).await?),
        Command::EditProduct { id, input } => to_json(catalog::edit_product(db, id, &input.into()).await?),
        Command::AddSupplier(input) => to_json(catalog::add_supplier(db, &input.into()).await?),
        Command::EditSupplier { id, input } => to_json(catalog::edit_supplier(db, id, &input.into()).await?),
        Command::AddCustomer(input) => to_json(catalog::add_customer(db, &input.into()).await?),
        Command::EditCustomer { id, input } => to_json(catalog::edit_customer(db, id, &input.into()).await?),

        Command::Purchases(args) => to_json(ledger::list_purchases(db, args.search.as_deref()).await?),
        Command::Sales(args) => to_json(ledger::list_sales(db, args.search.as_deref()).await?),
        Command::AddPurchase(input) => to_json(ledger::add_purchase(db, &input.into()).await?),
        Command::EditPurchase { id, input } => to_json(ledger::edit_purchase(db, id, &input.into()).await?),
        Command::AddSale(input) => to_json(ledger::add_sale(db, &input.into()).await?),
        Command::EditSale { id, input } => to_json(ledger::edit_sale(db, id, &input.into()).await?),
        Command::Delete { kind, id } => {
            let deleted = match kind {
                Entity::Product => catalog::delete_product(db, id).await?,
                Entity::Supplier => catalog::delete_supplier(db, id).await?,
                Entity::Customer => catalog::delete_customer(db, id).await?,
                Entity::Purchase => ledger::delete_purchase(db, id).await?,
                Entity::Sale => ledger::delete_sale(db, id).await?,
            };
            to_json(deleted)
        }

        Command::LatestPrice { product_id } => to_json(pricing::latest_price(db, product_id).await?),
        Command::PriceHistory {
            product: Some(product_id),
            ..
        } => to_json(pricing::product_history(db, product_id).await?),
        Command::PriceHistory { product: None, search } => {
            to_json(pricing::list_history(db, search.as_deref()).await?)
        }
        Command::RecordPrice { product_id, price, at } => {
            to_json(pricing::record_price(db, product_id, price, at).await?)
        }

        Command::Inventory(args) => to_json(reports::inventory(db, &args.into()).await?),
        Command::Stats(args) => to_json(reports::inventory_stats(db, &args.into()).await?),
        Command::Stock { product_id } => to_json(reports::product_stock(db, product_id).await?),
        Command::Analytics(args) => {
            let (from, to) = args.range(today());
            to_json(reports::analytics(db, from, to).await?)
        }
        Command::Recompute(args) => to_json(reports::recompute(db, args.scope()).await?),
        Command::Dashboard { today: day } => to_json(reports::dashboard(db, day.unwrap_or_else(today)).await?),
    }
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use stockbook_core::{NewProduct, NewPurchase, NewSale, NewSupplier, Sale};
    use stockbook_db::{Database, DbConfig};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Product with one purchase: 10 units for 100.00 at a 20% margin.
    ///
    /// Returns `(supplier_id, product_id)`.
    pub async fn stocked_product(db: &Database, name: &str) -> (i64, i64) {
        let product = db
            .products()
            .create(&NewProduct {
                name: name.to_string(),
                brand: None,
            })
            .await
            .unwrap();
        let supplier = db
            .suppliers()
            .create(&NewSupplier {
                company: format!("Proveedor de {}", name),
                phone: None,
                products: None,
            })
            .await
            .unwrap();
        db.purchases()
            .create(&NewPurchase {
                invoice_number: format!("INV-{}", product.id),
                purchased_on: chrono::Utc::now().date_naive(),
                supplier_id: supplier.id,
                product_id: product.id,
                total_cost_cents: 10_000,
                quantity: 10,
                margin_bps: 2000,
                unit_cost_cents: None,
            })
            .await
            .unwrap();

        (supplier.id, product.id)
    }

    /// One unit at 12.00.
    pub async fn sell(db: &Database, product_id: i64, customer_id: Option<i64>) -> Sale {
        db.sales()
            .create(&NewSale {
                product_id,
                customer_id,
                unit_price_cents: 1_200,
                quantity: 1,
                created_at: None,
            })
            .await
            .unwrap()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
