//! # Argument Groups
//!
//! `clap` argument structs shared by the subcommands in [`super::Command`],
//! and their conversion into the `New*` inputs the repositories take.
//!
//! ```text
//! --total 100.00 ──► Money (FromStr) ──► total_cost_cents: 10000
//! --margin 20%   ──► Percentage      ──► margin_bps: 2000
//! --band crítico ──► StockBand
//! --sort -stock  ──► InventorySort { Stock, descending }
//! ```
//!
//! Malformed values are rejected by clap before anything runs.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{ArgGroup, Args, ValueEnum};

use super::reports::RecomputeScope;
use stockbook_core::inventory::InventorySort;
use stockbook_core::{
    InventoryQuery, Money, NewCustomer, NewProduct, NewPurchase, NewSale, NewSupplier, Percentage,
    StockBand,
};

/// Default window of the `analytics` command when no dates are given.
const DEFAULT_ANALYTICS_DAYS: i64 = 30;

// =============================================================================
// Catalog
// =============================================================================

/// Free-text filter of a listing.
#[derive(Debug, Clone, Default, Args)]
pub struct SearchArgs {
    /// Case-insensitive text to look for
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ProductArgs {
    /// Product name
    #[arg(long)]
    pub name: String,

    /// Brand
    #[arg(long)]
    pub brand: Option<String>,
}

impl From<ProductArgs> for NewProduct {
    fn from(args: ProductArgs) -> Self {
        NewProduct {
            name: args.name,
            brand: args.brand,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SupplierArgs {
    /// Company name (unique)
    #[arg(long)]
    pub company: String,

    /// Contact phone
    #[arg(long)]
    pub phone: Option<String>,

    /// What the supplier sells
    #[arg(long)]
    pub products: Option<String>,
}

impl From<SupplierArgs> for NewSupplier {
    fn from(args: SupplierArgs) -> Self {
        NewSupplier {
            company: args.company,
            phone: args.phone,
            products: args.products,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct CustomerArgs {
    /// First name
    #[arg(long = "first")]
    pub first_name: String,

    /// Last name
    #[arg(long = "last")]
    pub last_name: String,
}

impl From<CustomerArgs> for NewCustomer {
    fn from(args: CustomerArgs) -> Self {
        NewCustomer {
            first_name: args.first_name,
            last_name: args.last_name,
        }
    }
}

// =============================================================================
// Ledger
// =============================================================================

#[derive(Debug, Clone, Args)]
pub struct PurchaseArgs {
    /// Supplier invoice number (unique)
    #[arg(long)]
    pub invoice: String,

    /// Purchase date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,

    /// Supplier id
    #[arg(long)]
    pub supplier: i64,

    /// Product id
    #[arg(long)]
    pub product: i64,

    /// Total paid, e.g. 100.00
    #[arg(long)]
    pub total: Money,

    /// Units bought
    #[arg(long)]
    pub qty: i64,

    /// Margin in percent, e.g. 20 or 12.5%
    #[arg(long)]
    pub margin: Percentage,

    /// Unit cost override; 0 means derive from total / qty
    #[arg(long)]
    pub unit_cost: Option<Money>,
}

impl From<PurchaseArgs> for NewPurchase {
    fn from(args: PurchaseArgs) -> Self {
        NewPurchase {
            invoice_number: args.invoice,
            purchased_on: args.date,
            supplier_id: args.supplier,
            product_id: args.product,
            total_cost_cents: args.total.cents(),
            quantity: args.qty,
            margin_bps: args.margin.bps(),
            unit_cost_cents: args.unit_cost.map(|cost| cost.cents()),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SaleArgs {
    /// Product id
    #[arg(long)]
    pub product: i64,

    /// Unit price, e.g. 12.00
    #[arg(long)]
    pub price: Money,

    /// Units sold
    #[arg(long)]
    pub qty: i64,

    /// Customer id (omit for an anonymous sale)
    #[arg(long)]
    pub customer: Option<i64>,

    /// Sale time (RFC 3339); defaults to now
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

impl From<SaleArgs> for NewSale {
    fn from(args: SaleArgs) -> Self {
        NewSale {
            product_id: args.product,
            customer_id: args.customer,
            unit_price_cents: args.price.cents(),
            quantity: args.qty,
            created_at: args.at,
        }
    }
}

/// Record kinds that `delete` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Entity {
    Product,
    Supplier,
    Customer,
    Purchase,
    Sale,
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Clone, Default, Args)]
pub struct InventoryArgs {
    /// Match product name or brand
    #[arg(long)]
    pub search: Option<String>,

    /// agotado, critico, bajo or normal
    #[arg(long)]
    pub band: Option<StockBand>,

    /// name, stock or valuation; prefix with - for descending
    #[arg(long, allow_hyphen_values = true)]
    pub sort: Option<InventorySort>,
}

impl From<InventoryArgs> for InventoryQuery {
    fn from(args: InventoryArgs) -> Self {
        InventoryQuery {
            search: args.search,
            band: args.band,
            sort: args.sort,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct AnalyticsArgs {
    /// A single day (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub date: Option<NaiveDate>,

    /// First day of the range; defaults to 30 days before --to
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day of the range; defaults to today
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl AnalyticsArgs {
    /// Inclusive `(from, to)` window.
    pub fn range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        if let Some(date) = self.date {
            return (date, date);
        }
        let to = self.to.unwrap_or(today);
        let from = self
            .from
            .unwrap_or(to - Duration::days(DEFAULT_ANALYTICS_DAYS - 1));
        (from, to)
    }
}

#[derive(Debug, Clone, Args)]
#[command(group(ArgGroup::new("scope").required(true).args(["date", "all"])))]
pub struct RecomputeArgs {
    /// Recompute one day (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Recompute every day that has sales
    #[arg(long)]
    pub all: bool,
}

impl RecomputeArgs {
    pub fn scope(&self) -> RecomputeScope {
        match self.date {
            Some(date) => RecomputeScope::Day(date),
            None => RecomputeScope::All,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_purchase_args_convert_units() {
        let input: NewPurchase = PurchaseArgs {
            invoice: "F-1".to_string(),
            date: day(2026, 3, 2),
            supplier: 1,
            product: 2,
            total: "100".parse().unwrap(),
            qty: 10,
            margin: "12.5%".parse().unwrap(),
            unit_cost: Some("0".parse().unwrap()),
        }
        .into();

        assert_eq!(input.total_cost_cents, 10_000);
        assert_eq!(input.margin_bps, 1250);
        assert_eq!(input.unit_cost_cents, Some(0));
    }

    #[test]
    fn test_analytics_range() {
        let today = day(2026, 3, 31);

        let window = AnalyticsArgs::default().range(today);
        assert_eq!(window, (day(2026, 3, 2), today));

        let single = AnalyticsArgs {
            date: Some(day(2026, 1, 5)),
            ..Default::default()
        };
        assert_eq!(single.range(today), (day(2026, 1, 5), day(2026, 1, 5)));

        let explicit = AnalyticsArgs {
            date: None,
            from: Some(day(2026, 2, 1)),
            to: Some(day(2026, 2, 28)),
        };
        assert_eq!(explicit.range(today), (day(2026, 2, 1), day(2026, 2, 28)));
    }

    #[test]
    fn test_recompute_scope() {
        let all = RecomputeArgs { date: None, all: true };
        assert_eq!(all.scope(), RecomputeScope::All);

        let one = RecomputeArgs {
            date: Some(day(2026, 3, 1)),
            all: false,
        };
        assert_eq!(one.scope(), RecomputeScope::Day(day(2026, 3, 1)));
    }
}
