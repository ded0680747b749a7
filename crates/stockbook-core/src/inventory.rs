//! # Inventory Valuation
//!
//! Stock and valuation per product, derived on read from purchase and sale
//! aggregates. Nothing here is persisted.
//!
//! ## Stock Bands
//! ```text
//! stock:   ... -1   0 │ 1   2 │ 3   4   5 │ 6   7 ...
//!          ───────────┼───────┼───────────┼──────────
//! band:      agotado  │crítico│   bajo    │  normal
//! ```
//!
//! Negative stock is kept as-is: it signals an oversold product.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::validation::ValidationResult;

// =============================================================================
// Stock Band
// =============================================================================

/// Classification of a product's current stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockBand {
    /// stock ≤ 0
    Agotado,
    /// 0 < stock ≤ 2
    Critico,
    /// 3 ≤ stock ≤ 5
    Bajo,
    /// stock > 5
    Normal,
}

impl StockBand {
    /// Classifies a stock level.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::StockBand;
    ///
    /// assert_eq!(StockBand::from_stock(-4), StockBand::Agotado);
    /// assert_eq!(StockBand::from_stock(2), StockBand::Critico);
    /// assert_eq!(StockBand::from_stock(3), StockBand::Bajo);
    /// assert_eq!(StockBand::from_stock(6), StockBand::Normal);
    /// ```
    pub fn from_stock(stock: i64) -> Self {
        match stock {
            i64::MIN..=0 => StockBand::Agotado,
            1..=2 => StockBand::Critico,
            3..=5 => StockBand::Bajo,
            _ => StockBand::Normal,
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            StockBand::Agotado => "agotado",
            StockBand::Critico => "crítico",
            StockBand::Bajo => "bajo",
            StockBand::Normal => "normal",
        }
    }
}

impl fmt::Display for StockBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts the labels with or without the accent.
impl FromStr for StockBand {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "agotado" => Ok(StockBand::Agotado),
            "critico" | "crítico" => Ok(StockBand::Critico),
            "bajo" => Ok(StockBand::Bajo),
            "normal" => Ok(StockBand::Normal),
            other => Err(CoreError::UnknownStockBand(other.to_string())),
        }
    }
}

// =============================================================================
// Stock Line
// =============================================================================

/// Raw per-product aggregates read from the store.
///
/// Every aggregate defaults to zero for a product with no purchases or sales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductAggregates {
    pub product_id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub total_purchased: i64,
    pub total_sold: i64,
    /// Σ purchase.unit_cost over the product's purchases.
    pub unit_cost_sum: Money,
    pub purchase_count: i64,
    pub latest_price: Option<Money>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the inventory snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductStockLine {
    pub product_id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub total_purchased: i64,
    pub total_sold: i64,
    /// May be negative (oversold).
    pub stock: i64,
    pub avg_unit_cost: Money,
    /// `stock × avg_unit_cost`; negative when oversold.
    pub valuation: Money,
    /// Latest suggested price, zero if the product has no price history.
    pub recommended_price: Money,
    pub band: StockBand,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl ProductStockLine {
    /// Derives the stock line from raw aggregates.
    ///
    /// `avg_unit_cost` is the plain mean of purchase unit costs (not weighted
    /// by quantity), rounded half-up to the cent, and zero with no purchases.
    ///
    /// ## Errors
    /// `OutOfRange` when the stock or its valuation does not fit in cents.
    pub fn from_aggregates(agg: ProductAggregates) -> ValidationResult<Self> {
        let stock = agg
            .total_purchased
            .checked_sub(agg.total_sold)
            .ok_or_else(|| out_of_range("stock"))?;
        let avg_unit_cost = agg
            .unit_cost_sum
            .divide_by(agg.purchase_count)
            .unwrap_or_default();
        let valuation = avg_unit_cost
            .checked_multiply_quantity(stock)
            .ok_or_else(|| out_of_range("valuation"))?;

        Ok(ProductStockLine {
            product_id: agg.product_id,
            name: agg.name,
            brand: agg.brand,
            total_purchased: agg.total_purchased,
            total_sold: agg.total_sold,
            stock,
            avg_unit_cost,
            valuation,
            recommended_price: agg.latest_price.unwrap_or_default(),
            band: StockBand::from_stock(stock),
            updated_at: agg.updated_at,
        })
    }
}

fn out_of_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: i64::MIN,
        max: i64::MAX,
    }
}

// =============================================================================
// Query (filter + sort)
// =============================================================================

/// Field an inventory snapshot is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Stock,
    Valuation,
}

/// Sort order for inventory snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventorySort {
    pub field: SortField,
    pub descending: bool,
}

/// Parses `name`, `stock`, `valuation`, with a leading `-` for descending.
impl FromStr for InventorySort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (descending, key) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let field = match key {
            "name" => SortField::Name,
            "stock" => SortField::Stock,
            "valuation" => SortField::Valuation,
            _ => return Err(CoreError::UnknownSortKey(s.to_string())),
        };
        Ok(InventorySort { field, descending })
    }
}

/// Optional filter and sort applied to a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryQuery {
    /// Case-insensitive substring of name or brand.
    pub search: Option<String>,
    pub band: Option<StockBand>,
    pub sort: Option<InventorySort>,
}

impl InventoryQuery {
    fn matches(&self, line: &ProductStockLine) -> bool {
        if let Some(band) = self.band {
            if line.band != band {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                line.name.to_lowercase().contains(&needle)
                    || line
                        .brand
                        .as_deref()
                        .map(|b| b.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            }
            _ => true,
        }
    }

    /// Filters then sorts the lines. Without a sort the input order is kept.
    ///
    /// Sorting is stable, so equal keys keep their input order.
    pub fn apply(&self, lines: Vec<ProductStockLine>) -> Vec<ProductStockLine> {
        let mut lines: Vec<ProductStockLine> = lines.into_iter().filter(|l| self.matches(l)).collect();

        if let Some(sort) = self.sort {
            lines.sort_by(|a, b| {
                let ord = match sort.field {
                    SortField::Name => a.name.cmp(&b.name),
                    SortField::Stock => a.stock.cmp(&b.stock),
                    SortField::Valuation => a.valuation.cmp(&b.valuation),
                };
                if sort.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        lines
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Aggregate figures folded over a list of stock lines.
///
/// The empty list yields all zeros (`Default`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryStatistics {
    pub product_count: i64,
    pub total_stock: i64,
    pub total_valuation: Money,
    /// Mean valuation per product, rounded half-up to the cent.
    pub average_valuation: Money,
    pub agotado: i64,
    pub critico: i64,
    pub bajo: i64,
    pub normal: i64,
}

impl InventoryStatistics {
    /// Folds the lines into statistics.
    ///
    /// Stock and valuation totals are checked; overflow is `OutOfRange`.
    pub fn from_lines(lines: &[ProductStockLine]) -> ValidationResult<Self> {
        let mut stats = InventoryStatistics::default();

        for line in lines {
            stats.product_count += 1;
            stats.total_stock = stats
                .total_stock
                .checked_add(line.stock)
                .ok_or_else(|| out_of_range("total_stock"))?;
            stats.total_valuation = stats
                .total_valuation
                .checked_add(line.valuation)
                .ok_or_else(|| out_of_range("total_valuation"))?;
            match line.band {
                StockBand::Agotado => stats.agotado += 1,
                StockBand::Critico => stats.critico += 1,
                StockBand::Bajo => stats.bajo += 1,
                StockBand::Normal => stats.normal += 1,
            }
        }

        stats.average_valuation = stats
            .total_valuation
            .divide_by(stats.product_count)
            .unwrap_or_default();
        Ok(stats)
    }

    /// Number of products in the given band.
    pub fn count(&self, band: StockBand) -> i64 {
        match band {
            StockBand::Agotado => self.agotado,
            StockBand::Critico => self.critico,
            StockBand::Bajo => self.bajo,
            StockBand::Normal => self.normal,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(id: i64, name: &str, purchased: i64, sold: i64, unit_costs: &[i64]) -> ProductAggregates {
        ProductAggregates {
            product_id: id,
            name: name.to_string(),
            brand: None,
            total_purchased: purchased,
            total_sold: sold,
            unit_cost_sum: Money::from_cents(unit_costs.iter().sum()),
            purchase_count: unit_costs.len() as i64,
            latest_price: None,
            updated_at: Utc::now(),
        }
    }

    fn line(agg: ProductAggregates) -> ProductStockLine {
        ProductStockLine::from_aggregates(agg).unwrap()
    }

    #[test]
    fn test_valuation_overflow_is_out_of_range() {
        let mut huge = agg(1, "Oro", i64::MAX, 0, &[]);
        huge.unit_cost_sum = Money::from_cents(crate::validation::MAX_AMOUNT_CENTS);
        huge.purchase_count = 1;

        let err = ProductStockLine::from_aggregates(huge).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "valuation"));
    }

    #[test]
    fn test_statistics_total_overflow_is_out_of_range() {
        let mut big = line(agg(1, "A", 1, 0, &[100]));
        big.valuation = Money::from_cents(i64::MAX);
        let lines = vec![big.clone(), big];

        let err = InventoryStatistics::from_lines(&lines).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "total_valuation"));
    }

    #[test]
    fn test_band_boundaries() {
        let expected = [
            (-1, StockBand::Agotado),
            (0, StockBand::Agotado),
            (1, StockBand::Critico),
            (2, StockBand::Critico),
            (3, StockBand::Bajo),
            (5, StockBand::Bajo),
            (6, StockBand::Normal),
            (1000, StockBand::Normal),
        ];
        for (stock, band) in expected {
            assert_eq!(StockBand::from_stock(stock), band, "stock {}", stock);
        }
    }

    #[test]
    fn test_band_parse() {
        assert_eq!("crítico".parse::<StockBand>().unwrap(), StockBand::Critico);
        assert_eq!("CRITICO".parse::<StockBand>().unwrap(), StockBand::Critico);
        assert!("low".parse::<StockBand>().is_err());
    }

    #[test]
    fn test_stock_line_reference_scenario() {
        // 30 purchased at avg 5.00, 25 sold
        let line = line(agg(1, "Café", 30, 25, &[400, 600]));
        assert_eq!(line.stock, 5);
        assert_eq!(line.band, StockBand::Bajo);
        assert_eq!(line.avg_unit_cost.cents(), 500);
        assert_eq!(line.valuation.cents(), 2_500);
        assert!(line.recommended_price.is_zero());
    }

    #[test]
    fn test_stock_line_without_purchases() {
        let line = line(agg(1, "Sal", 0, 3, &[]));
        assert_eq!(line.stock, -3);
        assert_eq!(line.band, StockBand::Agotado);
        assert!(line.avg_unit_cost.is_zero());
        assert!(line.valuation.is_zero());
    }

    #[test]
    fn test_oversold_valuation_is_negative() {
        let line = line(agg(1, "Té", 2, 4, &[1000]));
        assert_eq!(line.stock, -2);
        assert_eq!(line.valuation.cents(), -2_000);
    }

    #[test]
    fn test_query_filters_and_sorts() {
        let mut lines = vec![
            line(agg(1, "Café", 10, 0, &[100])),
            line(agg(2, "Arroz", 4, 0, &[300])),
            line(agg(3, "Azúcar", 1, 0, &[50])),
        ];
        lines[1].brand = Some("La Costeña".to_string());

        let by_name = InventoryQuery {
            sort: Some("name".parse().unwrap()),
            ..Default::default()
        }
        .apply(lines.clone());
        let names: Vec<_> = by_name.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Arroz", "Azúcar", "Café"]);

        let by_value_desc = InventoryQuery {
            sort: Some("-valuation".parse().unwrap()),
            ..Default::default()
        }
        .apply(lines.clone());
        assert_eq!(by_value_desc[0].product_id, 2); // 4 × 3.00 = 12.00

        let bajo = InventoryQuery {
            band: Some(StockBand::Bajo),
            ..Default::default()
        }
        .apply(lines.clone());
        assert_eq!(bajo.len(), 1);
        assert_eq!(bajo[0].product_id, 2);

        let by_brand = InventoryQuery {
            search: Some("costeña".to_string()),
            ..Default::default()
        }
        .apply(lines);
        assert_eq!(by_brand.len(), 1);
    }

    #[test]
    fn test_sort_parse() {
        let sort: InventorySort = "-stock".parse().unwrap();
        assert_eq!(sort.field, SortField::Stock);
        assert!(sort.descending);
        assert!("price".parse::<InventorySort>().is_err());
    }

    #[test]
    fn test_statistics() {
        let lines = vec![
            line(agg(1, "A", 10, 0, &[100])), // normal, 10.00
            line(agg(2, "B", 4, 0, &[300])),  // bajo, 12.00
            line(agg(3, "C", 1, 0, &[50])),   // crítico, 0.50
            line(agg(4, "D", 1, 2, &[50])),   // agotado, -0.50
        ];
        let stats = InventoryStatistics::from_lines(&lines).unwrap();
        assert_eq!(stats.product_count, 4);
        assert_eq!(stats.total_stock, 14);
        assert_eq!(stats.total_valuation.cents(), 2_200);
        assert_eq!(stats.average_valuation.cents(), 550);
        assert_eq!(stats.count(StockBand::Agotado), 1);
        assert_eq!(stats.count(StockBand::Critico), 1);
        assert_eq!(stats.count(StockBand::Bajo), 1);
        assert_eq!(stats.count(StockBand::Normal), 1);
    }

    #[test]
    fn test_statistics_empty() {
        assert_eq!(InventoryStatistics::from_lines(&[]).unwrap(), InventoryStatistics::default());
    }
}
