//! # Seed Data Generator
//!
//! Populates a development ledger with products, suppliers, customers,
//! purchases and two weeks of sales.
//!
//! ## Usage
//! ```bash
//! # Seed ./stockbook_dev.db with 14 days of sales (default)
//! cargo run -p stockbook-db --bin seed
//!
//! # More history
//! cargo run -p stockbook-db --bin seed -- --days 60
//!
//! # Specify database path
//! cargo run -p stockbook-db --bin seed -- --db ./data/stockbook.db
//! ```
//!
//! Values are derived from loop indices, so two runs against empty
//! databases produce the same ledger.

use chrono::{Duration, Utc};
use std::env;
use stockbook_core::{InventoryQuery, NewCustomer, NewProduct, NewPurchase, NewSale, NewSupplier};
use stockbook_db::{Database, DbConfig};

/// (name, brand, unit cost in cents)
const PRODUCTS: &[(&str, &str, i64)] = &[
    ("Aceite de girasol 1L", "Natura", 1_450),
    ("Arroz largo fino 1kg", "Gallo", 980),
    ("Azúcar 1kg", "Ledesma", 760),
    ("Café molido 500g", "La Virginia", 3_200),
    ("Fideos spaghetti 500g", "Matarazzo", 690),
    ("Harina 000 1kg", "Pureza", 540),
    ("Leche entera 1L", "La Serenísima", 820),
    ("Yerba mate 1kg", "Playadito", 2_750),
];

const SUPPLIERS: &[(&str, &str)] = &[
    ("Distribuidora Norte", "011-4555-0101"),
    ("Mayorista del Sur", "011-4555-0202"),
    ("Almacén Central SRL", "011-4555-0303"),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Ana", "Pérez"),
    ("Luis", "Gómez"),
    ("Marta", "Álvarez"),
    ("Jorge", "Fernández"),
];

/// Margins in basis points, cycled over purchases.
const MARGINS_BPS: &[u32] = &[2000, 2500, 3000, 3500];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut days: i64 = 14;
    let mut db_path = String::from("./stockbook_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(14);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --days <N>     Days of sales history to generate (default: 14)");
                println!("  -d, --db <PATH>    Database file path (default: ./stockbook_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stockbook Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Days:     {}", days);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Reference data
    let mut product_ids = Vec::with_capacity(PRODUCTS.len());
    for (name, brand, _) in PRODUCTS {
        let product = db
            .products()
            .create(&NewProduct {
                name: name.to_string(),
                brand: Some(brand.to_string()),
            })
            .await?;
        product_ids.push(product.id);
    }

    let mut supplier_ids = Vec::with_capacity(SUPPLIERS.len());
    for (company, phone) in SUPPLIERS {
        let supplier = db
            .suppliers()
            .create(&NewSupplier {
                company: company.to_string(),
                phone: Some(phone.to_string()),
                products: None,
            })
            .await?;
        supplier_ids.push(supplier.id);
    }

    let mut customer_ids = Vec::with_capacity(CUSTOMERS.len());
    for (first_name, last_name) in CUSTOMERS {
        let customer = db
            .customers()
            .create(&NewCustomer {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            })
            .await?;
        customer_ids.push(customer.id);
    }

    println!(
        "✓ {} products, {} suppliers, {} customers",
        product_ids.len(),
        supplier_ids.len(),
        customer_ids.len()
    );

    // Two restocks per product, the second one slightly dearer.
    let today = Utc::now().date_naive();
    let mut purchases = 0;
    for (idx, (&product_id, (_, _, unit_cost))) in product_ids.iter().zip(PRODUCTS).enumerate() {
        for round in 0..2_i64 {
            let quantity = 12 + ((idx as i64 * 7 + round * 5) % 18);
            let unit = unit_cost + round * unit_cost / 20;
            db.purchases()
                .create(&NewPurchase {
                    invoice_number: format!("FC-{:04}-{}", idx + 1, round + 1),
                    purchased_on: today - Duration::days(days + 7 - round * 7),
                    supplier_id: supplier_ids[(idx + round as usize) % supplier_ids.len()],
                    product_id,
                    total_cost_cents: unit * quantity,
                    quantity,
                    margin_bps: MARGINS_BPS[(idx + round as usize) % MARGINS_BPS.len()],
                    unit_cost_cents: None,
                })
                .await?;
            purchases += 1;
        }
    }
    println!("✓ {} purchases (price history updated)", purchases);

    // Sales spread over the last `days` days, priced from the latest suggestion.
    let mut sales = 0;
    let now = Utc::now();
    for day in 0..days {
        let per_day = 2 + (day % 4);
        for n in 0..per_day {
            let seed = (day * 31 + n * 17) as usize;
            let product_id = product_ids[seed % product_ids.len()];
            let price = db
                .price_history()
                .latest_price(product_id)
                .await?
                .map(|p| p.cents())
                .unwrap_or(1_000);
            let customer_id = if seed % 3 == 0 {
                None
            } else {
                Some(customer_ids[seed % customer_ids.len()])
            };

            db.sales()
                .create(&NewSale {
                    product_id,
                    customer_id,
                    unit_price_cents: price,
                    quantity: 1 + (seed as i64 % 3),
                    created_at: Some(now - Duration::days(day) - Duration::minutes(n * 45)),
                })
                .await?;
            sales += 1;
        }
    }
    println!("✓ {} sales", sales);

    let rolled = db.analytics().recompute_all().await?;
    println!("✓ Daily analytics for {} days", rolled.len());

    let elapsed = start.elapsed();
    println!();
    println!("✓ Seeded in {:?}", elapsed);

    let stats = db.inventory().statistics(&InventoryQuery::default()).await?;
    println!();
    println!("Inventory");
    println!("  Units in stock:   {}", stats.total_stock);
    println!("  Valuation:        {}", stats.total_valuation);
    println!(
        "  Bands:            agotado={} crítico={} bajo={} normal={}",
        stats.agotado, stats.critico, stats.bajo, stats.normal
    );

    let dashboard = db.reports().dashboard(today).await?;
    println!();
    println!("Dashboard");
    println!("{}", serde_json::to_string_pretty(&dashboard)?);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
