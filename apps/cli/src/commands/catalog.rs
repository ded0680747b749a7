//! # Catalog Commands
//!
//! Products, suppliers and customers: the reference data purchases and
//! sales point at.
//!
//! ## Delete Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  delete product  ──► CONFLICT while purchases or sales reference it    │
//! │  delete supplier ──► CONFLICT while purchases reference it             │
//! │  delete customer ──► always allowed; their sales become anonymous      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use super::Deleted;
use crate::error::ApiError;
use stockbook_core::{Customer, NewCustomer, NewProduct, NewSupplier, Product, Supplier};
use stockbook_db::Database;

// =============================================================================
// Products
// =============================================================================

pub async fn list_products(db: &Database, search: Option<&str>) -> Result<Vec<Product>, ApiError> {
    Ok(db.products().list(search).await?)
}

pub async fn add_product(db: &Database, input: &NewProduct) -> Result<Product, ApiError> {
    let product = db.products().create(input).await?;
    info!(id = product.id, name = %product.name, "Product added");
    Ok(product)
}

pub async fn edit_product(db: &Database, id: i64, input: &NewProduct) -> Result<Product, ApiError> {
    Ok(db.products().update(id, input).await?)
}

pub async fn delete_product(db: &Database, id: i64) -> Result<Deleted, ApiError> {
    db.products().delete(id).await?;
    Ok(Deleted::new("product", id))
}

// =============================================================================
// Suppliers
// =============================================================================

pub async fn list_suppliers(db: &Database, search: Option<&str>) -> Result<Vec<Supplier>, ApiError> {
    Ok(db.suppliers().list(search).await?)
}

pub async fn add_supplier(db: &Database, input: &NewSupplier) -> Result<Supplier, ApiError> {
    let supplier = db.suppliers().create(input).await?;
    info!(id = supplier.id, company = %supplier.company, "Supplier added");
    Ok(supplier)
}

pub async fn edit_supplier(db: &Database, id: i64, input: &NewSupplier) -> Result<Supplier, ApiError> {
    Ok(db.suppliers().update(id, input).await?)
}

pub async fn delete_supplier(db: &Database, id: i64) -> Result<Deleted, ApiError> {
    db.suppliers().delete(id).await?;
    Ok(Deleted::new("supplier", id))
}

// =============================================================================
// Customers
// =============================================================================

pub async fn list_customers(db: &Database, search: Option<&str>) -> Result<Vec<Customer>, ApiError> {
    Ok(db.customers().list(search).await?)
}

pub async fn add_customer(db: &Database, input: &NewCustomer) -> Result<Customer, ApiError> {
    let customer = db.customers().create(input).await?;
    info!(id = customer.id, "Customer added");
    Ok(customer)
}

pub async fn edit_customer(db: &Database, id: i64, input: &NewCustomer) -> Result<Customer, ApiError> {
    Ok(db.customers().update(id, input).await?)
}

/// Deletes the customer and reports how many sales were detached from them.
pub async fn delete_customer(db: &Database, id: i64) -> Result<Deleted, ApiError> {
    let detached = db.customers().delete(id).await?;
    Ok(Deleted::new("customer", id).with_detached_sales(detached))
}

// =============================================================================
// Unit Tests
// =============================================================================
