//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD operations
//! - Case-insensitive search on name and brand
//! - Guarded delete
//!
//! ## Delete Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Delete                                       │
//! │                                                                         │
//! │  delete(id)                                                            │
//! │     │                                                                   │
//! │     ├── purchases reference it? ──► ReferentialConflict (nothing done) │
//! │     ├── sales reference it?     ──► ReferentialConflict (nothing done) │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  DELETE product (its price history goes with it)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::{clean_optional, count_referencing, like_pattern};
use crate::error::{DbError, DbResult};
use stockbook_core::validation::validate_new_product;
use stockbook_core::{NewProduct, Product};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.create(&NewProduct { name: "Aceite 1L".into(), brand: None }).await?;
/// let results = repo.list(Some("aceite")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with its assigned id
    /// * `Err(DbError::Validation)` - Blank or too-long name
    pub async fn create(&self, input: &NewProduct) -> DbResult<Product> {
        validate_new_product(input)?;

        debug!(name = %input.name, "Creating product");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO products (name, brand, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            "#,
        )
        .bind(input.name.trim())
        .bind(clean_optional(input.brand.as_deref()))
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, brand, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products ordered by name, optionally filtered by a substring of
    /// name or brand.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Product>> {
        let pattern = like_pattern(search)?;

        debug!(search = ?pattern, "Listing products");

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, brand, created_at, updated_at
            FROM products
            WHERE ?1 IS NULL
               OR name LIKE ?1 ESCAPE '\'
               OR brand LIKE ?1 ESCAPE '\'
            ORDER BY name, id
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Updates an existing product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The product after the update
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: i64, input: &NewProduct) -> DbResult<Product> {
        validate_new_product(input)?;

        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                brand = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(clean_optional(input.brand.as_deref()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product that nothing references.
    ///
    /// ## Returns
    /// * `Ok(())` - Product and its price history removed
    /// * `Err(DbError::ReferentialConflict)` - Purchases or sales reference it
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let mut tx = self.pool.begin().await?;

        let purchases = count_referencing(&mut tx, "purchases", "product_id", id).await?;
        if purchases > 0 {
            warn!(id, purchases, "Product delete blocked");
            return Err(DbError::conflict("Product", id, "purchases", purchases));
        }

        let sales = count_referencing(&mut tx, "sales", "product_id", id).await?;
        if sales > 0 {
            warn!(id, sales, "Product delete blocked");
            return Err(DbError::conflict("Product", id, "sales", sales));
        }

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Counts total products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
