//! # Supplier Repository
//!
//! Database operations for suppliers. Company names are unique; a supplier
//! that purchases still reference cannot be deleted.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use super::{clean_optional, count_referencing, like_pattern};
use crate::error::{DbError, DbResult};
use stockbook_core::validation::validate_new_supplier;
use stockbook_core::{NewSupplier, Supplier, ValidationError};

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Inserts a new supplier.
    ///
    /// ## Returns
    /// * `Ok(Supplier)` - Inserted supplier
    /// * `Err(DbError::Validation)` - Blank company or company already taken
    pub async fn create(&self, input: &NewSupplier) -> DbResult<Supplier> {
        validate_new_supplier(input)?;

        let company = input.company.trim();
        debug!(company = %company, "Creating supplier");

        let mut tx = self.pool.begin().await?;
        ensure_company_free(&mut tx, company, None).await?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO suppliers (company, phone, products, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(company)
        .bind(clean_optional(input.phone.as_deref()))
        .bind(clean_optional(input.products.as_deref()))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// Gets a supplier by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, company, phone, products, created_at, updated_at
            FROM suppliers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Lists suppliers ordered by company, optionally filtered by a
    /// substring of the company name.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Supplier>> {
        let pattern = like_pattern(search)?;

        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, company, phone, products, created_at, updated_at
            FROM suppliers
            WHERE ?1 IS NULL OR company LIKE ?1 ESCAPE '\'
            ORDER BY company, id
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    /// Updates an existing supplier.
    pub async fn update(&self, id: i64, input: &NewSupplier) -> DbResult<Supplier> {
        validate_new_supplier(input)?;

        let company = input.company.trim();
        debug!(id = %id, company = %company, "Updating supplier");

        let mut tx = self.pool.begin().await?;
        ensure_company_free(&mut tx, company, Some(id)).await?;

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                company = ?2,
                phone = ?3,
                products = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(company)
        .bind(clean_optional(input.phone.as_deref()))
        .bind(clean_optional(input.products.as_deref()))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// Deletes a supplier that no purchase references.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting supplier");

        let mut tx = self.pool.begin().await?;

        let purchases = count_referencing(&mut tx, "purchases", "supplier_id", id).await?;
        if purchases > 0 {
            warn!(id, purchases, "Supplier delete blocked");
            return Err(DbError::conflict("Supplier", id, "purchases", purchases));
        }

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Counts total suppliers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Fails with `Duplicate` when another supplier already uses `company`.
async fn ensure_company_free(conn: &mut SqliteConnection, company: &str, except_id: Option<i64>) -> DbResult<()> {
    let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers WHERE company = ?1 AND id != ?2")
        .bind(company)
        .bind(except_id.unwrap_or(0))
        .fetch_one(&mut *conn)
        .await?;

    if taken > 0 {
        return Err(ValidationError::duplicate("company", company).into());
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;

    fn input(company: &str) -> NewSupplier {
        NewSupplier {
            company: company.to_string(),
            phone: Some("555-0100".to_string()),
            products: Some("harinas, aceites".to_string()),
        }
    }

    #[tokio::test]
    async fn test_duplicate_company_rejected() {
        let db = test_db().await;
        db.suppliers().create(&input("Distribuidora Norte")).await.unwrap();

        let err = db.suppliers().create(&input(" Distribuidora Norte ")).await.unwrap_err();

        assert!(matches!(err, DbError::Validation(ValidationError::Duplicate { .. })));
        assert_eq!(db.suppliers().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_own_company() {
        let db = test_db().await;
        let s = db.suppliers().create(&input("Distribuidora Norte")).await.unwrap();

        let mut changed = input("Distribuidora Norte");
        changed.phone = None;
        let updated = db.suppliers().update(s.id, &changed).await.unwrap();

        assert_eq!(updated.phone, None);
        assert_eq!(updated.company, "Distribuidora Norte");
    }

    #[tokio::test]
    async fn test_update_to_taken_company_rejected() {
        let db = test_db().await;
        db.suppliers().create(&input("Norte")).await.unwrap();
        let sur = db.suppliers().create(&input("Sur")).await.unwrap();

        let err = db.suppliers().update(sur.id, &input("Norte")).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(ValidationError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn test_delete_guarded_by_purchases() {
        let db = test_db().await;
        let s = supplier(&db, "Norte").await;
        let p = product(&db, "Azucar").await;
        db.purchases()
            .create(&purchase_input("F-9", s.id, p.id, 5_000, 5, 1000))
            .await
            .unwrap();

        let err = db.suppliers().delete(s.id).await.unwrap_err();
        assert!(matches!(err, DbError::ReferentialConflict { count: 1, .. }));

        let unused = supplier(&db, "Sur").await;
        db.suppliers().delete(unused.id).await.unwrap();
        assert_eq!(db.suppliers().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_filters_by_company() {
        let db = test_db().await;
        supplier(&db, "Lacteos del Valle").await;
        supplier(&db, "Carnes Premium").await;

        let hits = db.suppliers().list(Some("valle")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].company, "Lacteos del Valle");
    }
}
