//! # Customer Repository
//!
//! Database operations for customers.
//!
//! Deleting a customer never fails because of sales: the sales stay and
//! become anonymous (`customer_id = NULL`).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::like_pattern;
use crate::error::{DbError, DbResult};
use stockbook_core::validation::validate_new_customer;
use stockbook_core::{Customer, NewCustomer};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer.
    pub async fn create(&self, input: &NewCustomer) -> DbResult<Customer> {
        validate_new_customer(input)?;

        debug!(first_name = %input.first_name, last_name = %input.last_name, "Creating customer");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO customers (first_name, last_name, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            "#,
        )
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, first_name, last_name, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists customers by last then first name, optionally filtered by a
    /// substring of either name.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Customer>> {
        let pattern = like_pattern(search)?;

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, first_name, last_name, created_at, updated_at
            FROM customers
            WHERE ?1 IS NULL
               OR first_name LIKE ?1 ESCAPE '\'
               OR last_name LIKE ?1 ESCAPE '\'
            ORDER BY last_name, first_name, id
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Updates an existing customer.
    pub async fn update(&self, id: i64, input: &NewCustomer) -> DbResult<Customer> {
        validate_new_customer(input)?;

        debug!(id = %id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                first_name = ?2,
                last_name = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Deletes a customer, detaching their sales.
    ///
    /// ## Returns
    /// Number of sales that became anonymous.
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        debug!(id = %id, "Deleting customer");

        let mut tx = self.pool.begin().await?;

        let detached = sqlx::query(
            r#"
            UPDATE sales SET customer_id = NULL, updated_at = ?2
            WHERE customer_id = ?1
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        if detached > 0 {
            info!(id = %id, detached, "Customer deleted; sales kept as anonymous");
        }

        Ok(detached)
    }

    /// Counts total customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
