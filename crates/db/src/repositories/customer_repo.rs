//! Repository for the `customers` table.
//!
//! Customers are written by the storefront; this engine only needs inserts
//! for seeding, plus contact resolution and counting.

use sqlx::PgPool;
use meridian_core::types::DbId;

use crate::models::customer::{CreateCustomer, Customer};

/// Column list for customers queries.
const COLUMNS: &str = "id, email, phone, full_name, birth_date, total_spent, \
    order_count, last_purchase_at, created_at";

/// Provides read access (and seed inserts) for customers.
pub struct CustomerRepo;

impl CustomerRepo {
    /// Insert a new customer, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCustomer) -> Result<Customer, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers
                (email, phone, full_name, birth_date, total_spent, order_count, last_purchase_at)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, 0), $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.full_name)
            .bind(input.birth_date)
            .bind(input.total_spent)
            .bind(input.order_count)
            .bind(input.last_purchase_at)
            .fetch_one(pool)
            .await
    }

    /// Find a customer by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a batch of customers by id, ascending. Used by campaign fan-out
    /// to resolve contact info for a whole membership in one round trip.
    pub async fn list_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Customer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM customers WHERE id = ANY($1) ORDER BY id ASC"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Total number of customers.
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
