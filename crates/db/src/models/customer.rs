//! Customer models.
//!
//! The storefront owns customer CRUD; this engine reads customers for
//! criteria queries and contact resolution. The create DTO exists for
//! seeding and tests.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use meridian_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A customer row from the `customers` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: DbId,
    pub email: String,
    pub phone: Option<String>,
    pub full_name: String,
    pub birth_date: Option<chrono::NaiveDate>,
    pub total_spent: f64,
    pub order_count: i32,
    pub last_purchase_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for inserting a customer record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomer {
    pub email: String,
    pub phone: Option<String>,
    pub full_name: String,
    pub birth_date: Option<chrono::NaiveDate>,
    pub total_spent: Option<f64>,
    pub order_count: Option<i32>,
    pub last_purchase_at: Option<Timestamp>,
}
