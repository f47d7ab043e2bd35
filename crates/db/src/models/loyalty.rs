//! Loyalty account and ledger models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use meridian_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A loyalty account row from the `loyalty_accounts` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LoyaltyAccount {
    pub id: DbId,
    pub customer_id: DbId,
    pub tier: i32,
    pub points_balance: i64,
    pub updated_at: Timestamp,
}

/// A ledger row from the `loyalty_transactions` table. Append-only.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LoyaltyTransaction {
    pub id: DbId,
    pub customer_id: DbId,
    pub points_delta: i64,
    pub balance_after: i64,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}
