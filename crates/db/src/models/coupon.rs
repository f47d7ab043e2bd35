//! Coupon models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use meridian_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A coupon row from the `coupons` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Coupon {
    pub id: DbId,
    pub customer_id: DbId,
    pub code: String,
    pub percent_off: f64,
    pub single_use: bool,
    pub redeemed_at: Option<Timestamp>,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for minting a coupon.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCoupon {
    pub customer_id: DbId,
    pub code: String,
    pub percent_off: f64,
    pub expires_at: Timestamp,
}
