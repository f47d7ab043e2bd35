//! Personalized offer models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use meridian_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An offer row from the `personalized_offers` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PersonalizedOffer {
    pub id: DbId,
    pub customer_id: DbId,
    pub discount_percent: f64,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for persisting a personalized offer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOffer {
    pub customer_id: DbId,
    pub discount_percent: f64,
    pub expires_at: Timestamp,
}
