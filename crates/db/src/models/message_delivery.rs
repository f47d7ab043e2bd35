//! Outbound message delivery record models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use meridian_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A delivery record row from the `message_deliveries` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MessageDelivery {
    pub id: DbId,
    pub customer_id: DbId,
    pub channel: String,
    pub recipient: String,
    pub subject: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for recording an outbound delivery attempt.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMessageDelivery {
    pub customer_id: DbId,
    pub channel: String,
    pub recipient: String,
    pub subject: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
}
