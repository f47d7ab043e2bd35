//! In-app notification models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use meridian_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A notification row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: DbId,
    pub customer_id: DbId,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for writing a new in-app notification.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotification {
    pub customer_id: DbId,
    pub title: String,
    pub body: String,
}
