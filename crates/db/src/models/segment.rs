//! Customer segment models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use meridian_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A segment row from the `customer_segments` table.
///
/// `cached_member_count` is advisory only: campaign sends always re-evaluate
/// the criteria live.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CustomerSegment {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub criteria: serde_json::Value,
    pub cached_member_count: i64,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A membership cache row from the `segment_memberships` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SegmentMembership {
    pub id: DbId,
    pub segment_id: DbId,
    pub customer_id: DbId,
    pub added_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for creating a new segment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSegment {
    pub name: String,
    pub description: Option<String>,
    pub criteria: serde_json::Value,
    pub created_by: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// Input for updating an existing segment. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSegment {
    pub name: Option<String>,
    pub description: Option<String>,
    pub criteria: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}
