//! Marketing campaign models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use meridian_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A campaign row from the `marketing_campaigns` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MarketingCampaign {
    pub id: DbId,
    pub name: String,
    pub campaign_type: String,
    pub status: String,
    pub target_segment_id: DbId,
    pub content: serde_json::Value,
    pub schedule: Option<serde_json::Value>,
    pub metrics: serde_json::Value,
    pub retry_pending: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for creating a new campaign (persisted as draft).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaign {
    pub name: String,
    pub campaign_type: String,
    pub target_segment_id: DbId,
    pub content: serde_json::Value,
    pub schedule: Option<serde_json::Value>,
    pub created_by: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Send summary
// ---------------------------------------------------------------------------

/// Dispatch counters written into `metrics` after a send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMetrics {
    pub targeted: i64,
    pub dispatched: i64,
    pub failed: i64,
}
