//! Automation execution log models.
//!
//! Execution rows are the engine's audit trail: append-only, no
//! `updated_at`, and no update/delete DTOs exist anywhere.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use meridian_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An execution log row from the `automation_executions` table.
/// Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AutomationExecution {
    pub id: DbId,
    pub rule_id: DbId,
    pub customer_id: DbId,
    pub trigger_payload: serde_json::Value,
    pub result_payload: serde_json::Value,
    pub status: String,
    pub error_message: Option<String>,
    pub executed_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for appending an execution log entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExecution {
    pub rule_id: DbId,
    pub customer_id: DbId,
    pub trigger_payload: serde_json::Value,
    pub result_payload: serde_json::Value,
    pub status: String,
    pub error_message: Option<String>,
}
