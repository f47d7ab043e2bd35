//! Automation rule models and DTOs.
//!
//! Defines the database row struct for `automation_rules` and associated
//! create / update types used by the repository and API layers.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use meridian_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An automation rule row from the `automation_rules` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: DbId,
    pub name: String,
    pub trigger_type: String,
    pub trigger_conditions: serde_json::Value,
    pub action_type: String,
    pub action_config: serde_json::Value,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A rule annotated with execution aggregates from the execution log.
///
/// Read-side join for observability; not part of the rule's own state.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RuleWithStats {
    pub id: DbId,
    pub name: String,
    pub trigger_type: String,
    pub trigger_conditions: serde_json::Value,
    pub action_type: String,
    pub action_config: serde_json::Value,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub execution_count: i64,
    pub success_count: i64,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for creating a new automation rule.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAutomationRule {
    pub name: String,
    pub trigger_type: String,
    pub trigger_conditions: serde_json::Value,
    pub action_type: String,
    pub action_config: serde_json::Value,
    pub is_active: Option<bool>,
    pub created_by: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// Input for updating an existing rule. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAutomationRule {
    pub name: Option<String>,
    pub trigger_type: Option<String>,
    pub trigger_conditions: Option<serde_json::Value>,
    pub action_type: Option<String>,
    pub action_config: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}
