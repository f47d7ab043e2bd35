//! Handlers for the `/automations` resource.
//!
//! Rule management requires the admin role; firing a single rule is open to
//! any authenticated principal (storefront services hold the `service` role).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use meridian_core::automation::{
    conditions_match, validate_rule_name, validate_trigger_conditions, ActionType, TriggerType,
};
use meridian_core::error::CoreError;
use meridian_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use meridian_core::types::DbId;
use meridian_db::models::automation_rule::{
    AutomationRule, CreateAutomationRule, UpdateAutomationRule,
};
use meridian_db::repositories::{AutomationRuleRepo, ExecutionLogRepo};

use crate::engine::executor::{ActionContext, ActionExecutor};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Principal;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for toggling a rule's active flag.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub is_active: bool,
}

/// Request body for firing one rule directly.
#[derive(Debug, Deserialize)]
pub struct TriggerRuleRequest {
    pub rule_id: DbId,
    pub customer_id: DbId,
    #[serde(default)]
    pub trigger_data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a rule exists, returning the full row.
async fn ensure_rule_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<AutomationRule> {
    AutomationRuleRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Rule", id }))
}

/// Validate the closed-enum and document fields of a rule create/update.
fn validate_rule_fields(
    trigger_type: Option<&str>,
    trigger_conditions: Option<&serde_json::Value>,
    action_type: Option<&str>,
    action_config: Option<&serde_json::Value>,
) -> AppResult<()> {
    if let Some(tt) = trigger_type {
        TriggerType::from_str(tt)?;
    }
    if let Some(conditions) = trigger_conditions {
        validate_trigger_conditions(conditions)?;
    }
    if let Some(at) = action_type {
        ActionType::from_str(at)?;
    }
    if let Some(config) = action_config {
        if !config.is_object() {
            return Err(CoreError::Validation(
                "action_config must be a JSON object".to_string(),
            )
            .into());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// POST /automations
// ---------------------------------------------------------------------------

/// Create a new automation rule. Rejected before persistence unless the
/// trigger and action types come from the closed enums.
pub async fn create_automation(
    RequireAdmin(principal): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateAutomationRule>,
) -> AppResult<impl IntoResponse> {
    validate_rule_name(&body.name)?;
    validate_rule_fields(
        Some(&body.trigger_type),
        Some(&body.trigger_conditions),
        Some(&body.action_type),
        Some(&body.action_config),
    )?;

    let input = CreateAutomationRule {
        created_by: Some(principal.id),
        ..body
    };

    let rule = AutomationRuleRepo::create(&state.pool, &input).await?;

    tracing::info!(
        rule_id = rule.id,
        trigger_type = %rule.trigger_type,
        action_type = %rule.action_type,
        principal_id = principal.id,
        "Automation rule created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: rule })))
}

// ---------------------------------------------------------------------------
// GET /automations
// ---------------------------------------------------------------------------

/// List rules annotated with execution aggregates.
pub async fn list_automations(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let rules = AutomationRuleRepo::list_with_stats(&state.pool, params.limit, params.offset).await?;
    Ok(Json(DataResponse { data: rules }))
}

// ---------------------------------------------------------------------------
// GET /automations/{id}
// ---------------------------------------------------------------------------

/// Get a single rule by ID.
pub async fn get_automation(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let rule = ensure_rule_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: rule }))
}

// ---------------------------------------------------------------------------
// PUT /automations/{id}
// ---------------------------------------------------------------------------

/// Update an existing rule.
pub async fn update_automation(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateAutomationRule>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref name) = body.name {
        validate_rule_name(name)?;
    }
    validate_rule_fields(
        body.trigger_type.as_deref(),
        body.trigger_conditions.as_ref(),
        body.action_type.as_deref(),
        body.action_config.as_ref(),
    )?;

    let updated = AutomationRuleRepo::update(&state.pool, id, &body)
        .await?
        .ok_or(CoreError::NotFound { entity: "Rule", id })?;

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// PATCH /automations/{id}/toggle
// ---------------------------------------------------------------------------

/// Soft-disable or re-enable a rule. Disabled rules are never evaluated.
pub async fn toggle_automation(
    RequireAdmin(principal): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<ToggleRequest>,
) -> AppResult<impl IntoResponse> {
    let found = AutomationRuleRepo::toggle_active(&state.pool, id, body.is_active).await?;
    if !found {
        return Err(CoreError::NotFound { entity: "Rule", id }.into());
    }

    tracing::info!(
        rule_id = id,
        is_active = body.is_active,
        principal_id = principal.id,
        "Automation rule toggled"
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /automations/{id}/executions
// ---------------------------------------------------------------------------

/// List the execution log for one rule, newest first.
pub async fn list_executions(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    ensure_rule_exists(&state.pool, id).await?;

    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);
    let entries = ExecutionLogRepo::list_for_rule(&state.pool, id, limit, offset).await?;

    Ok(Json(DataResponse { data: entries }))
}

// ---------------------------------------------------------------------------
// POST /automations/trigger
// ---------------------------------------------------------------------------

/// Fire one named rule for one customer.
///
/// The rule must be active, and its trigger conditions are still evaluated
/// against `trigger_data` -- a non-matching call reports `matched: false`
/// without firing. A firing always produces exactly one execution-log row;
/// an unregistered action type surfaces as an UnsupportedAction error after
/// the failed firing is logged.
pub async fn trigger_automation(
    principal: Principal,
    State(state): State<AppState>,
    Json(body): Json<TriggerRuleRequest>,
) -> AppResult<impl IntoResponse> {
    let rule = ensure_rule_exists(&state.pool, body.rule_id).await?;
    if !rule.is_active {
        return Err(CoreError::Conflict(format!("Rule {} is disabled", rule.id)).into());
    }

    if !conditions_match(&rule.trigger_conditions, &body.trigger_data) {
        return Ok(Json(DataResponse {
            data: serde_json::json!({
                "matched": false,
                "execution_id": null,
                "result": null,
            }),
        }));
    }

    let ctx = ActionContext {
        pool: state.pool.clone(),
        messenger: state.messenger.clone(),
    };
    let executor = ActionExecutor::new(state.registry.clone());
    let fire = executor
        .execute_rule(&ctx, &rule, body.customer_id, &body.trigger_data)
        .await?;

    tracing::info!(
        rule_id = rule.id,
        execution_id = fire.execution_id,
        customer_id = body.customer_id,
        principal_id = principal.id,
        success = fire.outcome.success,
        "Rule fired directly"
    );

    // The failed firing is already logged; an unregistered action type is
    // still surfaced to the caller as a structured engine error.
    if let Some(err @ CoreError::UnsupportedAction(_)) = fire.engine_error {
        return Err(err.into());
    }

    Ok(Json(DataResponse {
        data: serde_json::json!({
            "matched": true,
            "execution_id": fire.execution_id,
            "result": fire.outcome,
        }),
    }))
}
