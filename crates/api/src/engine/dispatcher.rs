//! Trigger dispatcher.
//!
//! Receives one business event and runs every matching active rule,
//! synchronously, one at a time. Per invocation the flow is
//! `Idle -> RuleLookup -> {NoMatch -> Idle | Matched -> Execute -> Idle}`:
//! active rules for the event's trigger type are loaded in ascending id
//! order, each rule's conditions are evaluated as a conjunction of flat
//! comparisons against the payload, and matches are executed in that order
//! so dispatch is deterministic and testable. One rule's failure never
//! prevents evaluation or execution of the rules after it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use meridian_core::automation::{conditions_match, TriggerType};
use meridian_core::types::DbId;
use meridian_db::repositories::AutomationRuleRepo;

use crate::error::AppResult;

use super::executor::{ActionContext, ActionExecutor, ActionRegistry};

// ---------------------------------------------------------------------------
// TriggerEvent
// ---------------------------------------------------------------------------

/// An incoming business event capable of activating automation rules.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerEvent {
    /// Trigger type tag, e.g. `"purchase_completed"`.
    pub event_type: String,
    /// The customer the event concerns.
    pub customer_id: DbId,
    /// Event-specific fields the rule conditions are matched against.
    #[serde(default)]
    pub payload: serde_json::Value,
}

// ---------------------------------------------------------------------------
// DispatchOutcome
// ---------------------------------------------------------------------------

/// Per-rule result of one dispatch call.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub rule_id: DbId,
    /// Id of the execution-log row, when the log write succeeded.
    pub execution_id: Option<DbId>,
    pub status: String,
    pub error_message: Option<String>,
}

// ---------------------------------------------------------------------------
// TriggerDispatcher
// ---------------------------------------------------------------------------

/// Matches trigger events against active rules and executes them.
pub struct TriggerDispatcher {
    ctx: ActionContext,
    executor: ActionExecutor,
}

impl TriggerDispatcher {
    pub fn new(ctx: ActionContext, registry: Arc<ActionRegistry>) -> Self {
        Self {
            ctx,
            executor: ActionExecutor::new(registry),
        }
    }

    /// Dispatch one event: evaluate every active rule for its trigger type
    /// and return one outcome per rule that matched.
    ///
    /// Unknown event types are a validation error; everything past that
    /// point produces a structured outcome rather than a fault.
    pub async fn dispatch(&self, event: &TriggerEvent) -> AppResult<Vec<DispatchOutcome>> {
        let trigger_type = TriggerType::from_str(&event.event_type)?;

        let rules =
            AutomationRuleRepo::list_active_by_trigger(&self.ctx.pool, trigger_type.as_str())
                .await?;

        tracing::debug!(
            event_type = %trigger_type,
            customer_id = event.customer_id,
            candidate_rules = rules.len(),
            "Dispatching trigger event"
        );

        let mut outcomes = Vec::new();

        for rule in &rules {
            if !conditions_match(&rule.trigger_conditions, &event.payload) {
                continue;
            }

            match self
                .executor
                .execute_rule(&self.ctx, rule, event.customer_id, &event.payload)
                .await
            {
                Ok(fire) => {
                    tracing::info!(
                        rule_id = rule.id,
                        execution_id = fire.execution_id,
                        customer_id = event.customer_id,
                        success = fire.outcome.success,
                        "Rule fired"
                    );
                    outcomes.push(DispatchOutcome {
                        rule_id: rule.id,
                        execution_id: Some(fire.execution_id),
                        status: fire.outcome.status().as_str().to_string(),
                        error_message: fire.outcome.error_message.clone(),
                    });
                }
                Err(e) => {
                    // The action may have run but the audit write failed.
                    // Isolation still applies: record the failure in the
                    // response and keep going with the remaining rules.
                    tracing::error!(
                        rule_id = rule.id,
                        customer_id = event.customer_id,
                        error = %e,
                        "Failed to record rule execution"
                    );
                    outcomes.push(DispatchOutcome {
                        rule_id: rule.id,
                        execution_id: None,
                        status: "failed".to_string(),
                        error_message: Some(format!("execution log write failed: {e}")),
                    });
                }
            }
        }

        Ok(outcomes)
    }
}
