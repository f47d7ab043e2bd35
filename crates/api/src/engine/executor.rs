//! Action executor.
//!
//! [`ActionRegistry`] maps each [`ActionType`] to a typed handler; an action
//! tag with no registration fails closed with `UnsupportedAction`.
//! [`ActionExecutor::execute_rule`] is the single path through which a rule
//! ever runs: it resolves the handler, catches any handler fault, converts
//! it into a failed [`ActionOutcome`], and appends exactly one execution-log
//! row -- success or failure, every firing is logged.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use meridian_core::automation::{ActionOutcome, ActionType};
use meridian_core::error::CoreError;
use meridian_core::types::DbId;
use meridian_db::models::automation_execution::CreateExecution;
use meridian_db::models::automation_rule::AutomationRule;
use meridian_db::repositories::ExecutionLogRepo;
use meridian_messaging::Messenger;

use super::actions;

// ---------------------------------------------------------------------------
// ActionContext
// ---------------------------------------------------------------------------

/// Collaborators a handler may use while executing.
#[derive(Clone)]
pub struct ActionContext {
    /// Database connection pool.
    pub pool: meridian_db::DbPool,
    /// Outbound messaging collaborator.
    pub messenger: Arc<dyn Messenger>,
}

// ---------------------------------------------------------------------------
// ActionHandler
// ---------------------------------------------------------------------------

/// A typed handler for one action type.
///
/// Handlers return `Err` for any fault (validation, missing entity, store or
/// delivery failure); the executor converts it into a failed outcome. They
/// never abort the dispatcher's loop over the remaining rules.
#[async_trait]
pub trait ActionHandler: std::fmt::Debug + Send + Sync {
    async fn execute(
        &self,
        ctx: &ActionContext,
        customer_id: DbId,
        config: &serde_json::Value,
    ) -> Result<ActionOutcome, CoreError>;
}

// ---------------------------------------------------------------------------
// ActionRegistry
// ---------------------------------------------------------------------------

/// Registry of action handlers keyed by [`ActionType`].
pub struct ActionRegistry {
    handlers: HashMap<ActionType, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    /// An empty registry. Useful in tests; production code wants
    /// [`ActionRegistry::with_default_handlers`].
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The full production registry with all six built-in handlers.
    pub fn with_default_handlers() -> Self {
        let mut registry = Self::new();
        registry.register(ActionType::SendMessage, Arc::new(actions::SendMessageHandler));
        registry.register(ActionType::AddToSegment, Arc::new(actions::AddToSegmentHandler));
        registry.register(ActionType::ApplyDiscount, Arc::new(actions::ApplyDiscountHandler));
        registry.register(
            ActionType::SendNotification,
            Arc::new(actions::SendNotificationHandler),
        );
        registry.register(
            ActionType::AdjustLoyaltyPoints,
            Arc::new(actions::AdjustLoyaltyPointsHandler),
        );
        registry.register(
            ActionType::GeneratePersonalizedOffer,
            Arc::new(actions::GeneratePersonalizedOfferHandler),
        );
        registry
    }

    /// Register (or replace) the handler for an action type.
    pub fn register(&mut self, action_type: ActionType, handler: Arc<dyn ActionHandler>) {
        self.handlers.insert(action_type, handler);
    }

    /// Resolve the handler for a raw action-type tag.
    ///
    /// Fails closed: both an unknown tag and a known tag with no registered
    /// handler yield [`CoreError::UnsupportedAction`].
    pub fn resolve(&self, raw: &str) -> Result<Arc<dyn ActionHandler>, CoreError> {
        let action_type = ActionType::from_str(raw)
            .map_err(|_| CoreError::UnsupportedAction(raw.to_string()))?;
        self.handlers
            .get(&action_type)
            .cloned()
            .ok_or_else(|| CoreError::UnsupportedAction(raw.to_string()))
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// RuleFire
// ---------------------------------------------------------------------------

/// The recorded result of firing one rule against one customer.
#[derive(Debug)]
pub struct RuleFire {
    /// Id of the execution-log row written for this firing.
    pub execution_id: DbId,
    pub rule_id: DbId,
    /// The handler's structured outcome (failed outcomes carry the error).
    pub outcome: ActionOutcome,
    /// The classified engine error behind a failed outcome, when one exists.
    /// Lets the single-rule endpoint surface `UnsupportedAction` while the
    /// dispatcher keeps iterating.
    pub engine_error: Option<CoreError>,
}

// ---------------------------------------------------------------------------
// ActionExecutor
// ---------------------------------------------------------------------------

/// Runs rules through the registry and appends the audit trail.
pub struct ActionExecutor {
    registry: Arc<ActionRegistry>,
}

impl ActionExecutor {
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Self { registry }
    }

    /// Fire one rule for one customer and append exactly one execution row.
    ///
    /// Handler faults never escape: they become a failed outcome plus a
    /// failed log row. The only error this returns is a failure to write the
    /// log itself, which the caller treats as a store error.
    pub async fn execute_rule(
        &self,
        ctx: &ActionContext,
        rule: &AutomationRule,
        customer_id: DbId,
        trigger_payload: &serde_json::Value,
    ) -> Result<RuleFire, sqlx::Error> {
        let (outcome, engine_error) = match self.registry.resolve(&rule.action_type) {
            Ok(handler) => match handler.execute(ctx, customer_id, &rule.action_config).await {
                Ok(outcome) => (outcome, None),
                Err(e) => {
                    tracing::warn!(
                        rule_id = rule.id,
                        customer_id,
                        action_type = %rule.action_type,
                        error = %e,
                        "Action handler failed"
                    );
                    (ActionOutcome::failed(e.to_string()), Some(e))
                }
            },
            Err(e) => {
                tracing::warn!(
                    rule_id = rule.id,
                    action_type = %rule.action_type,
                    "Action type has no registered handler"
                );
                (ActionOutcome::failed(e.to_string()), Some(e))
            }
        };

        let execution = ExecutionLogRepo::append(
            &ctx.pool,
            &CreateExecution {
                rule_id: rule.id,
                customer_id,
                trigger_payload: trigger_payload.clone(),
                result_payload: serde_json::to_value(&outcome)
                    .unwrap_or(serde_json::Value::Null),
                status: outcome.status().as_str().to_string(),
                error_message: outcome.error_message.clone(),
            },
        )
        .await?;

        Ok(RuleFire {
            execution_id: execution.id,
            rule_id: rule.id,
            outcome,
            engine_error,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
