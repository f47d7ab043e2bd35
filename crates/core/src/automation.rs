//! Automation rule domain types, validation, and trigger-condition matching.
//!
//! Provides the closed trigger/action enums, rule input validation, and the
//! flat condition-matching logic the dispatcher evaluates against incoming
//! trigger payloads.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of an automation rule name.
pub const MAX_RULE_NAME_LENGTH: usize = 200;

/// Comparator operators accepted inside a trigger-condition value.
pub const CONDITION_OPERATORS: &[&str] = &["eq", "ne", "gt", "gte", "lt", "lte"];

// ---------------------------------------------------------------------------
// TriggerType
// ---------------------------------------------------------------------------

/// The business event kind a rule listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    UserRegistered,
    PurchaseCompleted,
    CartAbandoned,
    ProductReviewed,
    Birthday,
}

impl TriggerType {
    /// Return the wire-format string for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRegistered => "user_registered",
            Self::PurchaseCompleted => "purchase_completed",
            Self::CartAbandoned => "cart_abandoned",
            Self::ProductReviewed => "product_reviewed",
            Self::Birthday => "birthday",
        }
    }

    /// Parse from a wire-format string.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "user_registered" => Ok(Self::UserRegistered),
            "purchase_completed" => Ok(Self::PurchaseCompleted),
            "cart_abandoned" => Ok(Self::CartAbandoned),
            "product_reviewed" => Ok(Self::ProductReviewed),
            "birthday" => Ok(Self::Birthday),
            _ => Err(CoreError::Validation(format!(
                "Invalid trigger_type: '{s}'. Must be one of: user_registered, \
                 purchase_completed, cart_abandoned, product_reviewed, birthday"
            ))),
        }
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActionType
// ---------------------------------------------------------------------------

/// The configured operation a rule runs against a matched customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    SendMessage,
    AddToSegment,
    ApplyDiscount,
    SendNotification,
    AdjustLoyaltyPoints,
    GeneratePersonalizedOffer,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendMessage => "send_message",
            Self::AddToSegment => "add_to_segment",
            Self::ApplyDiscount => "apply_discount",
            Self::SendNotification => "send_notification",
            Self::AdjustLoyaltyPoints => "adjust_loyalty_points",
            Self::GeneratePersonalizedOffer => "generate_personalized_offer",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "send_message" => Ok(Self::SendMessage),
            "add_to_segment" => Ok(Self::AddToSegment),
            "apply_discount" => Ok(Self::ApplyDiscount),
            "send_notification" => Ok(Self::SendNotification),
            "adjust_loyalty_points" => Ok(Self::AdjustLoyaltyPoints),
            "generate_personalized_offer" => Ok(Self::GeneratePersonalizedOffer),
            _ => Err(CoreError::Validation(format!(
                "Invalid action_type: '{s}'. Must be one of: send_message, add_to_segment, \
                 apply_discount, send_notification, adjust_loyalty_points, \
                 generate_personalized_offer"
            ))),
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ExecutionStatus
// ---------------------------------------------------------------------------

/// Outcome status recorded on an execution-log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            _ => Err(CoreError::Validation(format!(
                "Invalid execution status: '{s}'. Must be one of: success, failed"
            ))),
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActionOutcome
// ---------------------------------------------------------------------------

/// The structured result of running one action handler against one customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub details: serde_json::Value,
    pub error_message: Option<String>,
}

impl ActionOutcome {
    /// A successful outcome carrying handler-specific detail.
    pub fn ok(details: serde_json::Value) -> Self {
        Self {
            success: true,
            details,
            error_message: None,
        }
    }

    /// A failed outcome carrying the error message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            details: serde_json::Value::Object(Default::default()),
            error_message: Some(message.into()),
        }
    }

    pub fn status(&self) -> ExecutionStatus {
        if self.success {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a rule name: must be non-empty and within length limit.
pub fn validate_rule_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Rule name must not be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_RULE_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Rule name exceeds maximum length of {MAX_RULE_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate the shape of a trigger-conditions document.
///
/// Conditions are a flat map of `field -> expected`. `expected` is either a
/// scalar (matched by equality) or an object with exactly one comparator key
/// (`eq`, `ne`, `gt`, `gte`, `lt`, `lte`) and a scalar operand. Ordering
/// comparators require a numeric operand. Nested maps, arrays, and
/// multi-operator objects are rejected.
pub fn validate_trigger_conditions(conditions: &serde_json::Value) -> Result<(), CoreError> {
    let obj = conditions.as_object().ok_or_else(|| {
        CoreError::Validation("trigger_conditions must be a JSON object".to_string())
    })?;

    for (field, expected) in obj {
        match expected {
            serde_json::Value::Null | serde_json::Value::Array(_) => {
                return Err(CoreError::Validation(format!(
                    "Condition '{field}' must be a scalar or a single-operator comparison object"
                )));
            }
            serde_json::Value::Object(cmp) => {
                if cmp.len() != 1 {
                    return Err(CoreError::Validation(format!(
                        "Condition '{field}' must contain exactly one comparator, got {}",
                        cmp.len()
                    )));
                }
                let Some((op, operand)) = cmp.iter().next() else {
                    continue;
                };
                if !CONDITION_OPERATORS.contains(&op.as_str()) {
                    return Err(CoreError::Validation(format!(
                        "Condition '{field}' uses unknown comparator '{op}'. \
                         Must be one of: eq, ne, gt, gte, lt, lte"
                    )));
                }
                let needs_number = matches!(op.as_str(), "gt" | "gte" | "lt" | "lte");
                if needs_number && !operand.is_number() {
                    return Err(CoreError::Validation(format!(
                        "Condition '{field}' comparator '{op}' requires a numeric operand"
                    )));
                }
                if operand.is_object() || operand.is_array() || operand.is_null() {
                    return Err(CoreError::Validation(format!(
                        "Condition '{field}' comparator '{op}' requires a scalar operand"
                    )));
                }
            }
            // Bare scalar: equality match.
            _ => {}
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Condition matching
// ---------------------------------------------------------------------------

/// Evaluate trigger conditions as a conjunction of flat field comparisons
/// against an event payload.
///
/// - An empty conditions object matches every payload.
/// - A missing payload field never matches.
/// - Numbers are compared numerically (`5` matches `5.0`).
/// - Ordering comparators on non-numeric values never match.
///
/// The conditions document is assumed to have passed
/// [`validate_trigger_conditions`] at rule-creation time; malformed
/// conditions encountered here simply fail to match rather than erroring,
/// so one bad rule cannot poison dispatch of its siblings.
pub fn conditions_match(conditions: &serde_json::Value, payload: &serde_json::Value) -> bool {
    let Some(conds) = conditions.as_object() else {
        return false;
    };
    if conds.is_empty() {
        return true;
    }
    let Some(fields) = payload.as_object() else {
        return false;
    };

    conds.iter().all(|(field, expected)| {
        let Some(actual) = fields.get(field) else {
            return false;
        };
        match expected {
            serde_json::Value::Object(cmp) => match cmp.iter().next() {
                Some((op, operand)) if cmp.len() == 1 => compare(op, actual, operand),
                _ => false,
            },
            scalar => values_equal(actual, scalar),
        }
    })
}

/// Apply a single comparator to an actual payload value and an operand.
fn compare(op: &str, actual: &serde_json::Value, operand: &serde_json::Value) -> bool {
    match op {
        "eq" => values_equal(actual, operand),
        "ne" => !values_equal(actual, operand),
        "gt" | "gte" | "lt" | "lte" => {
            let (Some(a), Some(b)) = (actual.as_f64(), operand.as_f64()) else {
                return false;
            };
            match op {
                "gt" => a > b,
                "gte" => a >= b,
                "lt" => a < b,
                _ => a <= b,
            }
        }
        _ => false,
    }
}

/// Equality with numeric coercion: `5` equals `5.0`.
fn values_equal(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- TriggerType parsing ------------------------------------------------

    #[test]
    fn trigger_type_all_variants_roundtrip() {
        let pairs = [
            ("user_registered", TriggerType::UserRegistered),
            ("purchase_completed", TriggerType::PurchaseCompleted),
            ("cart_abandoned", TriggerType::CartAbandoned),
            ("product_reviewed", TriggerType::ProductReviewed),
            ("birthday", TriggerType::Birthday),
        ];
        for (s, variant) in &pairs {
            assert_eq!(&TriggerType::from_str(s).unwrap(), variant);
            assert_eq!(variant.as_str(), *s);
        }
    }

    #[test]
    fn trigger_type_invalid_rejects() {
        assert!(TriggerType::from_str("page_viewed").is_err());
    }

    // -- ActionType parsing -------------------------------------------------

    #[test]
    fn action_type_all_variants_roundtrip() {
        let pairs = [
            ("send_message", ActionType::SendMessage),
            ("add_to_segment", ActionType::AddToSegment),
            ("apply_discount", ActionType::ApplyDiscount),
            ("send_notification", ActionType::SendNotification),
            ("adjust_loyalty_points", ActionType::AdjustLoyaltyPoints),
            (
                "generate_personalized_offer",
                ActionType::GeneratePersonalizedOffer,
            ),
        ];
        for (s, variant) in &pairs {
            assert_eq!(&ActionType::from_str(s).unwrap(), variant);
            assert_eq!(variant.as_str(), *s);
        }
    }

    #[test]
    fn action_type_invalid_rejects() {
        assert!(ActionType::from_str("teleport_user").is_err());
    }

    // -- ExecutionStatus ----------------------------------------------------

    #[test]
    fn execution_status_roundtrip() {
        assert_eq!(
            ExecutionStatus::from_str("success").unwrap(),
            ExecutionStatus::Success
        );
        assert_eq!(
            ExecutionStatus::from_str("failed").unwrap(),
            ExecutionStatus::Failed
        );
        assert!(ExecutionStatus::from_str("pending").is_err());
    }

    #[test]
    fn outcome_status_mapping() {
        assert_eq!(
            ActionOutcome::ok(json!({})).status(),
            ExecutionStatus::Success
        );
        assert_eq!(
            ActionOutcome::failed("boom").status(),
            ExecutionStatus::Failed
        );
    }

    // -- validate_rule_name -------------------------------------------------

    #[test]
    fn valid_rule_name() {
        assert!(validate_rule_name("welcome-series").is_ok());
    }

    #[test]
    fn empty_rule_name_rejects() {
        assert!(validate_rule_name("").is_err());
        assert!(validate_rule_name("   ").is_err());
    }

    #[test]
    fn too_long_rule_name_rejects() {
        let long = "a".repeat(MAX_RULE_NAME_LENGTH + 1);
        assert!(validate_rule_name(&long).is_err());
    }

    // -- validate_trigger_conditions ----------------------------------------

    #[test]
    fn scalar_conditions_valid() {
        let conds = json!({ "category": "shoes", "total": 100 });
        assert!(validate_trigger_conditions(&conds).is_ok());
    }

    #[test]
    fn comparator_conditions_valid() {
        let conds = json!({ "total": { "gte": 50 }, "items": { "lt": 10 } });
        assert!(validate_trigger_conditions(&conds).is_ok());
    }

    #[test]
    fn empty_conditions_valid() {
        assert!(validate_trigger_conditions(&json!({})).is_ok());
    }

    #[test]
    fn non_object_conditions_reject() {
        assert!(validate_trigger_conditions(&json!("total > 5")).is_err());
        assert!(validate_trigger_conditions(&json!([1, 2])).is_err());
    }

    #[test]
    fn unknown_comparator_rejects() {
        let conds = json!({ "total": { "between": [1, 2] } });
        assert!(validate_trigger_conditions(&conds).is_err());
    }

    #[test]
    fn multi_operator_object_rejects() {
        let conds = json!({ "total": { "gte": 1, "lte": 9 } });
        assert!(validate_trigger_conditions(&conds).is_err());
    }

    #[test]
    fn ordering_comparator_requires_number() {
        let conds = json!({ "total": { "gte": "fifty" } });
        assert!(validate_trigger_conditions(&conds).is_err());
    }

    #[test]
    fn null_and_array_values_reject() {
        assert!(validate_trigger_conditions(&json!({ "f": null })).is_err());
        assert!(validate_trigger_conditions(&json!({ "f": [1] })).is_err());
    }

    // -- conditions_match ---------------------------------------------------

    #[test]
    fn empty_conditions_match_anything() {
        assert!(conditions_match(&json!({}), &json!({ "total": 5 })));
        assert!(conditions_match(&json!({}), &json!(null)));
    }

    #[test]
    fn scalar_equality_matches() {
        let conds = json!({ "category": "shoes" });
        assert!(conditions_match(&conds, &json!({ "category": "shoes" })));
        assert!(!conditions_match(&conds, &json!({ "category": "hats" })));
    }

    #[test]
    fn numeric_equality_coerces() {
        let conds = json!({ "total": 100 });
        assert!(conditions_match(&conds, &json!({ "total": 100.0 })));
    }

    #[test]
    fn missing_field_never_matches() {
        let conds = json!({ "total": { "gte": 1 } });
        assert!(!conditions_match(&conds, &json!({ "other": 5 })));
    }

    #[test]
    fn conjunction_requires_all_fields() {
        let conds = json!({ "total": { "gte": 50 }, "category": "shoes" });
        assert!(conditions_match(
            &conds,
            &json!({ "total": 80, "category": "shoes" })
        ));
        assert!(!conditions_match(
            &conds,
            &json!({ "total": 80, "category": "hats" })
        ));
        assert!(!conditions_match(
            &conds,
            &json!({ "total": 10, "category": "shoes" })
        ));
    }

    #[test]
    fn threshold_comparators() {
        let payload = json!({ "total": 50 });
        assert!(conditions_match(&json!({ "total": { "gte": 50 } }), &payload));
        assert!(!conditions_match(&json!({ "total": { "gt": 50 } }), &payload));
        assert!(conditions_match(&json!({ "total": { "lte": 50 } }), &payload));
        assert!(!conditions_match(&json!({ "total": { "lt": 50 } }), &payload));
        assert!(conditions_match(&json!({ "total": { "ne": 49 } }), &payload));
        assert!(conditions_match(&json!({ "total": { "eq": 50 } }), &payload));
    }

    #[test]
    fn ordering_on_non_numeric_never_matches() {
        let conds = json!({ "category": { "gte": 5 } });
        assert!(!conditions_match(&conds, &json!({ "category": "shoes" })));
    }

    #[test]
    fn non_object_payload_only_matches_empty_conditions() {
        let conds = json!({ "total": 5 });
        assert!(!conditions_match(&conds, &json!(42)));
        assert!(!conditions_match(&conds, &json!(null)));
    }
}
