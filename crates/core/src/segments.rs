//! Segment criteria constants and validation.
//!
//! The recognized criteria key set is closed: the compiler in the DB layer
//! has one handler per key, and anything outside the set is rejected here
//! before persistence so admins are never silently targeting fewer customers
//! than they asked for.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a segment name.
pub const MAX_SEGMENT_NAME_LENGTH: usize = 200;

/// Maximum length of a segment description.
pub const MAX_SEGMENT_DESCRIPTION_LENGTH: usize = 2000;

/// Minimum customer age in years.
pub const CRITERIA_MIN_AGE: &str = "min_age";

/// Maximum customer age in years.
pub const CRITERIA_MAX_AGE: &str = "max_age";

/// Minimum lifetime spend.
pub const CRITERIA_MIN_TOTAL_SPENT: &str = "min_total_spent";

/// Exact loyalty tier.
pub const CRITERIA_LOYALTY_TIER: &str = "loyalty_tier";

/// Last purchase within the given number of days.
pub const CRITERIA_LAST_PURCHASE_WITHIN_DAYS: &str = "last_purchase_within_days";

/// The full closed set of recognized criteria keys.
pub const RECOGNIZED_CRITERIA_KEYS: &[&str] = &[
    CRITERIA_MIN_AGE,
    CRITERIA_MAX_AGE,
    CRITERIA_MIN_TOTAL_SPENT,
    CRITERIA_LOYALTY_TIER,
    CRITERIA_LAST_PURCHASE_WITHIN_DAYS,
];

/// Check whether a criteria key is recognized.
pub fn is_recognized_criteria_key(key: &str) -> bool {
    RECOGNIZED_CRITERIA_KEYS.contains(&key)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a segment name: must be non-empty and within length limit.
pub fn validate_segment_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Segment name must not be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_SEGMENT_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Segment name exceeds maximum length of {MAX_SEGMENT_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a criteria document: a flat JSON object whose keys all come from
/// the recognized set and whose values are non-negative numbers.
///
/// Unrecognized keys are rejected rather than silently ignored. An empty
/// object is valid and selects every customer.
pub fn validate_criteria(criteria: &serde_json::Value) -> Result<(), CoreError> {
    let obj = criteria
        .as_object()
        .ok_or_else(|| CoreError::Validation("criteria must be a JSON object".to_string()))?;

    for (key, value) in obj {
        if !is_recognized_criteria_key(key) {
            return Err(CoreError::Validation(format!(
                "Unrecognized criteria key: '{key}'. Must be one of: {}",
                RECOGNIZED_CRITERIA_KEYS.join(", ")
            )));
        }
        let Some(n) = value.as_f64() else {
            return Err(CoreError::Validation(format!(
                "Criteria key '{key}' requires a numeric value"
            )));
        };
        if n < 0.0 {
            return Err(CoreError::Validation(format!(
                "Criteria key '{key}' must be non-negative, got {n}"
            )));
        }
    }

    // Cross-key sanity: an inverted age range can never match anyone.
    if let (Some(min), Some(max)) = (
        obj.get(CRITERIA_MIN_AGE).and_then(|v| v.as_f64()),
        obj.get(CRITERIA_MAX_AGE).and_then(|v| v.as_f64()),
    ) {
        if min > max {
            return Err(CoreError::Validation(format!(
                "min_age ({min}) must not exceed max_age ({max})"
            )));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
