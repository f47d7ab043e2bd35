//! Personalized offer discount computation.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Personalized offers always expire this many days after creation.
pub const OFFER_VALIDITY_DAYS: i64 = 7;

/// Default base discount percentage when the action config does not set one.
pub const DEFAULT_BASE_DISCOUNT_PERCENT: f64 = 5.0;

/// Default per-tier bonus percentage.
pub const DEFAULT_TIER_BONUS_PERCENT: f64 = 2.5;

/// Hard cap on a computed discount.
pub const MAX_DISCOUNT_PERCENT: f64 = 90.0;

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Compute an offer discount for a customer: `base + tier * tier_bonus`,
/// capped at [`MAX_DISCOUNT_PERCENT`].
pub fn compute_discount(base_percent: f64, tier_bonus_percent: f64, tier: i32) -> f64 {
    let raw = base_percent + tier as f64 * tier_bonus_percent;
    raw.min(MAX_DISCOUNT_PERCENT)
}

/// Validate configured discount parameters.
pub fn validate_discount_params(base_percent: f64, tier_bonus_percent: f64) -> Result<(), CoreError> {
    if !(0.0..=MAX_DISCOUNT_PERCENT).contains(&base_percent) {
        return Err(CoreError::Validation(format!(
            "base_percent must be within 0..={MAX_DISCOUNT_PERCENT}, got {base_percent}"
        )));
    }
    if !(0.0..=MAX_DISCOUNT_PERCENT).contains(&tier_bonus_percent) {
        return Err(CoreError::Validation(format!(
            "tier_bonus_percent must be within 0..={MAX_DISCOUNT_PERCENT}, got {tier_bonus_percent}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
