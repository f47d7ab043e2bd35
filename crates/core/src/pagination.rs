//! Pagination defaults and clamping helpers shared by list endpoints.

/// Default number of rows returned by list endpoints.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Maximum number of rows a caller may request per page.
pub const MAX_LIST_LIMIT: i64 = 200;

/// Clamp an optional limit to `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    match limit {
        Some(l) if l >= 1 => l.min(max),
        _ => default,
    }
}

/// Clamp an optional offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_uses_default_when_none() {
        assert_eq!(clamp_limit(None, 50, 200), 50);
    }

    #[test]
    fn clamp_limit_caps_at_max() {
        assert_eq!(clamp_limit(Some(9999), 50, 200), 200);
    }

    #[test]
    fn clamp_limit_rejects_non_positive() {
        assert_eq!(clamp_limit(Some(0), 50, 200), 50);
        assert_eq!(clamp_limit(Some(-3), 50, 200), 50);
    }

    #[test]
    fn clamp_limit_passes_through_valid_values() {
        assert_eq!(clamp_limit(Some(25), 50, 200), 25);
    }

    #[test]
    fn clamp_offset_floors_at_zero() {
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(-10)), 0);
        assert_eq!(clamp_offset(Some(40)), 40);
    }
}
