//! Coupon code minting and validity-window rules.

use rand::Rng;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of random characters in a generated coupon code.
pub const COUPON_CODE_LENGTH: usize = 12;

/// Characters used in coupon codes. Excludes 0/O and 1/I to keep codes
/// readable over the phone.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Default validity window when the action config does not set one.
pub const DEFAULT_COUPON_VALIDITY_DAYS: i64 = 14;

/// Upper bound on a configured validity window.
pub const MAX_COUPON_VALIDITY_DAYS: i64 = 365;

// ---------------------------------------------------------------------------
// Code generation
// ---------------------------------------------------------------------------

/// Mint a fresh coupon code, unique per invocation.
///
/// Codes are 12 random characters from a 32-character alphabet; the
/// `uq_coupons_code` constraint backstops the astronomically unlikely
/// collision.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..COUPON_CODE_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Validity window
// ---------------------------------------------------------------------------

/// Validate a configured validity window in days.
pub fn validate_validity_days(days: i64) -> Result<(), CoreError> {
    if days < 1 {
        return Err(CoreError::Validation(format!(
            "Coupon validity_days must be at least 1, got {days}"
        )));
    }
    if days > MAX_COUPON_VALIDITY_DAYS {
        return Err(CoreError::Validation(format!(
            "Coupon validity_days exceeds maximum of {MAX_COUPON_VALIDITY_DAYS}, got {days}"
        )));
    }
    Ok(())
}

/// Compute the expiry instant for a coupon issued at `issued_at`.
///
/// The result is strictly later than issuance for any valid window.
pub fn expiry_at(issued_at: Timestamp, validity_days: i64) -> Timestamp {
    issued_at + chrono::Duration::days(validity_days)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_codes_have_expected_shape() {
        let code = generate_code();
        assert_eq!(code.len(), COUPON_CODE_LENGTH);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn generated_codes_are_unique_per_invocation() {
        let codes: HashSet<String> = (0..200).map(|_| generate_code()).collect();
        assert_eq!(codes.len(), 200);
    }

    #[test]
    fn validity_days_bounds() {
        assert!(validate_validity_days(1).is_ok());
        assert!(validate_validity_days(MAX_COUPON_VALIDITY_DAYS).is_ok());
        assert!(validate_validity_days(0).is_err());
        assert!(validate_validity_days(-7).is_err());
        assert!(validate_validity_days(MAX_COUPON_VALIDITY_DAYS + 1).is_err());
    }

    #[test]
    fn expiry_is_strictly_after_issuance() {
        let now = chrono::Utc::now();
        assert!(expiry_at(now, 1) > now);
        assert!(expiry_at(now, DEFAULT_COUPON_VALIDITY_DAYS) > now);
    }
}
