//! JWT access-token validation.
//!
//! Access tokens are HS256-signed JWTs issued by the external identity
//! provider; this service only validates them. The engine itself never
//! issues tokens and carries no identity constants -- the authenticated
//! principal comes entirely from the token claims.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use meridian_core::types::DbId;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the principal's internal database id.
    pub sub: DbId,
    /// The principal's role name (e.g. `"admin"`, `"service"`).
    pub role: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier for revocation / audit.
    pub jti: String,
}

/// Configuration for JWT token validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the identity provider.
    pub secret: String,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");
        Self { secret }
    }
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Validates the signature, expiration, and issued-at claims automatically.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
        }
    }

    fn make_token(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(exp_offset_secs: i64) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            sub: 42,
            role: "admin".to_string(),
            exp: now + exp_offset_secs,
            iat: now,
            jti: "token-1".to_string(),
        }
    }

    #[test]
    fn valid_token_roundtrips_claims() {
        let token = make_token(&claims(3600), "test-secret");
        let decoded = validate_token(&token, &config()).unwrap();
        assert_eq!(decoded.sub, 42);
        assert_eq!(decoded.role, "admin");
    }

    #[test]
    fn expired_token_rejects() {
        let token = make_token(&claims(-3600), "test-secret");
        assert!(validate_token(&token, &config()).is_err());
    }

    #[test]
    fn wrong_secret_rejects() {
        let token = make_token(&claims(3600), "other-secret");
        assert!(validate_token(&token, &config()).is_err());
    }

    #[test]
    fn garbage_token_rejects() {
        assert!(validate_token("not-a-jwt", &config()).is_err());
    }
}
