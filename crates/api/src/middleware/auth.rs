//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use meridian_core::error::CoreError;
use meridian_core::roles::ROLE_ADMIN;
use meridian_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated principal extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Every engine entry point receives its caller through this type; there is
/// no implicit global admin and no hard-coded identity anywhere.
///
/// ```ignore
/// async fn my_handler(principal: Principal) -> AppResult<Json<()>> {
///     tracing::info!(principal_id = principal.id, role = %principal.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Principal {
    /// The principal's internal database id (from `claims.sub`).
    pub id: DbId,
    /// The principal's role name (e.g. `"admin"`, `"service"`).
    pub role: String,
}

impl Principal {
    /// Whether this principal carries the admin capability.
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(Principal {
            id: claims.sub,
            role: claims.role,
        })
    }
}
