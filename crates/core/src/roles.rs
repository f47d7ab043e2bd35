//! Well-known role name constants.
//!
//! These must match the role claims issued by the external identity provider.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SERVICE: &str = "service";
