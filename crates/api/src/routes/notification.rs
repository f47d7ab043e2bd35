//! Route definitions for in-app notifications.
//!
//! ```text
//! GET    /               list_notifications (?unread_only, limit, offset)
//! GET    /unread-count   unread_count
//! POST   /{id}/read      mark_read
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Notification routes -- mounted at `/notifications`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification::list_notifications))
        .route("/unread-count", get(notification::unread_count))
        .route("/{id}/read", post(notification::mark_read))
}
