//! Route tree for the `/api/v1` prefix.

pub mod automation;
pub mod campaign;
pub mod health;
pub mod notification;
pub mod segment;
pub mod trigger;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /automations                      list, create (admin only)
/// /automations/{id}                 get, update
/// /automations/{id}/toggle          soft-disable / enable (PATCH)
/// /automations/{id}/executions      execution log for one rule
/// /automations/trigger              fire one rule directly (POST)
///
/// /triggers                         trigger-event ingestion (POST)
///
/// /segments                         list, create (admin only)
/// /segments/test                    dry-run criteria count (POST)
/// /segments/{id}                    get, update
/// /segments/{id}/refresh-count      recompute cached count (POST)
///
/// /campaigns                        list, create (admin only)
/// /campaigns/{id}                   get
/// /campaigns/{id}/send              send to live segment membership (POST)
///
/// /notifications                    caller's notifications
/// /notifications/{id}/read          mark read (POST)
/// /notifications/unread-count       unread badge count
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/automations", automation::router())
        .nest("/triggers", trigger::router())
        .nest("/segments", segment::router())
        .nest("/campaigns", campaign::router())
        .nest("/notifications", notification::router())
}
