//! Route definitions for automation rules.
//!
//! ```text
//! POST   /                create_automation
//! GET    /                list_automations (with execution aggregates)
//! POST   /trigger         trigger_automation (fire one rule)
//! GET    /{id}            get_automation
//! PUT    /{id}            update_automation
//! PATCH  /{id}/toggle     toggle_automation
//! GET    /{id}/executions list_executions (?limit, offset)
//! ```

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::automation;
use crate::state::AppState;

/// Automation rule routes -- mounted at `/automations`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(automation::create_automation).get(automation::list_automations),
        )
        .route("/trigger", post(automation::trigger_automation))
        .route(
            "/{id}",
            get(automation::get_automation).put(automation::update_automation),
        )
        .route("/{id}/toggle", patch(automation::toggle_automation))
        .route("/{id}/executions", get(automation::list_executions))
}
