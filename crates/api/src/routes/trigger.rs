//! Route definitions for trigger-event ingestion.
//!
//! ```text
//! POST /    ingest_trigger
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::trigger;
use crate::state::AppState;

/// Trigger ingestion routes -- mounted at `/triggers`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(trigger::ingest_trigger))
}
