//! Route definitions for marketing campaigns.
//!
//! ```text
//! POST   /            create_campaign
//! GET    /            list_campaigns
//! GET    /{id}        get_campaign
//! POST   /{id}/send   send_campaign
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::campaign;
use crate::state::AppState;

/// Campaign routes -- mounted at `/campaigns`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(campaign::create_campaign).get(campaign::list_campaigns),
        )
        .route("/{id}", get(campaign::get_campaign))
        .route("/{id}/send", post(campaign::send_campaign))
}
