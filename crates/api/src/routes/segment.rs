//! Route definitions for customer segments.
//!
//! ```text
//! POST   /                    create_segment
//! GET    /                    list_segments (?include_inactive, limit, offset)
//! POST   /test                test_segment (dry run)
//! GET    /{id}                get_segment
//! PUT    /{id}                update_segment
//! POST   /{id}/refresh-count  refresh_count
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::segment;
use crate::state::AppState;

/// Segment routes -- mounted at `/segments`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(segment::create_segment).get(segment::list_segments))
        .route("/test", post(segment::test_segment))
        .route(
            "/{id}",
            get(segment::get_segment).put(segment::update_segment),
        )
        .route("/{id}/refresh-count", post(segment::refresh_count))
}
