//! Handler for trigger-event ingestion.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::engine::dispatcher::{TriggerDispatcher, TriggerEvent};
use crate::engine::executor::ActionContext;
use crate::error::AppResult;
use crate::middleware::auth::Principal;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/triggers
///
/// Ingest one business event and run every matching active rule. The caller
/// always receives a structured per-rule outcome list; a single rule's
/// failure never aborts the rest.
pub async fn ingest_trigger(
    principal: Principal,
    State(state): State<AppState>,
    Json(event): Json<TriggerEvent>,
) -> AppResult<impl IntoResponse> {
    let ctx = ActionContext {
        pool: state.pool.clone(),
        messenger: state.messenger.clone(),
    };
    let dispatcher = TriggerDispatcher::new(ctx, state.registry.clone());

    let outcomes = dispatcher.dispatch(&event).await?;

    tracing::info!(
        event_type = %event.event_type,
        customer_id = event.customer_id,
        principal_id = principal.id,
        fired = outcomes.len(),
        "Trigger event processed"
    );

    Ok(Json(DataResponse { data: outcomes }))
}
