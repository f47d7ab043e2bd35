//! Handlers for the `/segments` resource.
//!
//! Segment criteria are compiled to bound-parameter queries; unrecognized
//! criteria keys are rejected before anything is persisted, and counts are
//! always computed live.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use meridian_core::error::CoreError;
use meridian_core::segments::validate_segment_name;
use meridian_core::types::DbId;
use meridian_db::criteria::CompiledCriteria;
use meridian_db::models::segment::{CreateSegment, CustomerSegment, UpdateSegment};
use meridian_db::repositories::SegmentRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /segments`.
#[derive(Debug, Deserialize)]
pub struct SegmentListQuery {
    #[serde(default)]
    pub include_inactive: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /segments/test` (dry run, no persistence).
#[derive(Debug, Deserialize)]
pub struct TestSegmentRequest {
    pub criteria: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a segment exists, returning the full row.
async fn ensure_segment_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<CustomerSegment> {
    SegmentRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Segment", id }))
}

// ---------------------------------------------------------------------------
// POST /segments
// ---------------------------------------------------------------------------

/// Create a segment. The criteria document is compiled and counted up front
/// so the admin immediately sees how many customers it targets.
pub async fn create_segment(
    RequireAdmin(principal): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateSegment>,
) -> AppResult<impl IntoResponse> {
    validate_segment_name(&body.name)?;
    let compiled = CompiledCriteria::compile(&body.criteria)?;
    let customer_count = compiled.count(&state.pool).await?;

    let input = CreateSegment {
        created_by: Some(principal.id),
        ..body
    };
    let segment = SegmentRepo::create(&state.pool, &input, customer_count).await?;

    tracing::info!(
        segment_id = segment.id,
        customer_count,
        principal_id = principal.id,
        "Segment created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: serde_json::json!({
                "segment": segment,
                "customer_count": customer_count,
            }),
        }),
    ))
}

// ---------------------------------------------------------------------------
// POST /segments/test
// ---------------------------------------------------------------------------

/// Dry-run a criteria document: compile, count, persist nothing.
pub async fn test_segment(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<TestSegmentRequest>,
) -> AppResult<impl IntoResponse> {
    let compiled = CompiledCriteria::compile(&body.criteria)?;
    let customer_count = compiled.count(&state.pool).await?;

    Ok(Json(DataResponse {
        data: serde_json::json!({ "customer_count": customer_count }),
    }))
}

// ---------------------------------------------------------------------------
// GET /segments
// ---------------------------------------------------------------------------

/// List segments.
pub async fn list_segments(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<SegmentListQuery>,
) -> AppResult<impl IntoResponse> {
    let segments = SegmentRepo::list(
        &state.pool,
        params.include_inactive,
        params.limit,
        params.offset,
    )
    .await?;
    Ok(Json(DataResponse { data: segments }))
}

// ---------------------------------------------------------------------------
// GET /segments/{id}
// ---------------------------------------------------------------------------

/// Get a single segment by ID.
pub async fn get_segment(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let segment = ensure_segment_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: segment }))
}

// ---------------------------------------------------------------------------
// PUT /segments/{id}
// ---------------------------------------------------------------------------

/// Update a segment. Changing the criteria re-validates it and refreshes
/// the cached count.
pub async fn update_segment(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateSegment>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref name) = body.name {
        validate_segment_name(name)?;
    }
    let recount = match body.criteria {
        Some(ref criteria) => {
            let compiled = CompiledCriteria::compile(criteria)?;
            Some(compiled.count(&state.pool).await?)
        }
        None => None,
    };

    let mut updated = SegmentRepo::update(&state.pool, id, &body)
        .await?
        .ok_or(CoreError::NotFound { entity: "Segment", id })?;

    if let Some(count) = recount {
        SegmentRepo::set_cached_count(&state.pool, id, count).await?;
        updated.cached_member_count = count;
    }

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// POST /segments/{id}/refresh-count
// ---------------------------------------------------------------------------

/// Recompute and store the cached member count. The cache is advisory and
/// allowed to lag; sends never read it.
pub async fn refresh_count(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let segment = ensure_segment_exists(&state.pool, id).await?;
    let compiled = CompiledCriteria::compile(&segment.criteria)?;
    let customer_count = compiled.count(&state.pool).await?;
    SegmentRepo::set_cached_count(&state.pool, id, customer_count).await?;

    Ok(Json(DataResponse {
        data: serde_json::json!({
            "segment_id": id,
            "customer_count": customer_count,
        }),
    }))
}
