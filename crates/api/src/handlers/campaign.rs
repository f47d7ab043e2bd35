//! Handlers for the `/campaigns` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use meridian_core::campaigns::{is_valid_campaign_type, validate_campaign_name, CAMPAIGN_TYPES};
use meridian_core::error::CoreError;
use meridian_core::types::DbId;
use meridian_db::models::campaign::CreateCampaign;
use meridian_db::repositories::{CampaignRepo, SegmentRepo};

use crate::engine::campaigns::CampaignSender;
use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /campaigns
// ---------------------------------------------------------------------------

/// Create a campaign in `draft` status.
pub async fn create_campaign(
    RequireAdmin(principal): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateCampaign>,
) -> AppResult<impl IntoResponse> {
    validate_campaign_name(&body.name)?;
    if !is_valid_campaign_type(&body.campaign_type) {
        return Err(CoreError::Validation(format!(
            "Invalid campaign_type: '{}'. Must be one of: {}",
            body.campaign_type,
            CAMPAIGN_TYPES.join(", ")
        ))
        .into());
    }
    if !body.content.is_object() {
        return Err(CoreError::Validation("content must be a JSON object".to_string()).into());
    }

    // The target segment must exist before a draft referencing it is saved.
    SegmentRepo::find_by_id(&state.pool, body.target_segment_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Segment",
            id: body.target_segment_id,
        })?;

    let input = CreateCampaign {
        created_by: Some(principal.id),
        ..body
    };
    let campaign = CampaignRepo::create(&state.pool, &input).await?;

    tracing::info!(
        campaign_id = campaign.id,
        campaign_type = %campaign.campaign_type,
        target_segment_id = campaign.target_segment_id,
        principal_id = principal.id,
        "Campaign created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: campaign })))
}

// ---------------------------------------------------------------------------
// GET /campaigns
// ---------------------------------------------------------------------------

/// List campaigns.
pub async fn list_campaigns(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let campaigns = CampaignRepo::list(&state.pool, params.limit, params.offset).await?;
    Ok(Json(DataResponse { data: campaigns }))
}

// ---------------------------------------------------------------------------
// GET /campaigns/{id}
// ---------------------------------------------------------------------------

/// Get a single campaign by ID.
pub async fn get_campaign(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let campaign = CampaignRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Campaign",
            id,
        })?;
    Ok(Json(DataResponse { data: campaign }))
}

// ---------------------------------------------------------------------------
// POST /campaigns/{id}/send
// ---------------------------------------------------------------------------

/// Send a campaign to the live membership of its target segment.
pub async fn send_campaign(
    RequireAdmin(principal): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let sender = CampaignSender::new(state.pool.clone(), state.messenger.clone());
    let report = sender.send(id).await?;

    tracing::info!(
        campaign_id = id,
        principal_id = principal.id,
        status = %report.status,
        "Campaign send requested"
    );

    Ok(Json(DataResponse { data: report }))
}
