//! Repository for the `marketing_campaigns` table.

use sqlx::PgPool;
use meridian_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use meridian_core::types::DbId;

use crate::models::campaign::{CreateCampaign, MarketingCampaign, SendMetrics};

/// Column list for marketing_campaigns queries.
const COLUMNS: &str = "id, name, campaign_type, status, target_segment_id, content, \
    schedule, metrics, retry_pending, created_by, created_at, updated_at";

/// Provides CRUD and status-transition operations for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Insert a new campaign in `draft` status, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCampaign,
    ) -> Result<MarketingCampaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO marketing_campaigns
                (name, campaign_type, target_segment_id, content, schedule, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MarketingCampaign>(&query)
            .bind(&input.name)
            .bind(&input.campaign_type)
            .bind(input.target_segment_id)
            .bind(&input.content)
            .bind(&input.schedule)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a campaign by its primary key.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MarketingCampaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM marketing_campaigns WHERE id = $1");
        sqlx::query_as::<_, MarketingCampaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List campaigns, newest first.
    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<MarketingCampaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM marketing_campaigns
             ORDER BY created_at DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, MarketingCampaign>(&query)
            .bind(clamp_limit(limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Move a campaign into `active` status at the start of a send.
    pub async fn mark_active(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE marketing_campaigns SET status = 'active', updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the outcome of a send: `completed` when every outbound job was
    /// acknowledged, otherwise still `active` with the retry-pending marker
    /// set for the messaging collaborator.
    pub async fn record_send_outcome(
        pool: &PgPool,
        id: DbId,
        metrics: &SendMetrics,
    ) -> Result<bool, sqlx::Error> {
        let fully_dispatched = metrics.failed == 0;
        let status = if fully_dispatched { "completed" } else { "active" };
        let metrics_json = serde_json::json!({
            "targeted": metrics.targeted,
            "dispatched": metrics.dispatched,
            "failed": metrics.failed,
        });
        let result = sqlx::query(
            "UPDATE marketing_campaigns
             SET status = $1, retry_pending = $2, metrics = $3, updated_at = now()
             WHERE id = $4",
        )
        .bind(status)
        .bind(!fully_dispatched)
        .bind(&metrics_json)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
