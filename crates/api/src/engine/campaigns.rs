//! Campaign send boundary.
//!
//! [`CampaignSender`] re-evaluates the target segment's membership live
//! through the criteria compiler (never the cached count), queues one
//! outbound job per member, and drains the queue synchronously through the
//! messaging collaborator. Full acknowledgement completes the campaign;
//! partial failure leaves it active with the retry-pending marker -- the
//! retry policy itself belongs to the messaging collaborator.

use std::sync::Arc;

use serde::Serialize;

use meridian_core::campaigns::{ensure_sendable, CampaignStatus};
use meridian_core::error::CoreError;
use meridian_core::types::DbId;
use meridian_db::criteria::CompiledCriteria;
use meridian_db::models::campaign::SendMetrics;
use meridian_db::repositories::{CampaignRepo, CustomerRepo, SegmentRepo};
use meridian_messaging::{Messenger, OutboundMessage, OutboundQueue};

use crate::error::AppResult;

// ---------------------------------------------------------------------------
// CampaignSendReport
// ---------------------------------------------------------------------------

/// Summary returned to the admin who started the send.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignSendReport {
    pub campaign_id: DbId,
    pub status: String,
    pub targeted: i64,
    pub dispatched: i64,
    pub failed: i64,
    pub retry_pending: bool,
}

// ---------------------------------------------------------------------------
// CampaignSender
// ---------------------------------------------------------------------------

/// Executes campaign sends against live segment membership.
pub struct CampaignSender {
    pool: meridian_db::DbPool,
    messenger: Arc<dyn Messenger>,
}

impl CampaignSender {
    pub fn new(pool: meridian_db::DbPool, messenger: Arc<dyn Messenger>) -> Self {
        Self { pool, messenger }
    }

    /// Send a campaign to every current member of its target segment.
    pub async fn send(&self, campaign_id: DbId) -> AppResult<CampaignSendReport> {
        let campaign = CampaignRepo::find_by_id(&self.pool, campaign_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Campaign",
                id: campaign_id,
            })?;

        let status = CampaignStatus::from_str(&campaign.status)?;
        ensure_sendable(status)?;

        let segment = SegmentRepo::find_by_id(&self.pool, campaign.target_segment_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Segment",
                id: campaign.target_segment_id,
            })?;
        if !segment.is_active {
            return Err(CoreError::Conflict(format!(
                "Target segment {} is disabled",
                segment.id
            ))
            .into());
        }

        // Live membership via the criteria compiler; the cached count is
        // never trusted for targeting.
        let compiled = CompiledCriteria::compile(&segment.criteria)?;

        CampaignRepo::mark_active(&self.pool, campaign.id).await?;

        let member_ids = compiled.member_ids(&self.pool).await?;
        let members = CustomerRepo::list_by_ids(&self.pool, &member_ids).await?;

        let subject = campaign
            .content
            .get("subject")
            .and_then(|v| v.as_str())
            .map(String::from);
        let body = campaign
            .content
            .get("body")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let mut queue = OutboundQueue::new(Arc::clone(&self.messenger));
        let mut unreachable = 0i64;

        for customer in &members {
            let recipient = match campaign.campaign_type.as_str() {
                "sms" => customer.phone.clone(),
                // Push tokens are owned by the gateway; it resolves them
                // from the customer id.
                "push" => Some(customer.id.to_string()),
                _ => Some(customer.email.clone()),
            };
            match recipient {
                Some(recipient) => queue.enqueue(OutboundMessage {
                    channel: campaign.campaign_type.clone(),
                    recipient,
                    subject: subject.clone(),
                    body: body.clone(),
                }),
                None => unreachable += 1,
            }
        }

        let summary = queue.drain().await;

        // Members without a usable address were targeted but not delivered.
        let metrics = SendMetrics {
            targeted: member_ids.len() as i64,
            dispatched: summary.dispatched,
            failed: summary.failed + unreachable,
        };
        CampaignRepo::record_send_outcome(&self.pool, campaign.id, &metrics).await?;

        let completed = metrics.failed == 0;
        tracing::info!(
            campaign_id = campaign.id,
            targeted = metrics.targeted,
            dispatched = metrics.dispatched,
            failed = metrics.failed,
            completed,
            "Campaign send finished"
        );

        Ok(CampaignSendReport {
            campaign_id: campaign.id,
            status: if completed { "completed" } else { "active" }.to_string(),
            targeted: metrics.targeted,
            dispatched: metrics.dispatched,
            failed: metrics.failed,
            retry_pending: !completed,
        })
    }
}
