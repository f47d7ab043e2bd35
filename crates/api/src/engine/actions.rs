//! Built-in action handlers.
//!
//! One handler per [`ActionType`](meridian_core::automation::ActionType),
//! each with the signature `execute(ctx, customer_id, config) -> Result`.
//! Handlers validate their config document, touch the store through the
//! repository layer, and report structured outcomes; every fault is returned
//! as an error for the executor to convert into a failed result.

use async_trait::async_trait;
use serde_json::json;

use meridian_core::automation::ActionOutcome;
use meridian_core::coupons;
use meridian_core::error::CoreError;
use meridian_core::offers;
use meridian_core::types::DbId;
use meridian_db::models::coupon::CreateCoupon;
use meridian_db::models::customer::Customer;
use meridian_db::models::message_delivery::CreateMessageDelivery;
use meridian_db::models::notification::CreateNotification;
use meridian_db::models::offer::CreateOffer;
use meridian_db::repositories::{
    CouponRepo, CustomerRepo, LoyaltyAdjustError, LoyaltyRepo, MessageDeliveryRepo,
    NotificationRepo, OfferRepo, SegmentMembershipRepo, SegmentRepo,
};
use meridian_messaging::OutboundMessage;

use super::executor::{ActionContext, ActionHandler};

/// Default discount for `apply_discount` when the config does not set one.
const DEFAULT_DISCOUNT_PERCENT: f64 = 10.0;

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

fn req_str(config: &serde_json::Value, key: &str) -> Result<String, CoreError> {
    config
        .get(key)
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| CoreError::Validation(format!("action_config requires string '{key}'")))
}

fn opt_str(config: &serde_json::Value, key: &str) -> Option<String> {
    config.get(key).and_then(|v| v.as_str()).map(String::from)
}

fn req_i64(config: &serde_json::Value, key: &str) -> Result<i64, CoreError> {
    config
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| CoreError::Validation(format!("action_config requires integer '{key}'")))
}

fn opt_i64(config: &serde_json::Value, key: &str) -> Option<i64> {
    config.get(key).and_then(|v| v.as_i64())
}

fn opt_f64(config: &serde_json::Value, key: &str) -> Option<f64> {
    config.get(key).and_then(|v| v.as_f64())
}

/// Store faults inside a handler are caught at the executor boundary, so
/// they are folded into the internal error variant here.
fn store_err(e: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("store error: {e}"))
}

/// Resolve the target customer, failing with NotFound for unknown ids.
async fn ensure_customer(ctx: &ActionContext, customer_id: DbId) -> Result<Customer, CoreError> {
    CustomerRepo::find_by_id(&ctx.pool, customer_id)
        .await
        .map_err(store_err)?
        .ok_or(CoreError::NotFound {
            entity: "Customer",
            id: customer_id,
        })
}

// ---------------------------------------------------------------------------
// send_message
// ---------------------------------------------------------------------------

/// Resolves the customer's contact info, delegates delivery to the
/// messaging collaborator, and records a delivery row either way.
#[derive(Debug)]
pub struct SendMessageHandler;

#[async_trait]
impl ActionHandler for SendMessageHandler {
    async fn execute(
        &self,
        ctx: &ActionContext,
        customer_id: DbId,
        config: &serde_json::Value,
    ) -> Result<ActionOutcome, CoreError> {
        let channel = opt_str(config, "channel").unwrap_or_else(|| "email".to_string());
        let body = req_str(config, "body")?;
        let subject = opt_str(config, "subject");

        let customer = ensure_customer(ctx, customer_id).await?;
        let recipient = match channel.as_str() {
            "email" => customer.email.clone(),
            "sms" => customer.phone.clone().ok_or_else(|| {
                CoreError::Validation(format!("Customer {customer_id} has no phone number"))
            })?,
            other => {
                return Err(CoreError::Validation(format!(
                    "send_message channel must be 'email' or 'sms', got '{other}'"
                )));
            }
        };

        let message = OutboundMessage {
            channel: channel.clone(),
            recipient: recipient.clone(),
            subject: subject.clone(),
            body,
        };

        let delivery_result = ctx.messenger.send(&message).await;
        let (status, error_message) = match &delivery_result {
            Ok(()) => ("sent", None),
            Err(e) => ("failed", Some(e.to_string())),
        };

        let record = MessageDeliveryRepo::create(
            &ctx.pool,
            &CreateMessageDelivery {
                customer_id,
                channel,
                recipient,
                subject,
                status: status.to_string(),
                error_message,
            },
        )
        .await
        .map_err(store_err)?;

        match delivery_result {
            Ok(()) => Ok(ActionOutcome::ok(json!({
                "delivery_id": record.id,
                "channel": record.channel,
                "recipient": record.recipient,
            }))),
            Err(e) => Err(CoreError::Delivery(e.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// add_to_segment
// ---------------------------------------------------------------------------

/// Idempotent membership insert: re-running the same rule for the same
/// customer leaves exactly one row.
#[derive(Debug)]
pub struct AddToSegmentHandler;

#[async_trait]
impl ActionHandler for AddToSegmentHandler {
    async fn execute(
        &self,
        ctx: &ActionContext,
        customer_id: DbId,
        config: &serde_json::Value,
    ) -> Result<ActionOutcome, CoreError> {
        let segment_id = req_i64(config, "segment_id")?;

        let segment = SegmentRepo::find_by_id(&ctx.pool, segment_id)
            .await
            .map_err(store_err)?
            .ok_or(CoreError::NotFound {
                entity: "Segment",
                id: segment_id,
            })?;
        if !segment.is_active {
            return Err(CoreError::Conflict(format!(
                "Segment {segment_id} is disabled"
            )));
        }

        ensure_customer(ctx, customer_id).await?;

        let inserted = SegmentMembershipRepo::add(&ctx.pool, segment_id, customer_id)
            .await
            .map_err(store_err)?;

        Ok(ActionOutcome::ok(json!({
            "segment_id": segment_id,
            "inserted": inserted,
        })))
    }
}

// ---------------------------------------------------------------------------
// apply_discount
// ---------------------------------------------------------------------------

/// Mints a single-use coupon with a code unique to this invocation and an
/// expiry strictly after issuance.
#[derive(Debug)]
pub struct ApplyDiscountHandler;

#[async_trait]
impl ActionHandler for ApplyDiscountHandler {
    async fn execute(
        &self,
        ctx: &ActionContext,
        customer_id: DbId,
        config: &serde_json::Value,
    ) -> Result<ActionOutcome, CoreError> {
        let percent_off = opt_f64(config, "percent_off").unwrap_or(DEFAULT_DISCOUNT_PERCENT);
        if !(0.0..=100.0).contains(&percent_off) || percent_off == 0.0 {
            return Err(CoreError::Validation(format!(
                "percent_off must be within 0..=100 and non-zero, got {percent_off}"
            )));
        }

        let validity_days =
            opt_i64(config, "validity_days").unwrap_or(coupons::DEFAULT_COUPON_VALIDITY_DAYS);
        coupons::validate_validity_days(validity_days)?;

        ensure_customer(ctx, customer_id).await?;

        let code = coupons::generate_code();
        let expires_at = coupons::expiry_at(chrono::Utc::now(), validity_days);

        let coupon = CouponRepo::create(
            &ctx.pool,
            &CreateCoupon {
                customer_id,
                code,
                percent_off,
                expires_at,
            },
        )
        .await
        .map_err(store_err)?;

        Ok(ActionOutcome::ok(json!({
            "coupon_id": coupon.id,
            "code": coupon.code,
            "percent_off": coupon.percent_off,
            "expires_at": coupon.expires_at,
        })))
    }
}

// ---------------------------------------------------------------------------
// send_notification
// ---------------------------------------------------------------------------

/// Writes an in-app notification record.
#[derive(Debug)]
pub struct SendNotificationHandler;

#[async_trait]
impl ActionHandler for SendNotificationHandler {
    async fn execute(
        &self,
        ctx: &ActionContext,
        customer_id: DbId,
        config: &serde_json::Value,
    ) -> Result<ActionOutcome, CoreError> {
        let title = req_str(config, "title")?;
        let body = req_str(config, "body")?;

        ensure_customer(ctx, customer_id).await?;

        let notification = NotificationRepo::create(
            &ctx.pool,
            &CreateNotification {
                customer_id,
                title,
                body,
            },
        )
        .await
        .map_err(store_err)?;

        Ok(ActionOutcome::ok(json!({
            "notification_id": notification.id,
        })))
    }
}

// ---------------------------------------------------------------------------
// adjust_loyalty_points
// ---------------------------------------------------------------------------

/// Appends a ledger transaction and moves the balance by the configured
/// delta. A debit below zero fails with InsufficientBalance and applies
/// nothing.
#[derive(Debug)]
pub struct AdjustLoyaltyPointsHandler;

#[async_trait]
impl ActionHandler for AdjustLoyaltyPointsHandler {
    async fn execute(
        &self,
        ctx: &ActionContext,
        customer_id: DbId,
        config: &serde_json::Value,
    ) -> Result<ActionOutcome, CoreError> {
        let points = req_i64(config, "points")?;
        if points == 0 {
            return Err(CoreError::Validation(
                "points must be non-zero".to_string(),
            ));
        }
        let reason = opt_str(config, "reason");

        ensure_customer(ctx, customer_id).await?;

        let transaction =
            LoyaltyRepo::adjust(&ctx.pool, customer_id, points, reason.as_deref())
                .await
                .map_err(|e| match e {
                    LoyaltyAdjustError::InsufficientBalance { balance, requested } => {
                        CoreError::InsufficientBalance { balance, requested }
                    }
                    LoyaltyAdjustError::Db(db) => store_err(db),
                })?;

        Ok(ActionOutcome::ok(json!({
            "points_delta": transaction.points_delta,
            "balance_after": transaction.balance_after,
        })))
    }
}

// ---------------------------------------------------------------------------
// generate_personalized_offer
// ---------------------------------------------------------------------------

/// Reads the customer's loyalty tier and persists an offer with
/// `discount = base + tier * tier_bonus` and a fixed 7-day expiry.
#[derive(Debug)]
pub struct GeneratePersonalizedOfferHandler;

#[async_trait]
impl ActionHandler for GeneratePersonalizedOfferHandler {
    async fn execute(
        &self,
        ctx: &ActionContext,
        customer_id: DbId,
        config: &serde_json::Value,
    ) -> Result<ActionOutcome, CoreError> {
        let base = opt_f64(config, "base_percent").unwrap_or(offers::DEFAULT_BASE_DISCOUNT_PERCENT);
        let bonus =
            opt_f64(config, "tier_bonus_percent").unwrap_or(offers::DEFAULT_TIER_BONUS_PERCENT);
        offers::validate_discount_params(base, bonus)?;

        ensure_customer(ctx, customer_id).await?;

        let tier = LoyaltyRepo::find_account(&ctx.pool, customer_id)
            .await
            .map_err(store_err)?
            .map(|account| account.tier)
            .unwrap_or(0);

        let discount_percent = offers::compute_discount(base, bonus, tier);
        let expires_at = chrono::Utc::now() + chrono::Duration::days(offers::OFFER_VALIDITY_DAYS);

        let offer = OfferRepo::create(
            &ctx.pool,
            &CreateOffer {
                customer_id,
                discount_percent,
                expires_at,
            },
        )
        .await
        .map_err(store_err)?;

        Ok(ActionOutcome::ok(json!({
            "offer_id": offer.id,
            "discount_percent": offer.discount_percent,
            "tier": tier,
            "expires_at": offer.expires_at,
        })))
    }
}
