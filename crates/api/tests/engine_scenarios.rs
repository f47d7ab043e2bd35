//! Engine integration tests against a real database.
//!
//! Covers the dispatcher/executor pipeline end to end: deterministic
//! matching, failure isolation, the always-log guarantee, idempotent
//! segment adds, loyalty balance rules, and campaign sends.

use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::json;
use sqlx::PgPool;

use meridian_api::engine::campaigns::CampaignSender;
use meridian_api::engine::dispatcher::{TriggerDispatcher, TriggerEvent};
use meridian_api::engine::executor::{ActionContext, ActionRegistry};
use meridian_core::error::CoreError;
use meridian_db::models::automation_rule::CreateAutomationRule;
use meridian_db::models::campaign::CreateCampaign;
use meridian_db::models::customer::CreateCustomer;
use meridian_db::models::segment::CreateSegment;
use meridian_db::repositories::{
    AutomationRuleRepo, CampaignRepo, CustomerRepo, ExecutionLogRepo, LoyaltyRepo,
    SegmentMembershipRepo, SegmentRepo,
};
use meridian_messaging::{MemoryMessenger, Messenger};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_dispatcher(pool: &PgPool, messenger: &Arc<MemoryMessenger>) -> TriggerDispatcher {
    let ctx = ActionContext {
        pool: pool.clone(),
        messenger: Arc::clone(messenger) as Arc<dyn Messenger>,
    };
    TriggerDispatcher::new(ctx, Arc::new(ActionRegistry::with_default_handlers()))
}

async fn seed_customer(pool: &PgPool, email: &str) -> i64 {
    CustomerRepo::create(
        pool,
        &CreateCustomer {
            email: email.to_string(),
            phone: None,
            full_name: "Engine Test".to_string(),
            birth_date: None,
            total_spent: None,
            order_count: None,
            last_purchase_at: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_rule(
    pool: &PgPool,
    trigger_type: &str,
    conditions: serde_json::Value,
    action_type: &str,
    action_config: serde_json::Value,
) -> i64 {
    AutomationRuleRepo::create(
        pool,
        &CreateAutomationRule {
            name: format!("{trigger_type}-{action_type}"),
            trigger_type: trigger_type.to_string(),
            trigger_conditions: conditions,
            action_type: action_type.to_string(),
            action_config,
            is_active: None,
            created_by: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn purchase_event(customer_id: i64, payload: serde_json::Value) -> TriggerEvent {
    TriggerEvent {
        event_type: "purchase_completed".to_string(),
        customer_id,
        payload,
    }
}

// ---------------------------------------------------------------------------
// Loyalty scenario
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn purchase_trigger_credits_loyalty_points(pool: PgPool) {
    let customer_id = seed_customer(&pool, "loyal@example.com").await;
    LoyaltyRepo::adjust(&pool, customer_id, 100, Some("seed")).await.unwrap();

    let rule_id = seed_rule(
        &pool,
        "purchase_completed",
        json!({}),
        "adjust_loyalty_points",
        json!({ "points": 50 }),
    )
    .await;

    let messenger = Arc::new(MemoryMessenger::new());
    let outcomes = test_dispatcher(&pool, &messenger)
        .dispatch(&purchase_event(customer_id, json!({ "total": 80 })))
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, "success");

    let account = LoyaltyRepo::find_account(&pool, customer_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.points_balance, 150);

    let executions = ExecutionLogRepo::list_for_rule(&pool, rule_id, 10, 0)
        .await
        .unwrap();
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0].status, "success");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn loyalty_overdraft_is_logged_as_failed_and_applies_nothing(pool: PgPool) {
    let customer_id = seed_customer(&pool, "broke@example.com").await;
    LoyaltyRepo::adjust(&pool, customer_id, 30, None).await.unwrap();

    let rule_id = seed_rule(
        &pool,
        "purchase_completed",
        json!({}),
        "adjust_loyalty_points",
        json!({ "points": -100 }),
    )
    .await;

    let messenger = Arc::new(MemoryMessenger::new());
    let outcomes = test_dispatcher(&pool, &messenger)
        .dispatch(&purchase_event(customer_id, json!({})))
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, "failed");

    let account = LoyaltyRepo::find_account(&pool, customer_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.points_balance, 30, "balance unchanged");

    let executions = ExecutionLogRepo::list_for_rule(&pool, rule_id, 10, 0)
        .await
        .unwrap();
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0].status, "failed");
}

// ---------------------------------------------------------------------------
// Unsupported action scenario
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn unregistered_action_fails_closed_with_exactly_one_failed_row(pool: PgPool) {
    let customer_id = seed_customer(&pool, "teleport@example.com").await;
    // The repo layer does not validate action types; a legacy rule with an
    // unknown tag can exist in the store.
    let rule_id = seed_rule(
        &pool,
        "purchase_completed",
        json!({}),
        "teleport_user",
        json!({}),
    )
    .await;

    let messenger = Arc::new(MemoryMessenger::new());
    let outcomes = test_dispatcher(&pool, &messenger)
        .dispatch(&purchase_event(customer_id, json!({})))
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, "failed");
    assert!(outcomes[0]
        .error_message
        .as_deref()
        .unwrap()
        .contains("teleport_user"));

    let executions = ExecutionLogRepo::list_for_rule(&pool, rule_id, 10, 0)
        .await
        .unwrap();
    assert_eq!(executions.len(), 1, "exactly one log row");
    assert_eq!(executions[0].status, "failed");
}

// ---------------------------------------------------------------------------
// Matching and isolation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn disabled_rules_never_execute(pool: PgPool) {
    let customer_id = seed_customer(&pool, "quiet@example.com").await;
    let rule_id = seed_rule(
        &pool,
        "purchase_completed",
        json!({}),
        "send_notification",
        json!({ "title": "t", "body": "b" }),
    )
    .await;
    AutomationRuleRepo::toggle_active(&pool, rule_id, false)
        .await
        .unwrap();

    let messenger = Arc::new(MemoryMessenger::new());
    let outcomes = test_dispatcher(&pool, &messenger)
        .dispatch(&purchase_event(customer_id, json!({})))
        .await
        .unwrap();

    assert!(outcomes.is_empty());
    assert_eq!(
        ExecutionLogRepo::count_for_rule(&pool, rule_id).await.unwrap(),
        0
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_matching_conditions_produce_no_execution(pool: PgPool) {
    let customer_id = seed_customer(&pool, "smallcart@example.com").await;
    let rule_id = seed_rule(
        &pool,
        "purchase_completed",
        json!({ "total": { "gte": 100 } }),
        "send_notification",
        json!({ "title": "big spender", "body": "thanks" }),
    )
    .await;

    let messenger = Arc::new(MemoryMessenger::new());
    let outcomes = test_dispatcher(&pool, &messenger)
        .dispatch(&purchase_event(customer_id, json!({ "total": 20 })))
        .await
        .unwrap();

    assert!(outcomes.is_empty());
    assert_eq!(
        ExecutionLogRepo::count_for_rule(&pool, rule_id).await.unwrap(),
        0
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failing_rule_does_not_block_later_rules(pool: PgPool) {
    let customer_id = seed_customer(&pool, "resilient@example.com").await;

    // First rule (lower id) sends a message; delivery will fail.
    seed_rule(
        &pool,
        "purchase_completed",
        json!({}),
        "send_message",
        json!({ "body": "hi" }),
    )
    .await;
    // Second rule writes an in-app notification and must still run.
    let second_rule = seed_rule(
        &pool,
        "purchase_completed",
        json!({}),
        "send_notification",
        json!({ "title": "t", "body": "b" }),
    )
    .await;

    let messenger = Arc::new(MemoryMessenger::new());
    messenger.set_failure(Some("provider unreachable"));

    let outcomes = test_dispatcher(&pool, &messenger)
        .dispatch(&purchase_event(customer_id, json!({})))
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].status, "failed");
    assert_eq!(outcomes[1].status, "success");
    assert_eq!(outcomes[1].rule_id, second_rule);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn repeated_add_to_segment_trigger_yields_one_membership_row(pool: PgPool) {
    let customer_id = seed_customer(&pool, "member@example.com").await;
    let segment = SegmentRepo::create(
        &pool,
        &CreateSegment {
            name: "repeat-buyers".to_string(),
            description: None,
            criteria: json!({}),
            created_by: None,
        },
        0,
    )
    .await
    .unwrap();

    let rule_id = seed_rule(
        &pool,
        "purchase_completed",
        json!({}),
        "add_to_segment",
        json!({ "segment_id": segment.id }),
    )
    .await;

    let messenger = Arc::new(MemoryMessenger::new());
    let dispatcher = test_dispatcher(&pool, &messenger);
    let event = purchase_event(customer_id, json!({ "total": 10 }));

    // Identical trigger dispatched twice.
    dispatcher.dispatch(&event).await.unwrap();
    dispatcher.dispatch(&event).await.unwrap();

    assert_eq!(
        SegmentMembershipRepo::count_for_segment(&pool, segment.id)
            .await
            .unwrap(),
        1,
        "exactly one membership row"
    );
    // Both firings were still logged.
    assert_eq!(
        ExecutionLogRepo::count_for_rule(&pool, rule_id).await.unwrap(),
        2
    );
}

// ---------------------------------------------------------------------------
// Campaign sends
// ---------------------------------------------------------------------------

async fn seed_campaign_fixture(pool: &PgPool) -> (i64, i64) {
    // Three tier-2 customers and one outsider.
    for i in 0..3 {
        let id = seed_customer(pool, &format!("vip{i}@example.com")).await;
        LoyaltyRepo::set_tier(pool, id, 2).await.unwrap();
    }
    seed_customer(pool, "outsider@example.com").await;

    let segment = SegmentRepo::create(
        pool,
        &CreateSegment {
            name: "tier-two".to_string(),
            description: None,
            criteria: json!({ "loyalty_tier": 2 }),
            created_by: None,
        },
        0, // stale on purpose; sends must not trust it
    )
    .await
    .unwrap();

    let campaign = CampaignRepo::create(
        pool,
        &CreateCampaign {
            name: "tier-two-promo".to_string(),
            campaign_type: "email".to_string(),
            target_segment_id: segment.id,
            content: json!({ "subject": "For you", "body": "A deal" }),
            schedule: None,
            created_by: None,
        },
    )
    .await
    .unwrap();

    (campaign.id, segment.id)
}

#[sqlx::test(migrations = "../db/migrations")]
async fn campaign_send_targets_live_membership_and_completes(pool: PgPool) {
    let (campaign_id, _) = seed_campaign_fixture(&pool).await;

    let messenger = Arc::new(MemoryMessenger::new());
    let sender = CampaignSender::new(pool.clone(), Arc::clone(&messenger) as _);
    let report = sender.send(campaign_id).await.unwrap();

    assert_eq!(report.targeted, 3, "cached count (0) was ignored");
    assert_eq!(report.dispatched, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(report.status, "completed");
    assert!(!report.retry_pending);
    assert_eq!(messenger.sent_count(), 3);

    let campaign = CampaignRepo::find_by_id(&pool, campaign_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(campaign.status, "completed");
    assert!(!campaign.retry_pending);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_dispatch_leaves_campaign_active_with_retry_pending(pool: PgPool) {
    let (campaign_id, _) = seed_campaign_fixture(&pool).await;

    let messenger = Arc::new(MemoryMessenger::new());
    messenger.set_failure(Some("gateway down"));
    let sender = CampaignSender::new(pool.clone(), Arc::clone(&messenger) as _);
    let report = sender.send(campaign_id).await.unwrap();

    assert_eq!(report.dispatched, 0);
    assert_eq!(report.failed, 3);
    assert_eq!(report.status, "active");
    assert!(report.retry_pending);

    let campaign = CampaignRepo::find_by_id(&pool, campaign_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(campaign.status, "active");
    assert!(campaign.retry_pending);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn completed_campaign_cannot_be_sent_again(pool: PgPool) {
    let (campaign_id, _) = seed_campaign_fixture(&pool).await;

    let messenger = Arc::new(MemoryMessenger::new());
    let sender = CampaignSender::new(pool.clone(), Arc::clone(&messenger) as _);
    sender.send(campaign_id).await.unwrap();

    let err = sender.send(campaign_id).await.unwrap_err();
    assert_matches!(
        err,
        meridian_api::error::AppError::Core(CoreError::Conflict(_))
    );
}
