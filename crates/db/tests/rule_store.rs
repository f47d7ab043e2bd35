//! Integration tests for the automation rule store and execution log.
//!
//! Exercises the repository layer against a real database:
//! - Rule CRUD and soft-disable
//! - Active-rule lookup ordering for the dispatcher
//! - Append-only execution log and the read-side aggregates

use serde_json::json;
use sqlx::PgPool;

use meridian_db::models::automation_execution::CreateExecution;
use meridian_db::models::automation_rule::{CreateAutomationRule, UpdateAutomationRule};
use meridian_db::models::customer::CreateCustomer;
use meridian_db::repositories::{AutomationRuleRepo, CustomerRepo, ExecutionLogRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_rule(name: &str, trigger_type: &str) -> CreateAutomationRule {
    CreateAutomationRule {
        name: name.to_string(),
        trigger_type: trigger_type.to_string(),
        trigger_conditions: json!({}),
        action_type: "send_notification".to_string(),
        action_config: json!({ "title": "hi", "body": "there" }),
        is_active: None,
        created_by: None,
    }
}

fn new_customer(email: &str) -> CreateCustomer {
    CreateCustomer {
        email: email.to_string(),
        phone: None,
        full_name: "Test Customer".to_string(),
        birth_date: None,
        total_spent: None,
        order_count: None,
        last_purchase_at: None,
    }
}

// ---------------------------------------------------------------------------
// Rule CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn create_and_find_rule(pool: PgPool) {
    let rule = AutomationRuleRepo::create(&pool, &new_rule("welcome", "user_registered"))
        .await
        .unwrap();
    assert!(rule.is_active, "rules default to active");

    let found = AutomationRuleRepo::find_by_id(&pool, rule.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.name, "welcome");
    assert_eq!(found.trigger_type, "user_registered");
}

#[sqlx::test(migrations = "./migrations")]
async fn update_unknown_rule_returns_none(pool: PgPool) {
    let patch = UpdateAutomationRule {
        name: Some("renamed".to_string()),
        trigger_type: None,
        trigger_conditions: None,
        action_type: None,
        action_config: None,
        is_active: None,
    };
    let updated = AutomationRuleRepo::update(&pool, 999_999, &patch).await.unwrap();
    assert!(updated.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn update_patches_only_provided_fields(pool: PgPool) {
    let rule = AutomationRuleRepo::create(&pool, &new_rule("original", "birthday"))
        .await
        .unwrap();

    let patch = UpdateAutomationRule {
        name: Some("renamed".to_string()),
        trigger_type: None,
        trigger_conditions: None,
        action_type: None,
        action_config: None,
        is_active: None,
    };
    let updated = AutomationRuleRepo::update(&pool, rule.id, &patch)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "renamed");
    assert_eq!(updated.trigger_type, "birthday");
    assert_eq!(updated.action_type, rule.action_type);
}

// ---------------------------------------------------------------------------
// Dispatcher lookup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn active_rules_listed_in_ascending_id_order(pool: PgPool) {
    let first = AutomationRuleRepo::create(&pool, &new_rule("a", "purchase_completed"))
        .await
        .unwrap();
    let second = AutomationRuleRepo::create(&pool, &new_rule("b", "purchase_completed"))
        .await
        .unwrap();
    // Different trigger type: must not appear.
    AutomationRuleRepo::create(&pool, &new_rule("c", "cart_abandoned"))
        .await
        .unwrap();

    let rules = AutomationRuleRepo::list_active_by_trigger(&pool, "purchase_completed")
        .await
        .unwrap();
    let ids: Vec<i64> = rules.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn disabled_rules_are_never_returned_to_the_dispatcher(pool: PgPool) {
    let rule = AutomationRuleRepo::create(&pool, &new_rule("muted", "purchase_completed"))
        .await
        .unwrap();
    assert!(AutomationRuleRepo::toggle_active(&pool, rule.id, false)
        .await
        .unwrap());

    let rules = AutomationRuleRepo::list_active_by_trigger(&pool, "purchase_completed")
        .await
        .unwrap();
    assert!(rules.is_empty());
}

// ---------------------------------------------------------------------------
// Execution log
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn execution_log_appends_and_aggregates(pool: PgPool) {
    let rule = AutomationRuleRepo::create(&pool, &new_rule("logged", "purchase_completed"))
        .await
        .unwrap();
    let customer = CustomerRepo::create(&pool, &new_customer("log@example.com"))
        .await
        .unwrap();

    for status in ["success", "success", "failed"] {
        ExecutionLogRepo::append(
            &pool,
            &CreateExecution {
                rule_id: rule.id,
                customer_id: customer.id,
                trigger_payload: json!({ "total": 10 }),
                result_payload: json!({}),
                status: status.to_string(),
                error_message: None,
            },
        )
        .await
        .unwrap();
    }

    assert_eq!(
        ExecutionLogRepo::count_for_rule(&pool, rule.id).await.unwrap(),
        3
    );

    let listed = AutomationRuleRepo::list_with_stats(&pool, None, None)
        .await
        .unwrap();
    let stats = listed.iter().find(|r| r.id == rule.id).unwrap();
    assert_eq!(stats.execution_count, 3);
    assert_eq!(stats.success_count, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn execution_entries_are_returned_newest_first(pool: PgPool) {
    let rule = AutomationRuleRepo::create(&pool, &new_rule("ordered", "birthday"))
        .await
        .unwrap();
    let customer = CustomerRepo::create(&pool, &new_customer("ordered@example.com"))
        .await
        .unwrap();

    for i in 0..3 {
        ExecutionLogRepo::append(
            &pool,
            &CreateExecution {
                rule_id: rule.id,
                customer_id: customer.id,
                trigger_payload: json!({ "seq": i }),
                result_payload: json!({}),
                status: "success".to_string(),
                error_message: None,
            },
        )
        .await
        .unwrap();
    }

    let entries = ExecutionLogRepo::list_for_rule(&pool, rule.id, 10, 0)
        .await
        .unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.windows(2).all(|w| w[0].executed_at >= w[1].executed_at));
}
