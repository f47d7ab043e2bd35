//! Integration tests for loyalty balance adjustments.

use assert_matches::assert_matches;
use sqlx::PgPool;

use meridian_db::models::customer::CreateCustomer;
use meridian_db::repositories::{CustomerRepo, LoyaltyAdjustError, LoyaltyRepo};

async fn seed_customer(pool: &PgPool) -> i64 {
    CustomerRepo::create(
        pool,
        &CreateCustomer {
            email: "points@example.com".to_string(),
            phone: None,
            full_name: "Points Holder".to_string(),
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

#[sqlx::test(migrations = "./migrations")]
async fn credit_creates_account_and_ledger_row(pool: PgPool) {
    let customer_id = seed_customer(&pool).await;

    let tx = LoyaltyRepo::adjust(&pool, customer_id, 50, Some("welcome bonus"))
        .await
        .unwrap();
    assert_eq!(tx.points_delta, 50);
    assert_eq!(tx.balance_after, 50);

    let account = LoyaltyRepo::find_account(&pool, customer_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.points_balance, 50);
}

#[sqlx::test(migrations = "./migrations")]
async fn debit_within_balance_applies(pool: PgPool) {
    let customer_id = seed_customer(&pool).await;
    LoyaltyRepo::adjust(&pool, customer_id, 100, None).await.unwrap();

    let tx = LoyaltyRepo::adjust(&pool, customer_id, -40, Some("redemption"))
        .await
        .unwrap();
    assert_eq!(tx.balance_after, 60);
}

#[sqlx::test(migrations = "./migrations")]
async fn overdraft_fails_and_leaves_balance_unchanged(pool: PgPool) {
    let customer_id = seed_customer(&pool).await;
    LoyaltyRepo::adjust(&pool, customer_id, 30, None).await.unwrap();

    let err = LoyaltyRepo::adjust(&pool, customer_id, -100, None)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        LoyaltyAdjustError::InsufficientBalance {
            balance: 30,
            requested: 100
        }
    );

    let account = LoyaltyRepo::find_account(&pool, customer_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.points_balance, 30, "no partial application");

    // The failed attempt must not leave a ledger row behind.
    let ledger = LoyaltyRepo::list_transactions(&pool, customer_id, 10)
        .await
        .unwrap();
    assert_eq!(ledger.len(), 1);
}
