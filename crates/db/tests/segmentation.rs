//! Integration tests for segment criteria compilation, segment CRUD, and
//! the idempotent membership cache.

use serde_json::json;
use sqlx::PgPool;

use meridian_db::criteria::CompiledCriteria;
use meridian_db::models::customer::CreateCustomer;
use meridian_db::models::segment::CreateSegment;
use meridian_db::repositories::{
    CustomerRepo, LoyaltyRepo, SegmentMembershipRepo, SegmentRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_customer(email: &str, total_spent: f64) -> CreateCustomer {
    CreateCustomer {
        email: email.to_string(),
        phone: None,
        full_name: "Seed Customer".to_string(),
        birth_date: None,
        total_spent: Some(total_spent),
        order_count: None,
        last_purchase_at: None,
    }
}

async fn seed_customers(pool: &PgPool, count: usize) -> Vec<i64> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let customer = CustomerRepo::create(pool, &new_customer(&format!("c{i}@example.com"), 0.0))
            .await
            .unwrap();
        ids.push(customer.id);
    }
    ids
}

// ---------------------------------------------------------------------------
// Criteria compilation against live data
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn tier_criteria_counts_exactly_matching_customers(pool: PgPool) {
    // 10 customers, 3 of them on loyalty tier 2.
    let ids = seed_customers(&pool, 10).await;
    for id in ids.iter().take(3) {
        LoyaltyRepo::set_tier(&pool, *id, 2).await.unwrap();
    }

    let compiled = CompiledCriteria::compile(&json!({ "loyalty_tier": 2 })).unwrap();
    assert_eq!(compiled.count(&pool).await.unwrap(), 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn count_is_bounded_by_total_customer_count(pool: PgPool) {
    seed_customers(&pool, 5).await;
    let total = CustomerRepo::count_all(&pool).await.unwrap();

    let everyone = CompiledCriteria::compile(&json!({})).unwrap();
    assert_eq!(everyone.count(&pool).await.unwrap(), total);

    let spenders = CompiledCriteria::compile(&json!({ "min_total_spent": 1_000_000 })).unwrap();
    let count = spenders.count(&pool).await.unwrap();
    assert!(count >= 0 && count <= total);
}

#[sqlx::test(migrations = "./migrations")]
async fn member_ids_match_count(pool: PgPool) {
    let ids = seed_customers(&pool, 6).await;
    for id in ids.iter().take(2) {
        LoyaltyRepo::set_tier(&pool, *id, 1).await.unwrap();
    }

    let compiled = CompiledCriteria::compile(&json!({ "loyalty_tier": 1 })).unwrap();
    let members = compiled.member_ids(&pool).await.unwrap();
    assert_eq!(members.len() as i64, compiled.count(&pool).await.unwrap());
    assert!(members.windows(2).all(|w| w[0] < w[1]), "ids ascend");
}

#[sqlx::test(migrations = "./migrations")]
async fn spend_criteria_uses_live_values(pool: PgPool) {
    CustomerRepo::create(&pool, &new_customer("big@example.com", 500.0))
        .await
        .unwrap();
    CustomerRepo::create(&pool, &new_customer("small@example.com", 20.0))
        .await
        .unwrap();

    let compiled = CompiledCriteria::compile(&json!({ "min_total_spent": 100 })).unwrap();
    assert_eq!(compiled.count(&pool).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Segment store
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn create_then_recount_is_stable_on_static_data(pool: PgPool) {
    let ids = seed_customers(&pool, 4).await;
    for id in &ids {
        LoyaltyRepo::set_tier(&pool, *id, 3).await.unwrap();
    }

    let criteria = json!({ "loyalty_tier": 3 });
    let compiled = CompiledCriteria::compile(&criteria).unwrap();
    let at_create = compiled.count(&pool).await.unwrap();

    let segment = SegmentRepo::create(
        &pool,
        &CreateSegment {
            name: "tier-three".to_string(),
            description: None,
            criteria: criteria.clone(),
            created_by: None,
        },
        at_create,
    )
    .await
    .unwrap();
    assert_eq!(segment.cached_member_count, 4);

    // A dry-run with identical criteria on unchanged data returns the same count.
    let dry_run = CompiledCriteria::compile(&criteria).unwrap();
    assert_eq!(dry_run.count(&pool).await.unwrap(), at_create);
}

// ---------------------------------------------------------------------------
// Membership cache
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn membership_insert_is_idempotent(pool: PgPool) {
    let ids = seed_customers(&pool, 1).await;
    let segment = SegmentRepo::create(
        &pool,
        &CreateSegment {
            name: "dedup".to_string(),
            description: None,
            criteria: json!({}),
            created_by: None,
        },
        0,
    )
    .await
    .unwrap();

    let inserted = SegmentMembershipRepo::add(&pool, segment.id, ids[0]).await.unwrap();
    assert!(inserted);
    let inserted_again = SegmentMembershipRepo::add(&pool, segment.id, ids[0]).await.unwrap();
    assert!(!inserted_again, "second add is a no-op");

    assert_eq!(
        SegmentMembershipRepo::count_for_segment(&pool, segment.id)
            .await
            .unwrap(),
        1
    );
}
