//! Repository for the `coupons` table.

use sqlx::PgPool;
use meridian_core::types::DbId;

use crate::models::coupon::{Coupon, CreateCoupon};

/// Column list for coupons queries.
const COLUMNS: &str = "id, customer_id, code, percent_off, single_use, redeemed_at, \
    expires_at, created_at";

/// Provides data-access methods for minted coupons.
pub struct CouponRepo;

impl CouponRepo {
    /// Persist a freshly minted coupon.
    pub async fn create(pool: &PgPool, input: &CreateCoupon) -> Result<Coupon, sqlx::Error> {
        let query = format!(
            "INSERT INTO coupons (customer_id, code, percent_off, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Coupon>(&query)
            .bind(input.customer_id)
            .bind(&input.code)
            .bind(input.percent_off)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Look up a coupon by its code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Coupon>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM coupons WHERE code = $1");
        sqlx::query_as::<_, Coupon>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List a customer's coupons, newest first.
    pub async fn list_for_customer(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<Vec<Coupon>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM coupons
             WHERE customer_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Coupon>(&query)
            .bind(customer_id)
            .fetch_all(pool)
            .await
    }
}
