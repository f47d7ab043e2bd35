//! Repository for the `personalized_offers` table.

use sqlx::PgPool;
use meridian_core::types::DbId;

use crate::models::offer::{CreateOffer, PersonalizedOffer};

/// Column list for personalized_offers queries.
const COLUMNS: &str = "id, customer_id, discount_percent, expires_at, created_at";

/// Provides data-access methods for personalized offers.
pub struct OfferRepo;

impl OfferRepo {
    /// Persist a new personalized offer.
    pub async fn create(
        pool: &PgPool,
        input: &CreateOffer,
    ) -> Result<PersonalizedOffer, sqlx::Error> {
        let query = format!(
            "INSERT INTO personalized_offers (customer_id, discount_percent, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PersonalizedOffer>(&query)
            .bind(input.customer_id)
            .bind(input.discount_percent)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// List a customer's offers, newest first.
    pub async fn list_for_customer(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<Vec<PersonalizedOffer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM personalized_offers
             WHERE customer_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, PersonalizedOffer>(&query)
            .bind(customer_id)
            .fetch_all(pool)
            .await
    }
}
