//! Repository for the `message_deliveries` table.

use sqlx::PgPool;
use meridian_core::types::DbId;

use crate::models::message_delivery::{CreateMessageDelivery, MessageDelivery};

/// Column list for message_deliveries queries.
const COLUMNS: &str = "id, customer_id, channel, recipient, subject, status, \
    error_message, created_at";

/// Provides data-access methods for outbound delivery records.
pub struct MessageDeliveryRepo;

impl MessageDeliveryRepo {
    /// Record an outbound delivery attempt.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMessageDelivery,
    ) -> Result<MessageDelivery, sqlx::Error> {
        let query = format!(
            "INSERT INTO message_deliveries
                (customer_id, channel, recipient, subject, status, error_message)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MessageDelivery>(&query)
            .bind(input.customer_id)
            .bind(&input.channel)
            .bind(&input.recipient)
            .bind(&input.subject)
            .bind(&input.status)
            .bind(&input.error_message)
            .fetch_one(pool)
            .await
    }

    /// List a customer's delivery records, newest first.
    pub async fn list_for_customer(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<Vec<MessageDelivery>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM message_deliveries
             WHERE customer_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, MessageDelivery>(&query)
            .bind(customer_id)
            .fetch_all(pool)
            .await
    }
}
