//! Repository for the `notifications` table.

use sqlx::PgPool;
use meridian_core::types::DbId;

use crate::models::notification::{CreateNotification, Notification};

/// Column list for notifications queries.
const COLUMNS: &str = "id, customer_id, title, body, is_read, created_at";

/// Provides data-access methods for in-app notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Write a new notification record.
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (customer_id, title, body)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(input.customer_id)
            .bind(&input.title)
            .bind(&input.body)
            .fetch_one(pool)
            .await
    }

    /// List a customer's notifications, newest first.
    pub async fn list_for_customer(
        pool: &PgPool,
        customer_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE customer_id = $1 AND ($2 = false OR is_read = false)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(customer_id)
            .bind(unread_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark one notification as read. Returns `true` if the row belonged to
    /// the customer and was updated.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        customer_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE id = $1 AND customer_id = $2",
        )
        .bind(notification_id)
        .bind(customer_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a customer's unread notifications.
    pub async fn unread_count(pool: &PgPool, customer_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE customer_id = $1 AND is_read = false",
        )
        .bind(customer_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
