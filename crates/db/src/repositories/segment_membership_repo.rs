//! Repository for the `segment_memberships` table.

use sqlx::PgPool;
use meridian_core::types::DbId;

use crate::models::segment::SegmentMembership;

/// Column list for segment_memberships queries.
const COLUMNS: &str = "id, segment_id, customer_id, added_at";

/// Provides idempotent membership inserts and lookups.
pub struct SegmentMembershipRepo;

impl SegmentMembershipRepo {
    /// Add a customer to a segment. Idempotent under the
    /// `uq_segment_memberships_segment_customer` constraint: re-adding an
    /// existing member is a no-op. Returns `true` if a new row was inserted.
    pub async fn add(
        pool: &PgPool,
        segment_id: DbId,
        customer_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO segment_memberships (segment_id, customer_id)
             VALUES ($1, $2)
             ON CONFLICT (segment_id, customer_id) DO NOTHING",
        )
        .bind(segment_id)
        .bind(customer_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List memberships for a segment, oldest first.
    pub async fn list_for_segment(
        pool: &PgPool,
        segment_id: DbId,
    ) -> Result<Vec<SegmentMembership>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM segment_memberships
             WHERE segment_id = $1
             ORDER BY added_at ASC"
        );
        sqlx::query_as::<_, SegmentMembership>(&query)
            .bind(segment_id)
            .fetch_all(pool)
            .await
    }

    /// Count cached memberships for a segment.
    pub async fn count_for_segment(pool: &PgPool, segment_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM segment_memberships WHERE segment_id = $1")
                .bind(segment_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}
