//! Repository for the `customer_segments` table.

use sqlx::PgPool;
use meridian_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use meridian_core::types::DbId;

use crate::models::segment::{CreateSegment, CustomerSegment, UpdateSegment};

/// Column list for customer_segments queries.
const COLUMNS: &str = "id, name, description, criteria, cached_member_count, \
    is_active, created_by, created_at, updated_at";

/// Provides CRUD operations for customer segments.
pub struct SegmentRepo;

impl SegmentRepo {
    /// Insert a new segment, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSegment,
        cached_member_count: i64,
    ) -> Result<CustomerSegment, sqlx::Error> {
        let query = format!(
            "INSERT INTO customer_segments
                (name, description, criteria, cached_member_count, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CustomerSegment>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.criteria)
            .bind(cached_member_count)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a segment by its primary key.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CustomerSegment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customer_segments WHERE id = $1");
        sqlx::query_as::<_, CustomerSegment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List segments, newest first. Inactive segments are included only when
    /// `include_inactive` is set.
    pub async fn list(
        pool: &PgPool,
        include_inactive: bool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<CustomerSegment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM customer_segments
             WHERE ($1 OR is_active)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, CustomerSegment>(&query)
            .bind(include_inactive)
            .bind(clamp_limit(limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Update an existing segment. Returns the updated row, or `None` if not
    /// found.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSegment,
    ) -> Result<Option<CustomerSegment>, sqlx::Error> {
        let query = format!(
            "UPDATE customer_segments SET
                name        = COALESCE($1, name),
                description = COALESCE($2, description),
                criteria    = COALESCE($3, criteria),
                is_active   = COALESCE($4, is_active),
                updated_at  = now()
             WHERE id = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CustomerSegment>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.criteria)
            .bind(input.is_active)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Store a freshly recomputed member count. Advisory only; sends never
    /// read it.
    pub async fn set_cached_count(
        pool: &PgPool,
        id: DbId,
        count: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE customer_segments SET cached_member_count = $1, updated_at = now() WHERE id = $2",
        )
        .bind(count)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
