//! Repository for the `automation_executions` table.
//!
//! The execution log is append-only: `append` is the only write operation,
//! and no update or delete methods are exposed.

use sqlx::PgPool;
use meridian_core::types::DbId;

use crate::models::automation_execution::{AutomationExecution, CreateExecution};

/// Column list for automation_executions queries.
const COLUMNS: &str = "id, rule_id, customer_id, trigger_payload, result_payload, \
    status, error_message, executed_at";

/// Provides append and read access for the execution audit trail.
pub struct ExecutionLogRepo;

impl ExecutionLogRepo {
    /// Append a new execution log entry.
    pub async fn append(
        pool: &PgPool,
        input: &CreateExecution,
    ) -> Result<AutomationExecution, sqlx::Error> {
        let query = format!(
            "INSERT INTO automation_executions
                (rule_id, customer_id, trigger_payload, result_payload, status, error_message)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AutomationExecution>(&query)
            .bind(input.rule_id)
            .bind(input.customer_id)
            .bind(&input.trigger_payload)
            .bind(&input.result_payload)
            .bind(&input.status)
            .bind(&input.error_message)
            .fetch_one(pool)
            .await
    }

    /// List execution entries for a rule, newest first.
    pub async fn list_for_rule(
        pool: &PgPool,
        rule_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AutomationExecution>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM automation_executions
             WHERE rule_id = $1
             ORDER BY executed_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, AutomationExecution>(&query)
            .bind(rule_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count execution entries for a rule.
    pub async fn count_for_rule(pool: &PgPool, rule_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM automation_executions WHERE rule_id = $1")
                .bind(rule_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}
