//! Repository for the `automation_rules` table.

use sqlx::PgPool;
use meridian_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use meridian_core::types::DbId;

use crate::models::automation_rule::{
    AutomationRule, CreateAutomationRule, RuleWithStats, UpdateAutomationRule,
};

/// Column list for automation_rules queries.
const COLUMNS: &str = "id, name, trigger_type, trigger_conditions, action_type, \
    action_config, is_active, created_by, created_at, updated_at";

/// Qualified column list used when joining against the execution log.
const QUALIFIED_COLUMNS: &str = "r.id, r.name, r.trigger_type, r.trigger_conditions, \
    r.action_type, r.action_config, r.is_active, r.created_by, r.created_at, r.updated_at";

/// Provides CRUD operations for automation rules.
pub struct AutomationRuleRepo;

impl AutomationRuleRepo {
    /// Insert a new rule, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAutomationRule,
    ) -> Result<AutomationRule, sqlx::Error> {
        let query = format!(
            "INSERT INTO automation_rules
                (name, trigger_type, trigger_conditions, action_type, action_config,
                 is_active, created_by)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, true), $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AutomationRule>(&query)
            .bind(&input.name)
            .bind(&input.trigger_type)
            .bind(&input.trigger_conditions)
            .bind(&input.action_type)
            .bind(&input.action_config)
            .bind(input.is_active)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a rule by its primary key.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AutomationRule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM automation_rules WHERE id = $1");
        sqlx::query_as::<_, AutomationRule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List rules annotated with execution aggregates (total / succeeded),
    /// newest first.
    pub async fn list_with_stats(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<RuleWithStats>, sqlx::Error> {
        let query = format!(
            "SELECT {QUALIFIED_COLUMNS},
                    COUNT(e.id) AS execution_count,
                    COUNT(e.id) FILTER (WHERE e.status = 'success') AS success_count
             FROM automation_rules r
             LEFT JOIN automation_executions e ON e.rule_id = r.id
             GROUP BY r.id
             ORDER BY r.created_at DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, RuleWithStats>(&query)
            .bind(clamp_limit(limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// List active rules for a trigger type, in ascending id order.
    ///
    /// The ordering is what makes dispatch deterministic; callers must not
    /// re-sort.
    pub async fn list_active_by_trigger(
        pool: &PgPool,
        trigger_type: &str,
    ) -> Result<Vec<AutomationRule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM automation_rules \
             WHERE trigger_type = $1 AND is_active \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, AutomationRule>(&query)
            .bind(trigger_type)
            .fetch_all(pool)
            .await
    }

    /// Update an existing rule. Returns the updated row, or `None` if not found.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAutomationRule,
    ) -> Result<Option<AutomationRule>, sqlx::Error> {
        let query = format!(
            "UPDATE automation_rules SET
                name               = COALESCE($1, name),
                trigger_type       = COALESCE($2, trigger_type),
                trigger_conditions = COALESCE($3, trigger_conditions),
                action_type        = COALESCE($4, action_type),
                action_config      = COALESCE($5, action_config),
                is_active          = COALESCE($6, is_active),
                updated_at         = now()
             WHERE id = $7
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AutomationRule>(&query)
            .bind(&input.name)
            .bind(&input.trigger_type)
            .bind(&input.trigger_conditions)
            .bind(&input.action_type)
            .bind(&input.action_config)
            .bind(input.is_active)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Toggle a rule's active flag (soft-disable). Returns `true` if a row
    /// was updated.
    pub async fn toggle_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE automation_rules SET is_active = $1, updated_at = now() WHERE id = $2")
                .bind(is_active)
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
