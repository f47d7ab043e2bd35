//! Segment criteria compiler.
//!
//! Turns a validated criteria document into a bound-parameter query over
//! `customers`. Each recognized key has exactly one handler that contributes
//! a join (when it needs another table) and one condition with a `$n`
//! placeholder; values are always bound, never interpolated into the query
//! text. Unrecognized keys are rejected before compilation.

use sqlx::PgPool;
use meridian_core::error::CoreError;
use meridian_core::segments::{
    validate_criteria, CRITERIA_LAST_PURCHASE_WITHIN_DAYS, CRITERIA_LOYALTY_TIER,
    CRITERIA_MAX_AGE, CRITERIA_MIN_AGE, CRITERIA_MIN_TOTAL_SPENT,
};
use meridian_core::types::DbId;

// ---------------------------------------------------------------------------
// Bind values
// ---------------------------------------------------------------------------

/// A value bound into the compiled query.
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaBind {
    Int(i64),
    Float(f64),
}

// ---------------------------------------------------------------------------
// CompiledCriteria
// ---------------------------------------------------------------------------

/// The output of compiling a criteria document: reusable for both counting
/// and live membership resolution.
#[derive(Debug, Clone)]
pub struct CompiledCriteria {
    joins: Vec<&'static str>,
    conditions: Vec<String>,
    binds: Vec<CriteriaBind>,
}

impl CompiledCriteria {
    /// Compile a criteria document.
    ///
    /// Validation (recognized keys only, numeric non-negative values) runs
    /// first, so compilation itself cannot encounter a key it has no handler
    /// for. Keys are processed in canonical order regardless of the order
    /// the admin wrote them, which keeps the generated SQL stable.
    pub fn compile(criteria: &serde_json::Value) -> Result<Self, CoreError> {
        validate_criteria(criteria)?;

        let mut compiled = Self {
            joins: Vec::new(),
            conditions: Vec::new(),
            binds: Vec::new(),
        };

        let lookup = |key: &str| criteria.get(key).cloned();

        if let Some(value) = lookup(CRITERIA_MIN_AGE) {
            let idx = compiled.push_bind(CriteriaBind::Int(as_int(&value)));
            compiled.conditions.push(format!(
                "c.birth_date <= CURRENT_DATE - make_interval(years => ${idx}::int)"
            ));
        }
        if let Some(value) = lookup(CRITERIA_MAX_AGE) {
            let idx = compiled.push_bind(CriteriaBind::Int(as_int(&value)));
            compiled.conditions.push(format!(
                "c.birth_date > CURRENT_DATE - make_interval(years => ${idx}::int + 1)"
            ));
        }
        if let Some(value) = lookup(CRITERIA_MIN_TOTAL_SPENT) {
            let idx = compiled.push_bind(CriteriaBind::Float(as_float(&value)));
            compiled
                .conditions
                .push(format!("c.total_spent >= ${idx}"));
        }
        if let Some(value) = lookup(CRITERIA_LOYALTY_TIER) {
            let idx = compiled.push_bind(CriteriaBind::Int(as_int(&value)));
            compiled
                .joins
                .push("JOIN loyalty_accounts la ON la.customer_id = c.id");
            compiled.conditions.push(format!("la.tier = ${idx}::int"));
        }
        if let Some(value) = lookup(CRITERIA_LAST_PURCHASE_WITHIN_DAYS) {
            let idx = compiled.push_bind(CriteriaBind::Int(as_int(&value)));
            compiled.conditions.push(format!(
                "c.last_purchase_at >= now() - make_interval(days => ${idx}::int)"
            ));
        }

        Ok(compiled)
    }

    /// Register a bind and return its 1-based parameter index.
    fn push_bind(&mut self, bind: CriteriaBind) -> usize {
        self.binds.push(bind);
        self.binds.len()
    }

    /// Assemble the full query text for a given SELECT projection.
    fn build_query(&self, projection: &str) -> String {
        let mut query = format!("SELECT {projection} FROM customers c");
        for join in &self.joins {
            query.push(' ');
            query.push_str(join);
        }
        if !self.conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.conditions.join(" AND "));
        }
        query
    }

    /// The bound values, in parameter order.
    pub fn binds(&self) -> &[CriteriaBind] {
        &self.binds
    }

    /// Count matching customers. Always in `0..=total customer count`.
    pub async fn count(&self, pool: &PgPool) -> Result<i64, sqlx::Error> {
        let query = self.build_query("COUNT(*)");
        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for bind in &self.binds {
            q = match bind {
                CriteriaBind::Int(v) => q.bind(v),
                CriteriaBind::Float(v) => q.bind(v),
            };
        }
        q.fetch_one(pool).await
    }

    /// Resolve live membership: ids of every matching customer, ascending.
    pub async fn member_ids(&self, pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        let query = self.build_query("c.id") + " ORDER BY c.id ASC";
        let mut q = sqlx::query_scalar::<_, DbId>(&query);
        for bind in &self.binds {
            q = match bind {
                CriteriaBind::Int(v) => q.bind(v),
                CriteriaBind::Float(v) => q.bind(v),
            };
        }
        q.fetch_all(pool).await
    }
}

/// Read a validated numeric criteria value as an integer.
fn as_int(value: &serde_json::Value) -> i64 {
    value
        .as_i64()
        .unwrap_or_else(|| value.as_f64().unwrap_or(0.0) as i64)
}

/// Read a validated numeric criteria value as a float.
fn as_float(value: &serde_json::Value) -> f64 {
    value.as_f64().unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_criteria_compiles_to_bare_count() {
        let compiled = CompiledCriteria::compile(&json!({})).unwrap();
        assert_eq!(compiled.build_query("COUNT(*)"), "SELECT COUNT(*) FROM customers c");
        assert!(compiled.binds().is_empty());
    }

    #[test]
    fn unknown_key_fails_closed() {
        let err = CompiledCriteria::compile(&json!({ "favourite_colour": 3 })).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn every_value_is_bound_never_inlined() {
        let compiled = CompiledCriteria::compile(&json!({
            "min_age": 21,
            "min_total_spent": 99.5,
            "loyalty_tier": 2,
        }))
        .unwrap();
        let query = compiled.build_query("COUNT(*)");
        // Three criteria, three placeholders, zero literal values.
        assert_eq!(compiled.binds().len(), 3);
        for idx in 1..=3 {
            assert!(query.contains(&format!("${idx}")), "missing ${idx} in {query}");
        }
        assert!(!query.contains("21"));
        assert!(!query.contains("99.5"));
    }

    #[test]
    fn loyalty_tier_contributes_join_and_condition() {
        let compiled = CompiledCriteria::compile(&json!({ "loyalty_tier": 2 })).unwrap();
        let query = compiled.build_query("c.id");
        assert!(query.contains("JOIN loyalty_accounts la ON la.customer_id = c.id"));
        assert!(query.contains("la.tier = $1::int"));
        assert_eq!(compiled.binds(), &[CriteriaBind::Int(2)]);
    }

    #[test]
    fn key_order_in_document_does_not_change_sql() {
        let a = CompiledCriteria::compile(&json!({ "min_age": 21, "loyalty_tier": 1 })).unwrap();
        let b = CompiledCriteria::compile(&json!({ "loyalty_tier": 1, "min_age": 21 })).unwrap();
        assert_eq!(a.build_query("COUNT(*)"), b.build_query("COUNT(*)"));
        assert_eq!(a.binds(), b.binds());
    }

    #[test]
    fn conditions_are_conjoined() {
        let compiled = CompiledCriteria::compile(&json!({
            "min_total_spent": 100,
            "last_purchase_within_days": 30,
        }))
        .unwrap();
        let query = compiled.build_query("COUNT(*)");
        assert!(query.contains(" AND "));
        assert!(query.contains("c.total_spent >= $1"));
        assert!(query.contains("c.last_purchase_at >= now() - make_interval(days => $2::int)"));
    }

    #[test]
    fn age_bounds_target_birth_date() {
        let compiled =
            CompiledCriteria::compile(&json!({ "min_age": 18, "max_age": 30 })).unwrap();
        let query = compiled.build_query("COUNT(*)");
        assert!(query.contains("c.birth_date <= CURRENT_DATE - make_interval(years => $1::int)"));
        assert!(query.contains("c.birth_date > CURRENT_DATE - make_interval(years => $2::int + 1)"));
        assert_eq!(
            compiled.binds(),
            &[CriteriaBind::Int(18), CriteriaBind::Int(30)]
        );
    }
}
