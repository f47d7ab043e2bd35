//! Repository for loyalty accounts and the points ledger.
//!
//! Point adjustments are serialized per customer with a row-level lock so
//! concurrent triggers against the same customer cannot lose updates.

use sqlx::PgPool;
use meridian_core::types::DbId;

use crate::models::loyalty::{LoyaltyAccount, LoyaltyTransaction};

/// Column list for loyalty_accounts queries.
const ACCOUNT_COLUMNS: &str = "id, customer_id, tier, points_balance, updated_at";

/// Column list for loyalty_transactions queries.
const TRANSACTION_COLUMNS: &str = "id, customer_id, points_delta, balance_after, reason, created_at";

/// Error type for point adjustments.
#[derive(Debug, thiserror::Error)]
pub enum LoyaltyAdjustError {
    /// The underlying database operation failed.
    #[error(transparent)]
    Db(#[from] sqlx::Error),

    /// The debit would drive the balance negative; nothing was applied.
    #[error("insufficient balance: {balance} available, debit of {requested} requested")]
    InsufficientBalance { balance: i64, requested: i64 },
}

/// Provides balance reads and serialized point adjustments.
pub struct LoyaltyRepo;

impl LoyaltyRepo {
    /// Find a customer's loyalty account.
    pub async fn find_account(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<Option<LoyaltyAccount>, sqlx::Error> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM loyalty_accounts WHERE customer_id = $1");
        sqlx::query_as::<_, LoyaltyAccount>(&query)
            .bind(customer_id)
            .fetch_optional(pool)
            .await
    }

    /// Create a customer's loyalty account if it does not exist yet, and
    /// return it either way.
    pub async fn ensure_account(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<LoyaltyAccount, sqlx::Error> {
        let query = format!(
            "INSERT INTO loyalty_accounts (customer_id)
             VALUES ($1)
             ON CONFLICT (customer_id) DO UPDATE SET customer_id = EXCLUDED.customer_id
             RETURNING {ACCOUNT_COLUMNS}"
        );
        sqlx::query_as::<_, LoyaltyAccount>(&query)
            .bind(customer_id)
            .fetch_one(pool)
            .await
    }

    /// Apply a point adjustment atomically: lock the account row, check the
    /// resulting balance, update it, and append a ledger transaction.
    ///
    /// A debit that would drive the balance negative fails with
    /// [`LoyaltyAdjustError::InsufficientBalance`] and leaves both the
    /// balance and the ledger untouched.
    pub async fn adjust(
        pool: &PgPool,
        customer_id: DbId,
        points_delta: i64,
        reason: Option<&str>,
    ) -> Result<LoyaltyTransaction, LoyaltyAdjustError> {
        let mut tx = pool.begin().await?;

        // Row-level lock serializes concurrent adjustments per customer.
        let locked = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM loyalty_accounts WHERE customer_id = $1 FOR UPDATE"
        );
        let account = sqlx::query_as::<_, LoyaltyAccount>(&locked)
            .bind(customer_id)
            .fetch_optional(&mut *tx)
            .await?;

        let balance = match account {
            Some(a) => a.points_balance,
            None => {
                // First touch creates the account inside the same transaction.
                sqlx::query("INSERT INTO loyalty_accounts (customer_id) VALUES ($1)")
                    .bind(customer_id)
                    .execute(&mut *tx)
                    .await?;
                0
            }
        };

        let new_balance = balance + points_delta;
        if new_balance < 0 {
            // Dropping the transaction rolls back the lock (and the account
            // insert on first touch) without applying anything.
            return Err(LoyaltyAdjustError::InsufficientBalance {
                balance,
                requested: -points_delta,
            });
        }

        sqlx::query(
            "UPDATE loyalty_accounts SET points_balance = $1, updated_at = now()
             WHERE customer_id = $2",
        )
        .bind(new_balance)
        .bind(customer_id)
        .execute(&mut *tx)
        .await?;

        let insert = format!(
            "INSERT INTO loyalty_transactions (customer_id, points_delta, balance_after, reason)
             VALUES ($1, $2, $3, $4)
             RETURNING {TRANSACTION_COLUMNS}"
        );
        let ledger_row = sqlx::query_as::<_, LoyaltyTransaction>(&insert)
            .bind(customer_id)
            .bind(points_delta)
            .bind(new_balance)
            .bind(reason)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ledger_row)
    }

    /// Set a customer's loyalty tier, creating the account if needed.
    pub async fn set_tier(
        pool: &PgPool,
        customer_id: DbId,
        tier: i32,
    ) -> Result<LoyaltyAccount, sqlx::Error> {
        let query = format!(
            "INSERT INTO loyalty_accounts (customer_id, tier)
             VALUES ($1, $2)
             ON CONFLICT (customer_id) DO UPDATE SET tier = EXCLUDED.tier, updated_at = now()
             RETURNING {ACCOUNT_COLUMNS}"
        );
        sqlx::query_as::<_, LoyaltyAccount>(&query)
            .bind(customer_id)
            .bind(tier)
            .fetch_one(pool)
            .await
    }

    /// List a customer's ledger entries, newest first.
    pub async fn list_transactions(
        pool: &PgPool,
        customer_id: DbId,
        limit: i64,
    ) -> Result<Vec<LoyaltyTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM loyalty_transactions
             WHERE customer_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, LoyaltyTransaction>(&query)
            .bind(customer_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
