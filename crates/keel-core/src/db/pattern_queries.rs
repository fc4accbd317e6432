//! Pattern statistics queries.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension, Row, Transaction, TransactionBehavior};

use super::utils::{now, optional_timestamp_from_sql, timestamp_from_sql, timestamp_to_sql};
use crate::{
    error::{DatabaseResultExt, KeelError, Result},
    models::{Outcome, Pattern},
};

const PATTERN_COLUMNS: &str = "p.id, p.tenant, p.intent, p.plan_id, p.usage_count, p.success_count, p.failure_count, p.success_rate, p.last_used, p.last_succeeded, p.last_failed, p.created_at";
const INSERT_PATTERN_SQL: &str =
    "INSERT INTO patterns (tenant, intent, plan_id, created_at) VALUES (?1, ?2, ?3, ?4)";
const UPDATE_PATTERN_STATS_SQL: &str = "UPDATE patterns SET usage_count = ?1, success_count = ?2, failure_count = ?3, success_rate = ?4, last_used = ?5, last_succeeded = ?6, last_failed = ?7 WHERE id = ?8";

fn pattern_from_row(row: &Row<'_>) -> rusqlite::Result<Pattern> {
    Ok(Pattern {
        id: row.get::<_, i64>(0)? as u64,
        tenant: row.get(1)?,
        intent: row.get(2)?,
        plan_id: row.get::<_, i64>(3)? as u64,
        usage_count: row.get::<_, i64>(4)? as u64,
        success_count: row.get::<_, i64>(5)? as u64,
        failure_count: row.get::<_, i64>(6)? as u64,
        success_rate: row.get(7)?,
        last_used: optional_timestamp_from_sql(8, row.get(8)?)?,
        last_succeeded: optional_timestamp_from_sql(9, row.get(9)?)?,
        last_failed: optional_timestamp_from_sql(10, row.get(10)?)?,
        created_at: timestamp_from_sql(11, row.get(11)?)?,
    })
}

/// Inserts a zeroed pattern inside the caller's transaction.
pub(super) fn insert_pattern(
    tx: &Transaction<'_>,
    tenant: &str,
    intent: &str,
    plan_id: u64,
    now: Timestamp,
) -> Result<Pattern> {
    tx.execute(
        INSERT_PATTERN_SQL,
        params![tenant, intent, plan_id as i64, timestamp_to_sql(&now)],
    )
    .db_context("Failed to insert pattern")?;

    Ok(Pattern {
        id: tx.last_insert_rowid() as u64,
        tenant: tenant.to_string(),
        intent: intent.to_string(),
        plan_id,
        usage_count: 0,
        success_count: 0,
        failure_count: 0,
        success_rate: 0.0,
        last_used: None,
        last_succeeded: None,
        last_failed: None,
        created_at: now,
    })
}

impl super::Database {
    /// Retrieves a pattern by its ID.
    pub fn get_pattern(&self, tenant: &str, id: u64) -> Result<Option<Pattern>> {
        let sql = format!("SELECT {PATTERN_COLUMNS} FROM patterns p WHERE p.id = ?1 AND p.tenant = ?2");
        self.connection
            .query_row(&sql, params![id as i64, tenant], pattern_from_row)
            .optional()
            .db_context("Failed to query pattern")
    }

    /// Retrieves the pattern bound to a plan.
    pub fn get_pattern_for_plan(&self, tenant: &str, plan_id: u64) -> Result<Option<Pattern>> {
        let sql = format!(
            "SELECT {PATTERN_COLUMNS} FROM patterns p WHERE p.plan_id = ?1 AND p.tenant = ?2 \
             ORDER BY p.id DESC LIMIT 1"
        );
        self.connection
            .query_row(&sql, params![plan_id as i64, tenant], pattern_from_row)
            .optional()
            .db_context("Failed to query pattern for plan")
    }

    /// Returns the best-performing pattern for an intent.
    ///
    /// Only patterns with at least one success whose plan is still active are
    /// eligible; ordered by success rate, then usage count.
    pub fn best_pattern(&self, tenant: &str, intent: &str) -> Result<Option<Pattern>> {
        let sql = format!(
            "SELECT {PATTERN_COLUMNS} FROM patterns p JOIN plans pl ON pl.id = p.plan_id \
             WHERE p.tenant = ?1 AND p.intent = ?2 AND p.success_count > 0 AND pl.active = 1 \
             ORDER BY p.success_rate DESC, p.usage_count DESC, p.id DESC LIMIT 1"
        );
        self.connection
            .query_row(&sql, params![tenant, intent], pattern_from_row)
            .optional()
            .db_context("Failed to query best pattern")
    }

    /// Lists every pattern of a tenant grouped by intent, best first.
    pub fn list_patterns(&self, tenant: &str) -> Result<Vec<Pattern>> {
        let sql = format!(
            "SELECT {PATTERN_COLUMNS} FROM patterns p WHERE p.tenant = ?1 \
             ORDER BY p.intent ASC, p.success_rate DESC, p.usage_count DESC, p.id ASC"
        );
        let mut stmt = self
            .connection
            .prepare(&sql)
            .db_context("Failed to prepare query")?;

        let patterns = stmt
            .query_map(params![tenant], pattern_from_row)
            .db_context("Failed to query patterns")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch patterns")?;

        Ok(patterns)
    }

    /// Folds one outcome into a pattern's statistics.
    ///
    /// The read-modify-write runs in an `IMMEDIATE` transaction, which takes
    /// the database write lock up front, so concurrent recorders serialize and
    /// no update is lost.
    pub fn record_pattern_outcome(
        &mut self,
        tenant: &str,
        id: u64,
        outcome: Outcome,
    ) -> Result<Pattern> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let sql = format!("SELECT {PATTERN_COLUMNS} FROM patterns p WHERE p.id = ?1 AND p.tenant = ?2");
        let mut pattern = tx
            .query_row(&sql, params![id as i64, tenant], pattern_from_row)
            .optional()
            .db_context("Failed to query pattern")?
            .ok_or_else(|| KeelError::PatternNotFound {
                tenant: tenant.to_string(),
                key: format!("id {id}"),
            })?;

        pattern.record(outcome, now());

        tx.execute(
            UPDATE_PATTERN_STATS_SQL,
            params![
                pattern.usage_count as i64,
                pattern.success_count as i64,
                pattern.failure_count as i64,
                pattern.success_rate,
                pattern.last_used.as_ref().map(timestamp_to_sql),
                pattern.last_succeeded.as_ref().map(timestamp_to_sql),
                pattern.last_failed.as_ref().map(timestamp_to_sql),
                id as i64
            ],
        )
        .db_context("Failed to update pattern statistics")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(pattern)
    }
}
