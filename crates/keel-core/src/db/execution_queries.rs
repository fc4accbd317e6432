//! Execution record persistence.

use rusqlite::{params, OptionalExtension, Row};

use super::utils::{
    json_from_sql, json_to_sql, optional_timestamp_from_sql, parse_from_sql, timestamp_from_sql,
    timestamp_to_sql,
};
use crate::{
    error::{DatabaseResultExt, KeelError, Result},
    models::Execution,
};

const EXECUTION_COLUMNS: &str = "id, tenant, plan_id, pattern_id, variables, results, status, error, started_at, completed_at, total_tokens, total_cost, steps_completed";
const INSERT_EXECUTION_SQL: &str = "INSERT INTO executions (tenant, plan_id, pattern_id, variables, results, status, error, started_at, completed_at, total_tokens, total_cost, steps_completed) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";
const UPDATE_EXECUTION_SQL: &str = "UPDATE executions SET results = ?1, status = ?2, error = ?3, completed_at = ?4, total_tokens = ?5, total_cost = ?6, steps_completed = ?7 WHERE id = ?8 AND tenant = ?9";

fn execution_from_row(row: &Row<'_>) -> rusqlite::Result<Execution> {
    Ok(Execution {
        id: Some(row.get::<_, i64>(0)? as u64),
        tenant: row.get(1)?,
        plan_id: row.get::<_, i64>(2)? as u64,
        pattern_id: row.get::<_, Option<i64>>(3)?.map(|id| id as u64),
        variables: json_from_sql(4, &row.get::<_, String>(4)?)?,
        results: json_from_sql(5, &row.get::<_, String>(5)?)?,
        status: parse_from_sql(6, &row.get::<_, String>(6)?)?,
        error: row.get(7)?,
        started_at: timestamp_from_sql(8, row.get(8)?)?,
        completed_at: optional_timestamp_from_sql(9, row.get(9)?)?,
        total_tokens: row.get::<_, i64>(10)? as u64,
        total_cost: row.get(11)?,
        steps_completed: row.get::<_, i64>(12)? as u32,
    })
}

impl super::Database {
    /// Inserts a new execution record and returns its ID.
    pub fn insert_execution(&self, execution: &Execution) -> Result<u64> {
        let variables = json_to_sql(&execution.variables)?;
        let results = json_to_sql(&execution.results)?;

        self.connection
            .execute(
                INSERT_EXECUTION_SQL,
                params![
                    execution.tenant,
                    execution.plan_id as i64,
                    execution.pattern_id.map(|id| id as i64),
                    variables,
                    results,
                    execution.status.as_str(),
                    execution.error,
                    timestamp_to_sql(&execution.started_at),
                    execution.completed_at.as_ref().map(timestamp_to_sql),
                    execution.total_tokens as i64,
                    execution.total_cost,
                    execution.steps_completed as i64
                ],
            )
            .db_context("Failed to insert execution")?;

        Ok(self.connection.last_insert_rowid() as u64)
    }

    /// Overwrites the mutable state of an execution with a new snapshot.
    pub fn update_execution(&self, execution: &Execution) -> Result<()> {
        let id = execution.id.ok_or_else(|| {
            KeelError::invalid_input("id", "execution must be created before it can be updated")
        })?;
        let results = json_to_sql(&execution.results)?;

        let rows_affected = self
            .connection
            .execute(
                UPDATE_EXECUTION_SQL,
                params![
                    results,
                    execution.status.as_str(),
                    execution.error,
                    execution.completed_at.as_ref().map(timestamp_to_sql),
                    execution.total_tokens as i64,
                    execution.total_cost,
                    execution.steps_completed as i64,
                    id as i64,
                    execution.tenant
                ],
            )
            .db_context("Failed to update execution")?;

        if rows_affected == 0 {
            return Err(KeelError::ExecutionNotFound { id });
        }

        Ok(())
    }

    /// Retrieves an execution by its ID.
    pub fn get_execution(&self, tenant: &str, id: u64) -> Result<Option<Execution>> {
        let sql = format!("SELECT {EXECUTION_COLUMNS} FROM executions WHERE id = ?1 AND tenant = ?2");
        self.connection
            .query_row(&sql, params![id as i64, tenant], execution_from_row)
            .optional()
            .db_context("Failed to query execution")
    }

    /// Returns up to `limit` executions of a plan, most recent first.
    pub fn execution_history(
        &self,
        tenant: &str,
        plan_id: u64,
        limit: usize,
    ) -> Result<Vec<Execution>> {
        let sql = format!(
            "SELECT {EXECUTION_COLUMNS} FROM executions WHERE tenant = ?1 AND plan_id = ?2 \
             ORDER BY started_at DESC, id DESC LIMIT ?3"
        );
        let mut stmt = self
            .connection
            .prepare(&sql)
            .db_context("Failed to prepare query")?;

        let executions = stmt
            .query_map(
                params![tenant, plan_id as i64, limit as i64],
                execution_from_row,
            )
            .db_context("Failed to query execution history")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch execution history")?;

        Ok(executions)
    }
}
