//! Plan CRUD operations and queries.

use rusqlite::{params, OptionalExtension, Row};

use super::{
    pattern_queries::insert_pattern,
    utils::{json_from_sql, json_to_sql, now, timestamp_from_sql, timestamp_to_sql},
};
use crate::{
    error::{DatabaseResultExt, KeelError, Result},
    models::{Pattern, Plan},
};

const PLAN_COLUMNS: &str =
    "id, tenant, intent, description, steps, variables, active, created_at, updated_at";
const INSERT_PLAN_SQL: &str = "INSERT INTO plans (tenant, intent, description, steps, variables, active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)";
const UPDATE_PLAN_SQL: &str = "UPDATE plans SET description = ?1, steps = ?2, variables = ?3, updated_at = ?4 WHERE id = ?5 AND tenant = ?6 AND active = 1";
const DEACTIVATE_PLAN_SQL: &str =
    "UPDATE plans SET active = 0, updated_at = ?1 WHERE id = ?2 AND tenant = ?3 AND active = 1";

/// Maps a row selected with [`PLAN_COLUMNS`].
fn plan_from_row(row: &Row<'_>) -> rusqlite::Result<Plan> {
    Ok(Plan {
        id: Some(row.get::<_, i64>(0)? as u64),
        tenant: row.get(1)?,
        intent: row.get(2)?,
        description: row.get(3)?,
        steps: json_from_sql(4, &row.get::<_, String>(4)?)?,
        variables: json_from_sql(5, &row.get::<_, String>(5)?)?,
        active: row.get::<_, i64>(6)? != 0,
        created_at: Some(timestamp_from_sql(7, row.get(7)?)?),
        updated_at: Some(timestamp_from_sql(8, row.get(8)?)?),
    })
}

impl super::Database {
    /// Persists a new plan together with a zeroed pattern bound to it.
    ///
    /// The plan's `tenant`, `intent`, `description`, `steps` and `variables`
    /// are stored; id and timestamps are assigned here.
    pub fn insert_plan(&mut self, plan: &Plan) -> Result<(Plan, Pattern)> {
        let steps = json_to_sql(&plan.steps)?;
        let variables = json_to_sql(&plan.variables)?;

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let created_at = now();
        let created_at_sql = timestamp_to_sql(&created_at);

        tx.execute(
            INSERT_PLAN_SQL,
            params![
                plan.tenant,
                plan.intent,
                plan.description,
                steps,
                variables,
                created_at_sql
            ],
        )
        .db_context("Failed to insert plan")?;

        let id = tx.last_insert_rowid() as u64;
        let pattern = insert_pattern(&tx, &plan.tenant, &plan.intent, id, created_at)?;

        tx.commit().db_context("Failed to commit transaction")?;

        let stored = Plan {
            id: Some(id),
            active: true,
            created_at: Some(created_at),
            updated_at: Some(created_at),
            ..plan.clone()
        };
        Ok((stored, pattern))
    }

    /// Retrieves a plan by its ID, including soft-deleted plans.
    pub fn get_plan(&self, tenant: &str, id: u64) -> Result<Option<Plan>> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM plans WHERE id = ?1 AND tenant = ?2");
        self.connection
            .query_row(&sql, params![id as i64, tenant], plan_from_row)
            .optional()
            .db_context("Failed to query plan")
    }

    /// Returns the most recently updated active plan for an intent.
    pub fn find_plan_by_intent(&self, tenant: &str, intent: &str) -> Result<Option<Plan>> {
        let sql = format!(
            "SELECT {PLAN_COLUMNS} FROM plans WHERE tenant = ?1 AND intent = ?2 AND active = 1 \
             ORDER BY updated_at DESC, id DESC LIMIT 1"
        );
        self.connection
            .query_row(&sql, params![tenant, intent], plan_from_row)
            .optional()
            .db_context("Failed to query plan by intent")
    }

    /// Lists all active plans for a tenant, most recently updated first.
    pub fn list_plans(&self, tenant: &str) -> Result<Vec<Plan>> {
        let sql = format!(
            "SELECT {PLAN_COLUMNS} FROM plans WHERE tenant = ?1 AND active = 1 \
             ORDER BY updated_at DESC, id DESC"
        );
        let mut stmt = self
            .connection
            .prepare(&sql)
            .db_context("Failed to prepare query")?;

        let plans = stmt
            .query_map(params![tenant], plan_from_row)
            .db_context("Failed to query plans")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch plans")?;

        Ok(plans)
    }

    /// Overwrites description, steps and variables of an active plan.
    pub fn update_plan(&mut self, plan: &Plan) -> Result<Plan> {
        let id = plan.id.ok_or_else(|| {
            KeelError::invalid_input("id", "plan must be stored before it can be updated")
        })?;
        let steps = json_to_sql(&plan.steps)?;
        let variables = json_to_sql(&plan.variables)?;

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let updated_at = now();
        let rows_affected = tx
            .execute(
                UPDATE_PLAN_SQL,
                params![
                    plan.description,
                    steps,
                    variables,
                    timestamp_to_sql(&updated_at),
                    id as i64,
                    plan.tenant
                ],
            )
            .db_context("Failed to update plan")?;

        if rows_affected == 0 {
            return Err(KeelError::PlanNotFound {
                tenant: plan.tenant.clone(),
                id,
            });
        }

        let sql = format!("SELECT {PLAN_COLUMNS} FROM plans WHERE id = ?1");
        let updated = tx
            .query_row(&sql, params![id as i64], plan_from_row)
            .db_context("Failed to query updated plan")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(updated)
    }

    /// Soft-deletes a plan. Rows are kept so executions stay dereferenceable.
    pub fn deactivate_plan(&mut self, tenant: &str, id: u64) -> Result<()> {
        let rows_affected = self
            .connection
            .execute(
                DEACTIVATE_PLAN_SQL,
                params![timestamp_to_sql(&now()), id as i64, tenant],
            )
            .db_context("Failed to delete plan")?;

        if rows_affected == 0 {
            return Err(KeelError::PlanNotFound {
                tenant: tenant.to_string(),
                id,
            });
        }

        Ok(())
    }
}
