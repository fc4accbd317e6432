//! Execution and step result models.

use std::{collections::BTreeMap, str::FromStr, time::Duration};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::StepId;

/// Lifecycle of one execution: `running → completed | failed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    #[default]
    Running,
    Completed,
    Failed,
}

impl FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "running" => Ok(ExecutionStatus::Running),
            "completed" => Ok(ExecutionStatus::Completed),
            "failed" => Ok(ExecutionStatus::Failed),
            _ => Err(format!("Invalid execution status: {s}")),
        }
    }
}

impl ExecutionStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Running => "running",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }
}

/// Outcome of one executed step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepResult {
    pub step_id: StepId,
    pub success: bool,

    /// Opaque payload returned by the subagent
    #[serde(default)]
    pub data: serde_json::Value,

    /// Failure message; empty on success
    #[serde(default)]
    pub error: String,

    #[serde(default)]
    pub tokens_used: u64,

    #[serde(default)]
    pub cost: f64,

    #[serde(default)]
    pub duration: Duration,
}

impl StepResult {
    /// A failed result that never reached the subagent or was cut short.
    pub fn failure(step_id: StepId, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            step_id,
            success: false,
            data: serde_json::Value::Null,
            error: error.into(),
            tokens_used: 0,
            cost: 0.0,
            duration,
        }
    }
}

/// One run of an instantiated plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Execution {
    /// Assigned when the execution row is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    pub tenant: String,

    /// The stored plan this run was instantiated from
    pub plan_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_id: Option<u64>,

    /// Variable values the plan was instantiated with
    #[serde(default)]
    pub variables: BTreeMap<String, String>,

    /// Results in step order; index `k` is step `k + 1`
    #[serde(default)]
    pub results: Vec<StepResult>,

    pub status: ExecutionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub started_at: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    #[serde(default)]
    pub total_tokens: u64,

    #[serde(default)]
    pub total_cost: f64,

    #[serde(default)]
    pub steps_completed: u32,
}

impl Execution {
    /// Starts a new running execution.
    pub fn start(
        tenant: impl Into<String>,
        plan_id: u64,
        pattern_id: Option<u64>,
        variables: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id: None,
            tenant: tenant.into(),
            plan_id,
            pattern_id,
            variables,
            results: Vec::new(),
            status: ExecutionStatus::Running,
            error: None,
            started_at: Timestamp::now(),
            completed_at: None,
            total_tokens: 0,
            total_cost: 0.0,
            steps_completed: 0,
        }
    }

    /// Appends a step result and folds it into the aggregates.
    pub fn record(&mut self, result: StepResult) {
        self.total_tokens += result.tokens_used;
        self.total_cost += result.cost;
        if result.success {
            self.steps_completed += 1;
        }
        self.results.push(result);
    }

    /// Finalizes the execution as completed.
    pub fn complete(&mut self) {
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Timestamp::now());
    }

    /// Finalizes the execution as failed.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = ExecutionStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(Timestamp::now());
    }

    pub fn result_for(&self, step_id: StepId) -> Option<&StepResult> {
        self.results.iter().find(|r| r.step_id == step_id)
    }

    /// The result that failed the execution, if any.
    pub fn failed_result(&self) -> Option<&StepResult> {
        self.results.iter().find(|r| !r.success)
    }
}
