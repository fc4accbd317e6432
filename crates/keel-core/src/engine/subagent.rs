//! The subagent boundary: who actually performs a step.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
    error::Result,
    models::{Step, StepId, StepResult},
};

/// Everything a subagent gets to see for one step.
#[derive(Debug, Clone)]
pub struct StepRequest {
    pub tenant: String,
    /// Id of the persisted execution, when persistence succeeded
    pub execution_id: Option<u64>,
    /// The instantiated step
    pub step: Step,
    /// Resolved plan variables
    pub variables: BTreeMap<String, String>,
    /// Results of the steps listed in `step.depends`, in dependency order
    pub dependencies: Vec<StepResult>,
}

/// What a subagent reports back. The engine measures duration itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubagentOutput {
    pub success: bool,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub tokens_used: u64,
    #[serde(default)]
    pub cost: f64,
}

impl SubagentOutput {
    pub fn success(data: impl Into<serde_json::Value>) -> Self {
        Self {
            success: true,
            data: data.into(),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            ..Default::default()
        }
    }

    /// Attaches token usage and cost.
    pub fn with_usage(mut self, tokens_used: u64, cost: f64) -> Self {
        self.tokens_used = tokens_used;
        self.cost = cost;
        self
    }

    pub(crate) fn into_step_result(self, step_id: StepId, duration: Duration) -> StepResult {
        let error = if !self.success && self.error.is_empty() {
            "subagent reported failure".to_string()
        } else {
            self.error
        };
        StepResult {
            step_id,
            success: self.success,
            data: self.data,
            error,
            tokens_used: self.tokens_used,
            cost: self.cost,
            duration,
        }
    }
}

/// A capability provider that carries out steps addressed to it by name.
///
/// Implementations should watch `cancel` for long-running work; the engine
/// cancels it when the step times out or the execution is cancelled.
#[async_trait]
pub trait Subagent: Send + Sync {
    /// Name steps use in their `subagent` field.
    fn name(&self) -> &str;

    async fn execute(&self, request: StepRequest, cancel: CancellationToken)
        -> Result<SubagentOutput>;
}

/// Name-indexed set of subagents available to the engine.
#[derive(Clone, Default)]
pub struct SubagentRegistry {
    subagents: HashMap<String, Arc<dyn Subagent>>,
}

impl SubagentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subagent under its own name, replacing any previous one.
    pub fn register(&mut self, subagent: Arc<dyn Subagent>) -> &mut Self {
        self.subagents
            .insert(subagent.name().to_string(), subagent);
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, subagent: Arc<dyn Subagent>) -> Self {
        self.register(subagent);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Subagent>> {
        self.subagents.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.subagents.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for SubagentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubagentRegistry")
            .field("subagents", &self.names())
            .finish()
    }
}
