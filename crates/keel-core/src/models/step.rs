//! Step model definition and related functionality.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Value;

/// Step identifier: the 1-based position of the step within its plan.
pub type StepId = u32;

/// Timeout assigned to steps that do not declare one, in seconds.
pub const DEFAULT_STEP_TIMEOUT_SECS: u64 = 120;

fn default_timeout() -> u64 {
    DEFAULT_STEP_TIMEOUT_SECS
}

/// One unit of work delegated to a subagent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Position within the plan (1-based, contiguous)
    pub id: StepId,

    /// Name of the subagent capability that runs this step
    pub subagent: String,

    /// Verb within the subagent's capability
    pub action: String,

    /// Named arguments; strings may carry `{{variable}}` placeholders
    #[serde(default)]
    pub input: BTreeMap<String, Value>,

    /// Ids of steps that must complete before this one
    #[serde(default)]
    pub depends: Vec<StepId>,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Step {
    /// Creates a step with no input, no dependencies and the default timeout.
    pub fn new(id: StepId, subagent: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id,
            subagent: subagent.into(),
            action: action.into(),
            input: BTreeMap::new(),
            depends: Vec::new(),
            timeout: DEFAULT_STEP_TIMEOUT_SECS,
        }
    }

    /// `subagent.action`, used in logs and messages.
    pub fn qualified_action(&self) -> String {
        format!("{}.{}", self.subagent, self.action)
    }
}
