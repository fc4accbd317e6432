//! Parameter structures shared by the CLI and MCP interfaces.
//!
//! These carry no framework derives beyond serde. With the `schema` feature
//! they also derive `schemars::JsonSchema`, which the MCP server needs to
//! describe its tools. Interface layers wrap them (clap arguments, MCP
//! request types) and convert into these before calling the store.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```

use std::collections::BTreeMap;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for operations requiring just an ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    /// The ID of the plan to operate on
    pub id: u64,
}

/// Parameters for importing a plan document into the library.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ImportPlan {
    /// The plan as a JSON document with intent, description, variables and
    /// steps. Any id, tenant or timestamps in it are ignored.
    pub document: String,
}

/// Parameters for validating a plan document without storing it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ValidatePlan {
    /// The plan as a JSON document
    pub document: String,
}

/// Parameters for previewing an instantiated plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct InstantiatePlan {
    /// ID of the stored plan to instantiate
    pub id: u64,
    /// Variable values by name
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

/// Parameters for looking up the best pattern of an intent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct BestPattern {
    /// Intent key in `category.subcategory` form
    pub intent: String,
}

/// Parameters for listing recent executions of a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ExecutionHistory {
    /// ID of the stored plan
    pub plan_id: u64,
    /// Maximum number of executions to return (default 20)
    #[serde(default)]
    pub limit: Option<usize>,
}
