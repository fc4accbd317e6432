//! Plan and variable model definitions.

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Step, StepId};

fn default_active() -> bool {
    true
}

/// A reusable recipe of steps for one intent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Unique identifier, assigned by the store on first persist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Tenant owning the plan
    #[serde(default)]
    pub tenant: String,

    /// Intent key (`category.subcategory`)
    pub intent: String,

    /// What the plan accomplishes
    pub description: String,

    /// Ordered steps, referenced by 1-based position
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Named placeholders the steps may reference
    #[serde(default)]
    pub variables: Vec<Variable>,

    /// False once the plan has been soft-deleted
    #[serde(default = "default_active")]
    pub active: bool,

    /// Timestamp when the plan was first stored (UTC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,

    /// Timestamp when the plan was last overwritten (UTC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Plan {
    /// Creates an empty, unsaved plan.
    pub fn new(intent: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            tenant: String::new(),
            intent: intent.into(),
            description: description.into(),
            steps: Vec::new(),
            variables: Vec::new(),
            active: true,
            created_at: None,
            updated_at: None,
        }
    }

    /// Looks up a step by id.
    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Looks up a variable by name.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }
}

/// Declared type of a template variable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    #[default]
    String,
    FilePath,
    Number,
}

impl FromStr for VariableType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(VariableType::String),
            "file_path" | "filepath" => Ok(VariableType::FilePath),
            "number" => Ok(VariableType::Number),
            _ => Err(format!("Invalid variable type: {s}")),
        }
    }
}

impl VariableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::String => "string",
            VariableType::FilePath => "file_path",
            VariableType::Number => "number",
        }
    }
}

/// A named template slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variable {
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: VariableType,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: VariableType) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            required: false,
            default: None,
        }
    }

    /// The token this variable is referenced by inside step inputs.
    pub fn placeholder(&self) -> String {
        placeholder(&self.name)
    }
}

/// Formats the placeholder token for a variable name: `{{name}}`.
pub fn placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}
