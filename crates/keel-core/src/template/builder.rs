//! Step-by-step plan construction.

use std::collections::BTreeMap;

use crate::models::{
    Plan, Step, StepId, Value, Variable, VariableType, DEFAULT_STEP_TIMEOUT_SECS,
};

/// Description of a step before it receives its position in a plan.
#[derive(Debug, Clone)]
pub struct StepSpec {
    subagent: String,
    action: String,
    input: BTreeMap<String, Value>,
    depends: Vec<StepId>,
    timeout: u64,
}

impl StepSpec {
    pub fn new(subagent: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            subagent: subagent.into(),
            action: action.into(),
            input: BTreeMap::new(),
            depends: Vec::new(),
            timeout: DEFAULT_STEP_TIMEOUT_SECS,
        }
    }

    /// Adds a named input argument.
    pub fn input(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.input.insert(name.into(), value.into());
        self
    }

    /// Declares the steps that must complete first.
    pub fn depends_on(mut self, ids: impl IntoIterator<Item = StepId>) -> Self {
        self.depends.extend(ids);
        self
    }

    /// Overrides the default timeout, in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    fn into_step(self, id: StepId) -> Step {
        Step {
            id,
            subagent: self.subagent,
            action: self.action,
            input: self.input,
            depends: self.depends,
            timeout: self.timeout,
        }
    }
}

/// Accumulates steps and variables for one plan.
///
/// Steps are numbered in the order they are added, starting at 1. The builder
/// does not validate; call [`super::validate`] on the built plan.
///
/// ```rust
/// use keel_core::template::{self, StepSpec};
/// use keel_core::models::VariableType;
///
/// let plan = template::build("code.fix_tests", "Run the test suite and analyze failures")
///     .required_variable("repo_path", VariableType::FilePath, "Repository to test")
///     .step(StepSpec::new("code", "run_tests").input("path", "{{repo_path}}"))
///     .step(StepSpec::new("code", "analyze_failures").depends_on([1]))
///     .build();
///
/// assert_eq!(plan.steps[1].id, 2);
/// assert!(template::validate(&plan).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    plan: Plan,
}

impl PlanBuilder {
    pub fn new(intent: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            plan: Plan::new(intent, description),
        }
    }

    /// Appends a step with the next sequential id.
    pub fn step(mut self, spec: StepSpec) -> Self {
        let id = self.plan.steps.len() as StepId + 1;
        self.plan.steps.push(spec.into_step(id));
        self
    }

    /// Declares a variable.
    pub fn variable(mut self, variable: Variable) -> Self {
        self.plan.variables.push(variable);
        self
    }

    /// Declares a variable that must be supplied at instantiation.
    pub fn required_variable(
        self,
        name: impl Into<String>,
        kind: VariableType,
        description: impl Into<String>,
    ) -> Self {
        let mut variable = Variable::new(name, kind);
        variable.description = description.into();
        variable.required = true;
        self.variable(variable)
    }

    /// Declares an optional variable with a fallback value.
    pub fn optional_variable(
        self,
        name: impl Into<String>,
        kind: VariableType,
        default: impl Into<String>,
    ) -> Self {
        let mut variable = Variable::new(name, kind);
        variable.default = Some(default.into());
        self.variable(variable)
    }

    pub fn build(self) -> Plan {
        self.plan
    }
}
