//! Structural and semantic plan validation.

use std::{collections::HashSet, fmt};

use log::warn;

use crate::{
    error::{KeelError, Result},
    models::Plan,
};

/// A non-fatal finding reported by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A declared variable is never referenced by any step input
    UnusedVariable { name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnusedVariable { name } => {
                write!(f, "variable '{name}' is declared but never used")
            }
        }
    }
}

/// Warnings collected while validating a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Names of variables no step references.
    pub fn unused_variables(&self) -> Vec<&str> {
        self.0
            .iter()
            .map(|d| match d {
                Diagnostic::UnusedVariable { name } => name.as_str(),
            })
            .collect()
    }
}

/// Checks a plan, returning warnings on success.
///
/// Rules are checked in order and the first violation is returned:
/// intent, description, at least one step, subagent and action per step,
/// contiguous ids `1..=N`, dependencies on lower ids only, unique variable
/// names. Because a step may only depend on earlier steps, a valid plan is
/// acyclic and its declaration order is already a topological order.
pub fn validate(plan: &Plan) -> Result<Diagnostics> {
    if plan.intent.trim().is_empty() {
        return Err(KeelError::invalid_plan("intent").with_reason("intent must not be empty"));
    }
    if plan.description.trim().is_empty() {
        return Err(KeelError::invalid_plan("description")
            .with_reason("description must not be empty"));
    }
    if plan.steps.is_empty() {
        return Err(KeelError::invalid_plan("steps").with_reason("plan has no steps"));
    }

    for (index, step) in plan.steps.iter().enumerate() {
        if step.subagent.trim().is_empty() {
            return Err(KeelError::invalid_plan(format!("steps[{index}].subagent"))
                .with_reason("subagent must not be empty"));
        }
        if step.action.trim().is_empty() {
            return Err(KeelError::invalid_plan(format!("steps[{index}].action"))
                .with_reason("action must not be empty"));
        }
    }

    for (index, step) in plan.steps.iter().enumerate() {
        let expected = index as u32 + 1;
        if step.id != expected {
            return Err(KeelError::invalid_plan(format!("steps[{index}].id")).with_reason(
                format!("expected step id {expected}, found {}", step.id),
            ));
        }
    }

    for step in &plan.steps {
        for &dependency in &step.depends {
            if dependency == 0 || dependency >= step.id {
                return Err(KeelError::invalid_plan(format!("step {}.depends", step.id))
                    .with_reason(format!(
                        "step {} may only depend on earlier steps, found {dependency}",
                        step.id
                    )));
            }
        }
    }

    let mut seen = HashSet::new();
    for variable in &plan.variables {
        if variable.name.trim().is_empty() {
            return Err(KeelError::invalid_plan("variables")
                .with_reason("variable name must not be empty"));
        }
        if !seen.insert(variable.name.as_str()) {
            return Err(KeelError::invalid_plan("variables")
                .with_reason(format!("duplicate variable '{}'", variable.name)));
        }
    }

    let mut diagnostics = Diagnostics::default();
    for variable in &plan.variables {
        let token = variable.placeholder();
        let used = plan
            .steps
            .iter()
            .any(|step| step.input.values().any(|value| value.contains(&token)));
        if !used {
            warn!(
                "plan for '{}': variable '{}' is never referenced",
                plan.intent, variable.name
            );
            diagnostics.0.push(Diagnostic::UnusedVariable {
                name: variable.name.clone(),
            });
        }
    }

    Ok(diagnostics)
}
