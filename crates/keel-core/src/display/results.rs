//! Result wrapper types for displaying operation outcomes.

use std::fmt;

use crate::{
    models::{Pattern, Plan},
    template::{CostEstimate, Diagnostics},
};

/// Outcome of importing a plan document into the store.
#[derive(Debug)]
pub struct ImportResult {
    pub plan: Plan,
    pub pattern: Pattern,
    pub diagnostics: Diagnostics,
}

impl fmt::Display for ImportResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Stored plan with ID: {} (pattern {})",
            self.plan.id.unwrap_or_default(),
            self.pattern.id
        )?;
        writeln!(f)?;
        if !self.diagnostics.is_empty() {
            writeln!(f, "{}", self.diagnostics)?;
        }
        write!(f, "{}", self.plan)
    }
}

/// Outcome of validating a plan document without storing it.
pub struct ValidationReport {
    pub plan: Plan,
    pub diagnostics: Diagnostics,
    pub estimate: CostEstimate,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Plan for '{}' is valid ({} steps).",
            self.plan.intent,
            self.plan.steps.len()
        )?;
        writeln!(f)?;
        write!(f, "{}", self.estimate)?;
        writeln!(f)?;
        write!(f, "{}", self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{self, StepSpec};

    #[test]
    fn test_validation_report_lists_warnings() {
        let plan = template::build("docs.summarize", "Summarize")
            .optional_variable("style", crate::models::VariableType::String, "short")
            .step(StepSpec::new("web", "fetch").input("url", "https://example.com"))
            .build();
        let diagnostics = template::validate(&plan).unwrap();
        let report = ValidationReport {
            estimate: template::estimate_cost(&plan),
            plan,
            diagnostics,
        };

        let output = report.to_string();
        assert!(output.contains("Plan for 'docs.summarize' is valid (1 steps)."));
        assert!(output.contains("## Warnings"));
        assert!(output.contains("style"));
    }
}
