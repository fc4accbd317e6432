//! Display implementations for domain models.
//!
//! All output is markdown so the CLI can render it with termimad and the MCP
//! server can hand it to clients verbatim.

use std::fmt;

use super::datetime::{LocalDateTime, MaybeLocalDateTime};
use crate::{
    models::{
        Execution, ExecutionStatus, Pattern, Plan, Step, StepResult, Value, Variable, VariableType,
    },
    template::{CostEstimate, Diagnostics},
};

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            other => match serde_json::to_string(other) {
                Ok(json) => write!(f, "{json}"),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => writeln!(f, "# {id}. {}", self.intent)?,
            None => writeln!(f, "# {}", self.intent)?,
        }
        writeln!(f)?;

        if !self.tenant.is_empty() {
            writeln!(f, "- Tenant: {}", self.tenant)?;
        }
        if !self.active {
            writeln!(f, "- Status: deleted")?;
        }
        if let Some(created_at) = &self.created_at {
            writeln!(f, "- Created: {}", LocalDateTime(created_at))?;
        }
        if let Some(updated_at) = &self.updated_at {
            writeln!(f, "- Updated: {}", LocalDateTime(updated_at))?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.description)?;

        if !self.variables.is_empty() {
            writeln!(f, "\n## Variables")?;
            writeln!(f)?;
            for variable in &self.variables {
                write!(f, "{variable}")?;
            }
        }

        if self.steps.is_empty() {
            writeln!(f, "\nNo steps in this plan.")?;
        } else {
            writeln!(f, "\n## Steps")?;
            writeln!(f)?;
            for step in &self.steps {
                write!(f, "{step}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- `{}` ({})", self.placeholder(), self.kind)?;
        if self.required {
            write!(f, ", required")?;
        }
        if let Some(default) = &self.default {
            write!(f, ", default `{default}`")?;
        }
        if !self.description.is_empty() {
            write!(f, ": {}", self.description)?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {}. {}", self.id, self.qualified_action())?;
        writeln!(f)?;

        if !self.depends.is_empty() {
            let depends: Vec<String> = self.depends.iter().map(|id| id.to_string()).collect();
            writeln!(f, "- Depends on: {}", depends.join(", "))?;
        }
        writeln!(f, "- Timeout: {}s", self.timeout)?;

        for (name, value) in &self.input {
            writeln!(f, "- `{name}`: {value}")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## {} (Pattern {}, Plan {})",
            self.intent, self.id, self.plan_id
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "- **Success rate**: {:.0}% ({}/{})",
            self.success_rate * 100.0,
            self.success_count,
            self.usage_count
        )?;
        writeln!(f, "- **Failures**: {}", self.failure_count)?;
        writeln!(
            f,
            "- **Last used**: {}",
            MaybeLocalDateTime(self.last_used.as_ref())
        )?;
        writeln!(f)
    }
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.success { "ok" } else { "failed" };
        write!(
            f,
            "- Step {}: {mark} in {}ms",
            self.step_id,
            self.duration.as_millis()
        )?;
        if self.tokens_used > 0 {
            write!(f, ", {} tokens", self.tokens_used)?;
        }
        if !self.success && !self.error.is_empty() {
            write!(f, ": {}", self.error)?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => writeln!(f, "## Execution {id} ({})", self.status)?,
            None => writeln!(f, "## Execution ({})", self.status)?,
        }
        writeln!(f)?;
        writeln!(f, "- **Plan**: {}", self.plan_id)?;
        writeln!(f, "- **Started**: {}", LocalDateTime(&self.started_at))?;
        if let Some(completed_at) = &self.completed_at {
            writeln!(f, "- **Completed**: {}", LocalDateTime(completed_at))?;
        }
        writeln!(
            f,
            "- **Steps completed**: {}, **Tokens**: {}, **Cost**: ${:.4}",
            self.steps_completed, self.total_tokens, self.total_cost
        )?;
        if let Some(error) = &self.error {
            writeln!(f, "- **Error**: {error}")?;
        }

        if !self.results.is_empty() {
            writeln!(f)?;
            for result in &self.results {
                write!(f, "{result}")?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for CostEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Estimated cost: {} steps, ~{} tokens, ${:.4}",
            self.steps, self.tokens, self.cost
        )
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No warnings.");
        }
        writeln!(f, "## Warnings")?;
        writeln!(f)?;
        for diagnostic in self.iter() {
            writeln!(f, "- {diagnostic}")?;
        }
        Ok(())
    }
}
