//! Plan generation prompt and reply parsing.

use serde::Deserialize;

use crate::{
    error::{KeelError, Result},
    models::{Plan, Step, Variable},
};

/// Builds the prompt asking the model for a plan serving `intent`.
pub fn plan_prompt(intent: &str, message: &str, subagents: &[&str]) -> String {
    let available = if subagents.is_empty() {
        "(none registered)".to_string()
    } else {
        subagents.join(", ")
    };

    format!(
        r#"Create an execution plan for the intent "{intent}".

User request:
{message}

Available subagents: {available}

Reply with a single JSON object of this shape and nothing else:
{{
  "description": "what the plan accomplishes",
  "variables": [
    {{"name": "repo_path", "type": "file_path", "description": "...", "required": true}}
  ],
  "steps": [
    {{"id": 1, "subagent": "code", "action": "run_tests", "input": {{"path": "{{{{repo_path}}}}"}}, "depends": [], "timeout": 120}}
  ]
}}

Rules:
- Step ids start at 1 and increase by one.
- A step may only depend on steps with a smaller id.
- Reference variables in step inputs as {{{{name}}}}.
- Variable types are string, file_path or number."#
    )
}

/// Plan document as models write it; intent and bookkeeping are optional.
#[derive(Debug, Deserialize)]
struct GeneratedPlan {
    #[serde(default)]
    intent: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    steps: Vec<Step>,
    #[serde(default)]
    variables: Vec<Variable>,
}

/// Extracts the JSON object embedded in a model reply.
fn json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Parses a model reply into an unsaved plan for `intent`.
///
/// Prose and code fences around the object are ignored. The plan's intent is
/// always `intent`, whatever the model wrote. The result is not validated.
pub fn parse_plan(text: &str, intent: &str) -> Result<Plan> {
    let json = json_object(text).ok_or_else(|| KeelError::Model {
        message: "reply does not contain a JSON object".to_string(),
    })?;
    let generated: GeneratedPlan = serde_json::from_str(json).map_err(|e| KeelError::Model {
        message: format!("reply is not a valid plan: {e}"),
    })?;

    if !generated.intent.is_empty() && generated.intent != intent {
        log::warn!(
            "Generated plan declared intent '{}', storing it under '{intent}'",
            generated.intent
        );
    }

    let mut plan = Plan::new(intent, generated.description);
    plan.steps = generated.steps;
    plan.variables = generated.variables;
    Ok(plan)
}
