//! Advisory cost estimation.

use serde::{Deserialize, Serialize};

use crate::models::{Plan, Value};

/// Fixed token overhead charged for every step.
pub const BASE_TOKENS_PER_STEP: u64 = 150;

/// Price of one token in dollars.
pub const PRICE_PER_TOKEN: f64 = 0.000_003;

/// Rough size of a plan run, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub steps: usize,
    pub tokens: u64,
    pub cost: f64,
}

/// Estimates tokens and cost for running `plan`.
///
/// Each step costs [`BASE_TOKENS_PER_STEP`] plus about one token per four
/// bytes of string, list or map input. Never used for enforcement.
pub fn estimate_cost(plan: &Plan) -> CostEstimate {
    estimate_cost_at(plan, PRICE_PER_TOKEN)
}

/// Like [`estimate_cost`] with an explicit price per token.
pub fn estimate_cost_at(plan: &Plan, price_per_token: f64) -> CostEstimate {
    let tokens: u64 = plan
        .steps
        .iter()
        .map(|step| BASE_TOKENS_PER_STEP + step.input.values().map(input_tokens).sum::<u64>())
        .sum();

    CostEstimate {
        steps: plan.steps.len(),
        tokens,
        cost: tokens as f64 * price_per_token,
    }
}

fn input_tokens(value: &Value) -> u64 {
    match value {
        Value::String(s) => s.len() as u64 / 4,
        Value::List(_) | Value::Map(_) => serde_json::to_string(value)
            .map(|json| json.len() as u64 / 4)
            .unwrap_or(0),
        _ => 0,
    }
}
