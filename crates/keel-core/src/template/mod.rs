//! Template engine: build, validate, instantiate and price plans.
//!
//! A stored plan is a *template*: its step inputs may contain `{{name}}`
//! placeholders bound to the plan's declared variables. Before execution the
//! template is instantiated with concrete values, producing an unsaved copy.
//!
//! ```text
//! build() ──▶ validate() ──▶ store ──▶ instantiate(values) ──▶ engine
//!                 │
//!                 └── Diagnostics (unused variables, never fatal)
//! ```
//!
//! Validation is always an explicit call; neither the builder nor
//! instantiation validate on their own.

pub mod builder;
pub mod cost;
pub mod instantiate;
pub mod validate;

#[cfg(test)]
mod tests;

pub use builder::{PlanBuilder, StepSpec};
pub use cost::{
    estimate_cost, estimate_cost_at, CostEstimate, BASE_TOKENS_PER_STEP, PRICE_PER_TOKEN,
};
pub use instantiate::{instantiate, resolve_variables};
pub use validate::{validate, Diagnostic, Diagnostics};

/// Starts building a plan for `intent`.
pub fn build(intent: impl Into<String>, description: impl Into<String>) -> PlanBuilder {
    PlanBuilder::new(intent, description)
}
