//! Request orchestration: choose a plan for an intent, run it, report back.
//!
//! Plan selection falls through three tiers:
//!
//! 1. **Pattern**: the best pattern for the intent, if its success rate
//!    clears the reuse threshold and its plan is still active.
//! 2. **Library**: the most recently updated active plan for the intent.
//! 3. **Generated**: a new plan from the [`Model`], validated and stored
//!    together with a fresh pattern.
//!
//! Selection holds a per-(tenant, intent) lock, so concurrent requests for a
//! new intent generate exactly one plan. Execution runs outside the lock.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use keel_core::{
//!     engine::SubagentRegistry,
//!     orchestrator::{Generation, Model, Orchestrator},
//!     EngineConfig, Intent, PlanStoreBuilder, Result,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! struct Offline;
//!
//! #[async_trait::async_trait]
//! impl Model for Offline {
//!     async fn generate(&self, _prompt: &str, _want_json: bool) -> Result<Generation> {
//!         Ok(Generation::new(r#"{"description": "noop", "steps": [{"id": 1, "subagent": "echo", "action": "say"}]}"#, 0))
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let store = PlanStoreBuilder::new().build().await?;
//! let orchestrator = Orchestrator::new(
//!     store,
//!     SubagentRegistry::new(),
//!     Arc::new(Offline),
//!     EngineConfig::default(),
//! );
//!
//! let intent = Intent::new("chat", "greet");
//! let response = orchestrator
//!     .process("acme", &intent, "say hello", &CancellationToken::new())
//!     .await?;
//! println!("{} via {}", response.message, response.tier);
//! # Ok(())
//! # }
//! ```

use std::{
    collections::HashMap,
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
    config::EngineConfig,
    engine::{ExecutionEngine, ExecutionRequest, SubagentRegistry},
    error::{KeelError, Result},
    models::{Execution, ExecutionStatus, Intent, Plan},
    store::PlanStore,
    template,
};

pub mod model;
pub mod prompt;


pub use model::{Generation, Model};

/// Which lookup strategy supplied the plan for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Pattern,
    Library,
    Generated,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Pattern => "pattern",
            Tier::Library => "library",
            Tier::Generated => "generated",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of processing one request.
#[derive(Debug, Clone)]
pub struct Response {
    pub intent: Intent,
    /// User-facing summary of the execution
    pub message: String,
    pub execution: Execution,
    /// Wall time spent on selection and execution
    pub duration: Duration,
    pub tier: Tier,
}

struct Selection {
    plan: Plan,
    plan_id: u64,
    pattern_id: Option<u64>,
    tier: Tier,
}

/// Entry point tying the store, engine and model together.
pub struct Orchestrator {
    store: PlanStore,
    engine: ExecutionEngine,
    model: Arc<dyn Model>,
    config: EngineConfig,
    intent_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Orchestrator {
    pub fn new(
        store: PlanStore,
        registry: SubagentRegistry,
        model: Arc<dyn Model>,
        config: EngineConfig,
    ) -> Self {
        let engine = ExecutionEngine::new(registry, store.clone(), config.clone());
        Self {
            store,
            engine,
            model,
            config,
            intent_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &PlanStore {
        &self.store
    }

    pub fn engine(&self) -> &ExecutionEngine {
        &self.engine
    }

    /// Selects, instantiates and executes a plan for `intent`.
    ///
    /// Errors cover selection and instantiation only (storage failures,
    /// unusable generated plans, missing required variables). Step failures
    /// come back as a `failed` execution inside an `Ok` response.
    pub async fn process(
        &self,
        tenant: &str,
        intent: &Intent,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<Response> {
        let started = Instant::now();
        if tenant.trim().is_empty() {
            return Err(KeelError::invalid_input("tenant", "tenant must not be empty"));
        }

        let selection = self.select_plan(tenant, &intent.key(), message).await?;
        log::info!(
            "Selected plan {} for '{}' from {}",
            selection.plan_id,
            intent.key(),
            selection.tier
        );

        let variables = template::resolve_variables(&selection.plan, &intent.variables);
        let plan = template::instantiate(&selection.plan, &intent.variables)?;
        let estimate = template::estimate_cost_at(&plan, self.config.price_per_token);
        log::debug!(
            "Estimated {} tokens (${:.4}) for plan {}",
            estimate.tokens,
            estimate.cost,
            selection.plan_id
        );

        let execution = self
            .engine
            .execute(
                ExecutionRequest {
                    tenant: tenant.to_string(),
                    plan: plan.clone(),
                    plan_id: selection.plan_id,
                    pattern_id: selection.pattern_id,
                    variables,
                },
                cancel,
            )
            .await;

        Ok(Response {
            intent: intent.clone(),
            message: summarize(&plan, &execution),
            execution,
            duration: started.elapsed(),
            tier: selection.tier,
        })
    }

    async fn intent_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.intent_locks.lock().await;
        locks.entry(key.to_string()).or_default().clone()
    }

    /// Drops the lock entry for `key` once no request holds or waits on it.
    ///
    /// Clones are only handed out under the map lock, so a count of one here
    /// means the map owns the last reference.
    async fn release_intent_lock(&self, key: &str) {
        let mut locks = self.intent_locks.lock().await;
        if locks.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(key);
        }
    }

    async fn select_plan(&self, tenant: &str, intent: &str, message: &str) -> Result<Selection> {
        let key = format!("{tenant}\u{1f}{intent}");
        let lock = self.intent_lock(&key).await;
        let selection = {
            let _guard = lock.lock().await;
            self.select_plan_locked(tenant, intent, message).await
        };
        drop(lock);
        self.release_intent_lock(&key).await;
        selection
    }

    async fn select_plan_locked(
        &self,
        tenant: &str,
        intent: &str,
        message: &str,
    ) -> Result<Selection> {
        if let Some(selection) = self.from_pattern(tenant, intent).await? {
            return Ok(selection);
        }
        if let Some(selection) = self.from_library(tenant, intent).await? {
            return Ok(selection);
        }
        self.generate(tenant, intent, message).await
    }

    async fn from_pattern(&self, tenant: &str, intent: &str) -> Result<Option<Selection>> {
        let pattern = match self.store.get_best_pattern(tenant, intent).await {
            Ok(pattern) => pattern,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        if !self.engine.learner().is_reusable(&pattern) {
            log::debug!(
                "Pattern {} below reuse threshold ({:.2})",
                pattern.id,
                pattern.success_rate
            );
            return Ok(None);
        }

        match self.store.get_plan(tenant, pattern.plan_id).await {
            Ok(plan) if plan.active => Ok(Some(Selection {
                plan,
                plan_id: pattern.plan_id,
                pattern_id: Some(pattern.id),
                tier: Tier::Pattern,
            })),
            Ok(_) => Ok(None),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn from_library(&self, tenant: &str, intent: &str) -> Result<Option<Selection>> {
        let plan = match self.store.get_by_intent(tenant, intent).await {
            Ok(plan) => plan,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        let plan_id = stored_id(&plan)?;

        let pattern_id = match self.store.get_pattern_for_plan(tenant, plan_id).await {
            Ok(pattern) => Some(pattern.id),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        Ok(Some(Selection {
            plan,
            plan_id,
            pattern_id,
            tier: Tier::Library,
        }))
    }

    async fn generate(&self, tenant: &str, intent: &str, message: &str) -> Result<Selection> {
        let registry = self.engine.registry();
        let request = prompt::plan_prompt(intent, message, &registry.names());
        let generation = self.model.generate(&request, true).await?;
        log::debug!(
            "Model generated a plan for '{intent}' using {} tokens",
            generation.tokens_used
        );

        let mut plan = prompt::parse_plan(&generation.text, intent)?;
        plan.tenant = tenant.to_string();

        let (plan, pattern) = self.store.store_plan(&plan).await?;
        let plan_id = stored_id(&plan)?;
        Ok(Selection {
            plan,
            plan_id,
            pattern_id: Some(pattern.id),
            tier: Tier::Generated,
        })
    }
}

fn stored_id(plan: &Plan) -> Result<u64> {
    plan.id
        .ok_or_else(|| KeelError::invalid_input("id", "stored plan is missing its id"))
}

/// Builds the user-facing message for a finished execution.
///
/// Failures name the failing step and its error; successes concatenate the
/// data of every step.
pub fn summarize(plan: &Plan, execution: &Execution) -> String {
    if execution.status != ExecutionStatus::Completed {
        return match execution.failed_result().and_then(|r| plan.step(r.step_id).map(|s| (r, s))) {
            Some((result, step)) => format!(
                "Step {} ({}) failed: {}",
                step.id,
                step.qualified_action(),
                result.error
            ),
            None => format!(
                "Plan failed: {}",
                execution.error.as_deref().unwrap_or("unknown error")
            ),
        };
    }

    execution
        .results
        .iter()
        .filter_map(|result| match &result.data {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) if text.is_empty() => None,
            serde_json::Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
