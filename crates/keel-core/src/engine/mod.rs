//! Execution engine: runs an instantiated plan step by step.
//!
//! One execution is strictly sequential. Steps run in ascending id order and
//! the first failure halts the plan:
//!
//! ```text
//!            ┌──────────── step ok ────────────┐
//!            ▼                                 │
//! running ──▶ check depends ──▶ run under timeout ──▶ completed (all steps ok)
//!                 │                  │
//!                 └── unmet ──┐      ├── error / timeout / success:false
//!                             ▼      ▼
//!                              failed ◀── cancelled
//! ```
//!
//! The execution record is persisted at start, after every step and at the
//! end. Persistence is best-effort: failures are logged and the run goes on
//! in memory. Once finished, the outcome is handed to the
//! [`PatternLearner`](crate::learner::PatternLearner).

use std::{
    collections::{BTreeMap, HashSet},
    time::Instant,
};

use tokio_util::sync::CancellationToken;

use crate::{
    config::EngineConfig,
    learner::{PatternLearner, CANCELLED_ERROR},
    models::{Execution, Plan, Step, StepId, StepResult},
    store::PlanStore,
};

pub mod subagent;


pub use subagent::{StepRequest, Subagent, SubagentOutput, SubagentRegistry};

/// An instantiated plan ready to run, with its provenance.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub tenant: String,
    /// Instantiated copy of the stored template
    pub plan: Plan,
    /// Id of the stored template the plan came from
    pub plan_id: u64,
    pub pattern_id: Option<u64>,
    /// Resolved variable values
    pub variables: BTreeMap<String, String>,
}

enum StepOutcome {
    Finished(StepResult),
    Cancelled(StepResult),
}

/// Sequential, dependency-checked plan executor.
#[derive(Debug, Clone)]
pub struct ExecutionEngine {
    registry: SubagentRegistry,
    store: PlanStore,
    learner: PatternLearner,
    config: EngineConfig,
}

impl ExecutionEngine {
    pub fn new(registry: SubagentRegistry, store: PlanStore, config: EngineConfig) -> Self {
        let learner = PatternLearner::new(store.clone(), &config);
        Self {
            registry,
            store,
            learner,
            config,
        }
    }

    pub fn registry(&self) -> &SubagentRegistry {
        &self.registry
    }

    pub fn learner(&self) -> &PatternLearner {
        &self.learner
    }

    /// Runs every step of `request.plan` and returns the finished execution.
    ///
    /// Never fails: step errors, timeouts, missing subagents and cancellation
    /// all end up in the returned execution as a `failed` status.
    pub async fn execute(&self, request: ExecutionRequest, cancel: &CancellationToken) -> Execution {
        let ExecutionRequest {
            tenant,
            plan,
            plan_id,
            pattern_id,
            variables,
        } = request;

        let mut execution = Execution::start(tenant, plan_id, pattern_id, variables);
        match self.store.create_execution(&execution).await {
            Ok(id) => execution.id = Some(id),
            Err(e) => log::warn!("Failed to persist execution for plan {plan_id}: {e}"),
        }
        log::info!(
            "Executing plan {plan_id} ({}) with {} steps",
            plan.intent,
            plan.steps.len()
        );

        let mut completed: HashSet<StepId> = HashSet::new();
        for step in &plan.steps {
            if cancel.is_cancelled() {
                execution.fail(CANCELLED_ERROR);
                break;
            }

            if let Some(missing) = step.depends.iter().find(|id| !completed.contains(*id)) {
                execution.fail(format!(
                    "step {} ({}) depends on step {missing}, which has not completed",
                    step.id,
                    step.qualified_action()
                ));
                break;
            }

            match self.run_step(step, &execution, cancel).await {
                StepOutcome::Finished(result) => {
                    let failure = (!result.success).then(|| {
                        format!(
                            "step {} ({}) failed: {}",
                            step.id,
                            step.qualified_action(),
                            result.error
                        )
                    });
                    execution.record(result);
                    match failure {
                        Some(error) => {
                            execution.fail(error);
                            break;
                        }
                        None => {
                            completed.insert(step.id);
                            self.persist(&execution).await;
                        }
                    }
                }
                StepOutcome::Cancelled(result) => {
                    execution.record(result);
                    execution.fail(CANCELLED_ERROR);
                    break;
                }
            }
        }

        if !execution.status.is_terminal() {
            execution.complete();
        }
        self.persist(&execution).await;

        match &execution.error {
            Some(error) => log::info!("Plan {plan_id} failed: {error}"),
            None => log::info!(
                "Plan {plan_id} completed: {} steps, {} tokens",
                execution.steps_completed,
                execution.total_tokens
            ),
        }

        if let Err(e) = self.learner.observe(&execution).await {
            log::warn!("Failed to record outcome for plan {plan_id}: {e}");
        }

        execution
    }

    async fn run_step(
        &self,
        step: &Step,
        execution: &Execution,
        cancel: &CancellationToken,
    ) -> StepOutcome {
        let started = Instant::now();

        let Some(subagent) = self.registry.get(&step.subagent) else {
            return StepOutcome::Finished(StepResult::failure(
                step.id,
                format!("subagent '{}' not found", step.subagent),
                started.elapsed(),
            ));
        };

        let request = StepRequest {
            tenant: execution.tenant.clone(),
            execution_id: execution.id,
            step: step.clone(),
            variables: execution.variables.clone(),
            dependencies: step
                .depends
                .iter()
                .filter_map(|id| execution.result_for(*id).cloned())
                .collect(),
        };
        let timeout = self.config.step_timeout(step.timeout);
        let step_cancel = cancel.child_token();
        log::debug!("Running step {} ({})", step.id, step.qualified_action());

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                StepOutcome::Cancelled(StepResult::failure(step.id, CANCELLED_ERROR, started.elapsed()))
            }
            outcome = tokio::time::timeout(timeout, subagent.execute(request, step_cancel.clone())) => {
                let result = match outcome {
                    Ok(Ok(output)) => output.into_step_result(step.id, started.elapsed()),
                    Ok(Err(e)) => StepResult::failure(step.id, e.to_string(), started.elapsed()),
                    Err(_) => StepResult::failure(
                        step.id,
                        format!("timed out after {timeout:?}"),
                        started.elapsed(),
                    ),
                };
                StepOutcome::Finished(result)
            }
        };
        step_cancel.cancel();
        outcome
    }

    async fn persist(&self, execution: &Execution) {
        if execution.id.is_none() {
            return;
        }
        if let Err(e) = self.store.update_execution(execution).await {
            log::warn!("Failed to persist execution snapshot: {e}");
        }
    }
}
