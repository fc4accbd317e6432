//! Tests for the plan store.

use std::collections::BTreeMap;

use futures::future::join_all;
use tempfile::TempDir;

use super::*;
use crate::{
    error::KeelError,
    models::{Execution, ExecutionStatus, Plan, StepResult, VariableType},
    template::{self, StepSpec},
};

/// Helper function to create a test store
async fn create_test_store() -> (TempDir, PlanStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let store = PlanStoreBuilder::new()
        .with_database_path(&db_path)
        .build()
        .await
        .expect("Failed to create store");
    (temp_dir, store)
}

fn sample_plan(tenant: &str, intent: &str, description: &str) -> Plan {
    let mut plan = template::build(intent, description)
        .required_variable("repo_path", VariableType::FilePath, "Repository root")
        .step(StepSpec::new("code", "run_tests").input("path", "{{repo_path}}"))
        .step(StepSpec::new("code", "analyze_failures").depends_on([1]))
        .build();
    plan.tenant = tenant.to_string();
    plan
}

#[tokio::test]
async fn test_store_plan_assigns_identity_and_zeroed_pattern() {
    let (_temp_dir, store) = create_test_store().await;

    let (plan, pattern) = store
        .store_plan(&sample_plan("acme", "code.fix_tests", "Fix tests"))
        .await
        .expect("Failed to store plan");

    let id = plan.id.expect("stored plan should have an id");
    assert!(plan.active);
    assert!(plan.created_at.is_some());
    assert_eq!(plan.created_at, plan.updated_at);

    assert_eq!(pattern.plan_id, id);
    assert_eq!(pattern.intent, "code.fix_tests");
    assert_eq!(pattern.usage_count, 0);
    assert_eq!(pattern.success_rate, 0.0);

    let fetched = store.get_plan("acme", id).await.expect("Failed to get plan");
    assert_eq!(fetched.steps, plan.steps);
    assert_eq!(fetched.variables, plan.variables);
}

#[tokio::test]
async fn test_store_plan_rejects_invalid_plans() {
    let (_temp_dir, store) = create_test_store().await;

    let mut plan = sample_plan("acme", "code.fix_tests", "Fix tests");
    plan.steps[1].depends = vec![2];
    let err = store.store_plan(&plan).await.unwrap_err();
    assert!(err.is_validation());

    let plan = sample_plan("", "code.fix_tests", "Fix tests");
    let err = store.store_plan(&plan).await.unwrap_err();
    assert!(matches!(err, KeelError::InvalidInput { ref field, .. } if field == "tenant"));

    assert!(store.list_plans("acme").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_import_plan_reports_warnings_from_its_validation() {
    let (_temp_dir, store) = create_test_store().await;
    let document = r#"{
        "intent": "code.lint",
        "description": "Lint the repository",
        "variables": [
            {"name": "repo_path", "type": "file_path", "required": true},
            {"name": "style", "type": "string", "default": "strict"}
        ],
        "steps": [{"id": 1, "subagent": "code", "action": "lint", "input": {"path": "{{repo_path}}"}}]
    }"#;

    let result = store
        .import_plan(
            "acme",
            &crate::params::ImportPlan {
                document: document.to_string(),
            },
        )
        .await
        .expect("Failed to import plan");

    assert_eq!(result.diagnostics.unused_variables(), vec!["style"]);
    assert_eq!(result.plan.tenant, "acme");
    assert_eq!(result.pattern.plan_id, result.plan.id.unwrap());
    assert_eq!(store.list_plans("acme").await.unwrap().len(), 1);

    let err = store
        .import_plan(
            "acme",
            &crate::params::ImportPlan {
                document: document.replace(r#""id": 1"#, r#""id": 2"#),
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(store.list_plans("acme").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_by_intent_returns_latest_active_plan() {
    let (_temp_dir, store) = create_test_store().await;

    let err = store
        .get_by_intent("acme", "code.fix_tests")
        .await
        .unwrap_err();
    assert!(matches!(err, KeelError::NoPlanForIntent { .. }));

    store
        .store_plan(&sample_plan("acme", "code.fix_tests", "First"))
        .await
        .unwrap();
    let (second, _) = store
        .store_plan(&sample_plan("acme", "code.fix_tests", "Second"))
        .await
        .unwrap();

    let found = store.get_by_intent("acme", "code.fix_tests").await.unwrap();
    assert_eq!(found.id, second.id);
    assert_eq!(found.description, "Second");

    // Tenants are isolated.
    let err = store
        .get_by_intent("globex", "code.fix_tests")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_update_plan_overwrites_and_bumps_updated_at() {
    let (_temp_dir, store) = create_test_store().await;

    let (mut plan, _) = store
        .store_plan(&sample_plan("acme", "code.fix_tests", "Fix tests"))
        .await
        .unwrap();

    plan.description = "Fix tests, then lint".to_string();
    plan.steps
        .push(crate::models::Step::new(3, "code", "lint"));
    let updated = store.update_plan(&plan).await.expect("Failed to update plan");

    assert_eq!(updated.description, "Fix tests, then lint");
    assert_eq!(updated.steps.len(), 3);
    assert_eq!(updated.created_at, plan.created_at);
    assert!(updated.updated_at >= plan.updated_at);
}

#[tokio::test]
async fn test_soft_delete_hides_plan_but_keeps_it_readable() {
    let (_temp_dir, store) = create_test_store().await;

    let (plan, _) = store
        .store_plan(&sample_plan("acme", "code.fix_tests", "Fix tests"))
        .await
        .unwrap();
    let id = plan.id.unwrap();

    store.delete_plan("acme", id).await.expect("Failed to delete plan");

    assert!(store.list_plans("acme").await.unwrap().is_empty());
    assert!(store
        .get_by_intent("acme", "code.fix_tests")
        .await
        .unwrap_err()
        .is_not_found());

    let archived = store.get_plan("acme", id).await.unwrap();
    assert!(!archived.active);

    // Deleting twice and updating a deleted plan both report not found.
    assert!(matches!(
        store.delete_plan("acme", id).await,
        Err(KeelError::PlanNotFound { .. })
    ));
    assert!(matches!(
        store.update_plan(&archived).await,
        Err(KeelError::PlanNotFound { .. })
    ));
}

#[tokio::test]
async fn test_best_pattern_requires_success_and_active_plan() {
    let (_temp_dir, store) = create_test_store().await;

    let (plan_a, pattern_a) = store
        .store_plan(&sample_plan("acme", "code.fix_tests", "A"))
        .await
        .unwrap();
    let (_plan_b, pattern_b) = store
        .store_plan(&sample_plan("acme", "code.fix_tests", "B"))
        .await
        .unwrap();

    // No successes yet.
    assert!(store
        .get_best_pattern("acme", "code.fix_tests")
        .await
        .unwrap_err()
        .is_not_found());

    store.record_failure("acme", pattern_b.id).await.unwrap();
    assert!(store
        .get_best_pattern("acme", "code.fix_tests")
        .await
        .is_err());

    store.record_success("acme", pattern_a.id).await.unwrap();
    store.record_success("acme", pattern_b.id).await.unwrap();

    // A: 1/1, B: 1/2
    let best = store.get_best_pattern("acme", "code.fix_tests").await.unwrap();
    assert_eq!(best.id, pattern_a.id);

    store.delete_plan("acme", plan_a.id.unwrap()).await.unwrap();
    let best = store.get_best_pattern("acme", "code.fix_tests").await.unwrap();
    assert_eq!(best.id, pattern_b.id);
}

#[tokio::test]
async fn test_best_pattern_breaks_ties_on_usage_count() {
    let (_temp_dir, store) = create_test_store().await;

    let (_, pattern_a) = store
        .store_plan(&sample_plan("acme", "code.fix_tests", "A"))
        .await
        .unwrap();
    let (_, pattern_b) = store
        .store_plan(&sample_plan("acme", "code.fix_tests", "B"))
        .await
        .unwrap();

    store.record_success("acme", pattern_a.id).await.unwrap();
    store.record_success("acme", pattern_b.id).await.unwrap();
    store.record_success("acme", pattern_b.id).await.unwrap();

    let best = store.get_best_pattern("acme", "code.fix_tests").await.unwrap();
    assert_eq!(best.id, pattern_b.id);
    assert_eq!(best.usage_count, 2);
}

#[tokio::test]
async fn test_promotion_after_repeated_success() {
    let (_temp_dir, store) = create_test_store().await;

    let (_, pattern) = store
        .store_plan(&sample_plan("acme", "code.fix_tests", "Fix tests"))
        .await
        .unwrap();

    for _ in 0..4 {
        store.record_success("acme", pattern.id).await.unwrap();
    }
    let after = store.record_failure("acme", pattern.id).await.unwrap();

    assert_eq!(after.usage_count, 5);
    assert_eq!(after.success_count, 4);
    assert_eq!(after.failure_count, 1);
    assert!((after.success_rate - 0.8).abs() < f64::EPSILON);
    assert!(after.last_failed.is_some());
    assert!(after.last_succeeded.is_some());
    assert!(after.is_reusable(crate::models::REUSE_THRESHOLD));

    let best = store.get_best_pattern("acme", "code.fix_tests").await.unwrap();
    assert_eq!(best, after);
}

#[tokio::test]
async fn test_concurrent_pattern_updates_are_not_lost() {
    let (_temp_dir, store) = create_test_store().await;

    let (_, pattern) = store
        .store_plan(&sample_plan("acme", "code.fix_tests", "Fix tests"))
        .await
        .unwrap();

    let updates = (0..16).map(|i| {
        let store = store.clone();
        async move {
            if i % 4 == 0 {
                store.record_failure("acme", pattern.id).await
            } else {
                store.record_success("acme", pattern.id).await
            }
        }
    });
    for result in join_all(updates).await {
        result.expect("Failed to record outcome");
    }

    let pattern = store.get_pattern("acme", pattern.id).await.unwrap();
    assert_eq!(pattern.usage_count, 16);
    assert_eq!(pattern.success_count, 12);
    assert_eq!(pattern.failure_count, 4);
    assert!((pattern.success_rate - 0.75).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_record_outcome_for_unknown_pattern() {
    let (_temp_dir, store) = create_test_store().await;

    let err = store.record_success("acme", 42).await.unwrap_err();
    assert!(matches!(err, KeelError::PatternNotFound { .. }));
}

#[tokio::test]
async fn test_execution_lifecycle_and_history() {
    let (_temp_dir, store) = create_test_store().await;

    let (plan, pattern) = store
        .store_plan(&sample_plan("acme", "code.fix_tests", "Fix tests"))
        .await
        .unwrap();
    let plan_id = plan.id.unwrap();

    let mut variables = BTreeMap::new();
    variables.insert("repo_path".to_string(), "/repo".to_string());

    let mut ids = Vec::new();
    for _ in 0..3 {
        let execution = Execution::start("acme", plan_id, Some(pattern.id), variables.clone());
        ids.push(store.create_execution(&execution).await.unwrap());
    }

    let mut last = store.get_execution("acme", ids[2]).await.unwrap();
    assert_eq!(last.status, ExecutionStatus::Running);
    assert_eq!(last.variables, variables);

    let mut result = StepResult::failure(1, "", std::time::Duration::from_millis(5));
    result.success = true;
    result.tokens_used = 200;
    result.cost = 0.002;
    result.data = serde_json::json!({"passed": 10});
    last.record(result);
    last.complete();
    store.update_execution(&last).await.unwrap();

    let reloaded = store.get_execution("acme", ids[2]).await.unwrap();
    assert_eq!(reloaded.status, ExecutionStatus::Completed);
    assert_eq!(reloaded.total_tokens, 200);
    assert_eq!(reloaded.steps_completed, 1);
    assert_eq!(reloaded.results[0].data["passed"], 10);
    assert!(reloaded.completed_at.is_some());

    let history = store
        .get_execution_history("acme", plan_id, 2)
        .await
        .unwrap();
    let history_ids: Vec<u64> = history.iter().filter_map(|e| e.id).collect();
    assert_eq!(history_ids, vec![ids[2], ids[1]]);

    assert!(matches!(
        store.get_execution("globex", ids[0]).await,
        Err(KeelError::ExecutionNotFound { .. })
    ));
}

#[tokio::test]
async fn test_update_unknown_execution() {
    let (_temp_dir, store) = create_test_store().await;

    let mut execution = Execution::start("acme", 1, None, BTreeMap::new());
    execution.id = Some(99);
    assert!(matches!(
        store.update_execution(&execution).await,
        Err(KeelError::ExecutionNotFound { id: 99 })
    ));
}
