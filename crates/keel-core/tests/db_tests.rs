use keel_core::{
    models::{Execution, ExecutionStatus, Outcome, Plan, Step},
    Database, KeelError,
};
use tempfile::NamedTempFile;

/// Helper function to create a temporary database for testing
fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

fn plan(tenant: &str, intent: &str) -> Plan {
    let mut plan = Plan::new(intent, "Test plan");
    plan.tenant = tenant.to_string();
    plan.steps.push(Step::new(1, "shell", "run"));
    plan
}

#[test]
fn test_database_initialization_is_idempotent() {
    let (temp_file, mut db) = create_test_db();
    let (stored, _) = db.insert_plan(&plan("acme", "ops.deploy")).unwrap();
    let mut execution = Execution::start("acme", stored.id.unwrap(), None, Default::default());
    let execution_id = db.insert_execution(&execution).unwrap();
    execution.id = Some(execution_id);
    execution.fail("step 1 (shell.run) failed: exit 1");
    db.update_execution(&execution).unwrap();
    drop(db);

    // Reopening runs the schema again and must keep existing rows intact.
    let reopened = Database::new(temp_file.path()).expect("Failed to reopen database");
    let fetched = reopened.get_plan("acme", stored.id.unwrap()).unwrap();
    assert_eq!(fetched.map(|p| p.intent), Some("ops.deploy".to_string()));
    let fetched = reopened.get_execution("acme", execution_id).unwrap().unwrap();
    assert_eq!(fetched.error.as_deref(), Some("step 1 (shell.run) failed: exit 1"));
}

#[test]
fn test_insert_and_get_plan() {
    let (_temp_file, mut db) = create_test_db();

    let (stored, pattern) = db.insert_plan(&plan("acme", "ops.deploy")).unwrap();
    let id = stored.id.unwrap();
    assert!(id > 0);
    assert_eq!(pattern.plan_id, id);

    let fetched = db.get_plan("acme", id).unwrap().expect("plan should exist");
    assert_eq!(fetched.intent, "ops.deploy");
    assert_eq!(fetched.steps, stored.steps);
    assert_eq!(fetched.created_at, stored.created_at);

    assert!(db.get_plan("globex", id).unwrap().is_none());
}

#[test]
fn test_find_plan_by_intent_prefers_latest() {
    let (_temp_file, mut db) = create_test_db();

    let (first, _) = db.insert_plan(&plan("acme", "ops.deploy")).unwrap();
    let (second, _) = db.insert_plan(&plan("acme", "ops.deploy")).unwrap();
    db.insert_plan(&plan("acme", "ops.rollback")).unwrap();

    let found = db.find_plan_by_intent("acme", "ops.deploy").unwrap().unwrap();
    assert_eq!(found.id, second.id);

    // Updating the older plan makes it the most recent.
    let mut older = first.clone();
    older.description = "Revised".to_string();
    db.update_plan(&older).unwrap();
    let found = db.find_plan_by_intent("acme", "ops.deploy").unwrap().unwrap();
    assert_eq!(found.id, first.id);
}

#[test]
fn test_list_plans_excludes_deactivated() {
    let (_temp_file, mut db) = create_test_db();

    let (a, _) = db.insert_plan(&plan("acme", "ops.deploy")).unwrap();
    db.insert_plan(&plan("acme", "ops.rollback")).unwrap();
    db.deactivate_plan("acme", a.id.unwrap()).unwrap();

    let plans = db.list_plans("acme").unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].intent, "ops.rollback");

    let err = db.deactivate_plan("acme", a.id.unwrap()).unwrap_err();
    assert!(matches!(err, KeelError::PlanNotFound { .. }));
}

#[test]
fn test_update_plan_requires_id() {
    let (_temp_file, mut db) = create_test_db();

    let err = db.update_plan(&plan("acme", "ops.deploy")).unwrap_err();
    assert!(matches!(err, KeelError::InvalidInput { .. }));
}

#[test]
fn test_record_pattern_outcome() {
    let (_temp_file, mut db) = create_test_db();

    let (_, pattern) = db.insert_plan(&plan("acme", "ops.deploy")).unwrap();
    db.record_pattern_outcome("acme", pattern.id, Outcome::Success)
        .unwrap();
    let updated = db
        .record_pattern_outcome("acme", pattern.id, Outcome::Failure)
        .unwrap();

    assert_eq!(updated.usage_count, 2);
    assert_eq!(updated.success_rate, 0.5);

    let stored = db.get_pattern("acme", pattern.id).unwrap().unwrap();
    assert_eq!(stored, updated);

    let err = db
        .record_pattern_outcome("globex", pattern.id, Outcome::Success)
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_list_patterns_grouped_by_intent() {
    let (_temp_file, mut db) = create_test_db();

    db.insert_plan(&plan("acme", "ops.rollback")).unwrap();
    db.insert_plan(&plan("acme", "ops.deploy")).unwrap();
    db.insert_plan(&plan("globex", "ops.deploy")).unwrap();

    let patterns = db.list_patterns("acme").unwrap();
    let intents: Vec<&str> = patterns.iter().map(|p| p.intent.as_str()).collect();
    assert_eq!(intents, vec!["ops.deploy", "ops.rollback"]);
}

#[test]
fn test_execution_roundtrip() {
    let (_temp_file, mut db) = create_test_db();

    let (stored, pattern) = db.insert_plan(&plan("acme", "ops.deploy")).unwrap();
    let mut execution = Execution::start("acme", stored.id.unwrap(), Some(pattern.id), Default::default());
    let id = db.insert_execution(&execution).unwrap();
    execution.id = Some(id);

    execution.fail("step 1 (shell.run) failed: exit 1");
    db.update_execution(&execution).unwrap();

    let fetched = db.get_execution("acme", id).unwrap().unwrap();
    assert_eq!(fetched.status, ExecutionStatus::Failed);
    assert_eq!(fetched.error.as_deref(), Some("step 1 (shell.run) failed: exit 1"));
    assert_eq!(fetched.pattern_id, Some(pattern.id));
    assert_eq!(
        fetched.started_at.as_microsecond(),
        execution.started_at.as_microsecond()
    );

    let history = db.execution_history("acme", stored.id.unwrap(), 10).unwrap();
    assert_eq!(history.len(), 1);
}
