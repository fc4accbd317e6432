#![allow(dead_code)]

use keel_core::{
    models::VariableType,
    template::{self, StepSpec},
    Plan, PlanStore, PlanStoreBuilder,
};
use tempfile::TempDir;

/// Helper function to create a test store
pub async fn create_test_store() -> (TempDir, PlanStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let store = PlanStoreBuilder::new()
        .with_database_path(&db_path)
        .build()
        .await
        .expect("Failed to create store");
    (temp_dir, store)
}

/// The three-step test-fixing template used across integration tests.
pub fn fix_tests_plan(tenant: &str) -> Plan {
    let mut plan = template::build("code.fix_tests", "Find and analyze failing tests")
        .required_variable("repo_path", VariableType::FilePath, "Repository root")
        .step(StepSpec::new("code", "git_status").input("path", "{{repo_path}}"))
        .step(StepSpec::new("code", "run_tests").input("path", "{{repo_path}}"))
        .step(
            StepSpec::new("code", "analyze_failures")
                .input("path", "{{repo_path}}")
                .depends_on([2]),
        )
        .build();
    plan.tenant = tenant.to_string();
    plan
}
