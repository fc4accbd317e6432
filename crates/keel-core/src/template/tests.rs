//! Tests for the template engine.

use std::collections::BTreeMap;

use super::*;
use crate::{
    error::KeelError,
    models::{Plan, Step, Value, VariableType},
};

fn fix_tests_template() -> Plan {
    build("code.fix_tests", "Find and analyze failing tests")
        .required_variable("repo_path", VariableType::FilePath, "Repository root")
        .optional_variable("runner", VariableType::String, "cargo test")
        .step(StepSpec::new("code", "git_status").input("path", "{{repo_path}}"))
        .step(
            StepSpec::new("code", "run_tests")
                .input("path", "{{repo_path}}")
                .input("command", "{{runner}} --workspace"),
        )
        .step(
            StepSpec::new("code", "analyze_failures")
                .input(
                    "context",
                    Value::List(vec![Value::from("{{repo_path}}/target"), Value::Bool(true)]),
                )
                .depends_on([2])
                .with_timeout(60),
        )
        .build()
}

fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn assert_invalid(plan: &Plan, field_fragment: &str) {
    match validate(plan) {
        Err(KeelError::InvalidPlan { field, .. }) => assert!(
            field.contains(field_fragment),
            "expected field containing '{field_fragment}', got '{field}'"
        ),
        other => panic!("expected InvalidPlan, got {other:?}"),
    }
}

#[test]
fn test_builder_assigns_sequential_ids_and_default_timeout() {
    let plan = fix_tests_template();

    let ids: Vec<u32> = plan.steps.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(plan.steps[0].timeout, 120);
    assert_eq!(plan.steps[2].timeout, 60);
    assert!(plan.id.is_none());
}

#[test]
fn test_builder_does_not_validate() {
    let plan = build("", "").build();
    assert!(plan.steps.is_empty());
    assert!(validate(&plan).is_err());
}

#[test]
fn test_validate_accepts_well_formed_plan() {
    let diagnostics = validate(&fix_tests_template()).expect("plan should be valid");
    assert!(diagnostics.is_empty());
}

#[test]
fn test_validate_rule_order() {
    let mut plan = fix_tests_template();
    plan.intent = " ".to_string();
    plan.description.clear();
    // Intent is checked before description.
    assert_invalid(&plan, "intent");

    let mut plan = fix_tests_template();
    plan.description.clear();
    assert_invalid(&plan, "description");

    let mut plan = fix_tests_template();
    plan.steps.clear();
    assert_invalid(&plan, "steps");

    let mut plan = fix_tests_template();
    plan.steps[1].subagent.clear();
    assert_invalid(&plan, "steps[1].subagent");

    let mut plan = fix_tests_template();
    plan.steps[2].action.clear();
    assert_invalid(&plan, "steps[2].action");
}

#[test]
fn test_validate_rejects_non_contiguous_ids() {
    let mut plan = fix_tests_template();
    plan.steps[1].id = 5;
    assert_invalid(&plan, "steps[1].id");

    let mut plan = fix_tests_template();
    plan.steps[2].id = 2;
    plan.steps[2].depends.clear();
    assert_invalid(&plan, "steps[2].id");
}

#[test]
fn test_validate_rejects_forward_and_self_dependencies() {
    let mut plan = fix_tests_template();
    plan.steps[1].depends = vec![3];
    assert_invalid(&plan, "step 2.depends");

    let mut plan = fix_tests_template();
    plan.steps[0].depends = vec![1];
    assert_invalid(&plan, "step 1.depends");

    let mut plan = fix_tests_template();
    plan.steps[2].depends = vec![0];
    assert_invalid(&plan, "step 3.depends");
}

#[test]
fn test_validated_dependencies_are_lower_ids() {
    let plan = fix_tests_template();
    validate(&plan).expect("plan should be valid");
    for step in &plan.steps {
        assert!(step.depends.iter().all(|&d| d >= 1 && d < step.id));
    }
}

#[test]
fn test_validate_rejects_duplicate_variables() {
    let mut plan = fix_tests_template();
    let duplicate = plan.variables[0].clone();
    plan.variables.push(duplicate);
    assert_invalid(&plan, "variables");
}

#[test]
fn test_validate_reports_unused_variables() {
    let mut plan = fix_tests_template();
    plan.variables
        .push(crate::models::Variable::new("branch", VariableType::String));

    let diagnostics = validate(&plan).expect("unused variables are not fatal");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.unused_variables(), vec!["branch"]);
    assert_eq!(
        diagnostics.iter().next().map(ToString::to_string),
        Some("variable 'branch' is declared but never used".to_string())
    );
}

#[test]
fn test_instantiate_replaces_every_placeholder() {
    let template = fix_tests_template();
    let plan = instantiate(&template, &values(&[("repo_path", "/tmp/repo")]))
        .expect("instantiation should succeed");

    for step in &plan.steps {
        for value in step.input.values() {
            assert!(!value.contains("{{repo_path}}"), "unreplaced in step {}", step.id);
        }
    }
    assert_eq!(
        plan.steps[0].input.get("path"),
        Some(&Value::from("/tmp/repo"))
    );
    // Defaults fill in optional variables.
    assert_eq!(
        plan.steps[1].input.get("command"),
        Some(&Value::from("cargo test --workspace"))
    );
    assert_eq!(
        plan.steps[2].input.get("context"),
        Some(&Value::List(vec![Value::from("/tmp/repo/target"), Value::Bool(true)]))
    );
    // The template itself is untouched.
    assert!(template.steps[0].input["path"].contains("{{repo_path}}"));
}

#[test]
fn test_instantiate_missing_required_variable_fails() {
    let template = fix_tests_template();
    match instantiate(&template, &BTreeMap::new()) {
        Err(KeelError::MissingVariable { name }) => assert_eq!(name, "repo_path"),
        other => panic!("expected MissingVariable, got {other:?}"),
    }
}

#[test]
fn test_instantiate_leaves_unknown_placeholders() {
    let mut template = fix_tests_template();
    template.steps[0]
        .input
        .insert("note".to_string(), Value::from("see {{ticket}}"));

    let plan = instantiate(&template, &values(&[("repo_path", "/r")])).unwrap();
    assert_eq!(plan.steps[0].input["note"], Value::from("see {{ticket}}"));
}

#[test]
fn test_instantiate_does_not_expand_placeholders_inside_values() {
    let template = fix_tests_template();
    let plan = instantiate(
        &template,
        &values(&[("repo_path", "{{runner}}"), ("runner", "rm -rf /")]),
    )
    .unwrap();

    assert_eq!(plan.steps[0].input["path"], Value::from("{{runner}}"));
    assert_eq!(
        plan.steps[1].input["command"],
        Value::from("rm -rf / --workspace")
    );
}

#[test]
fn test_instantiate_clears_identity() {
    let mut template = fix_tests_template();
    template.id = Some(42);
    template.created_at = Some(jiff::Timestamp::now());
    template.updated_at = template.created_at;

    let plan = instantiate(&template, &values(&[("repo_path", "/r")])).unwrap();
    assert!(plan.id.is_none());
    assert!(plan.created_at.is_none());
    assert!(plan.updated_at.is_none());
}

#[test]
fn test_instantiate_is_idempotent() {
    let template = fix_tests_template();
    let supplied = values(&[("repo_path", "/tmp/repo"), ("runner", "nextest")]);

    let first = instantiate(&template, &supplied).unwrap();
    let second = instantiate(&template, &supplied).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_resolve_variables_prefers_supplied_values() {
    let template = fix_tests_template();
    let resolved = resolve_variables(&template, &values(&[("runner", "nextest")]));
    assert_eq!(resolved.get("runner").map(String::as_str), Some("nextest"));
    assert!(!resolved.contains_key("repo_path"));
}

#[test]
fn test_estimate_cost_scales_with_input() {
    let mut plan = Plan::new("x.y", "estimate");
    plan.steps.push(Step::new(1, "code", "noop"));
    let base = estimate_cost(&plan);
    assert_eq!(base.steps, 1);
    assert_eq!(base.tokens, BASE_TOKENS_PER_STEP);
    assert!((base.cost - BASE_TOKENS_PER_STEP as f64 * PRICE_PER_TOKEN).abs() < 1e-12);

    plan.steps[0]
        .input
        .insert("body".to_string(), Value::from("a".repeat(400)));
    plan.steps[0]
        .input
        .insert("retries".to_string(), Value::Integer(3));
    let bigger = estimate_cost(&plan);
    assert_eq!(bigger.tokens, BASE_TOKENS_PER_STEP + 100);
}
