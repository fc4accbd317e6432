//! Template instantiation: placeholder substitution and required-variable
//! enforcement.

use std::collections::BTreeMap;

use crate::{
    error::{KeelError, Result},
    models::Plan,
};

/// Merges declared defaults into the caller's values.
///
/// Supplied values always win over defaults.
pub fn resolve_variables(
    template: &Plan,
    values: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut resolved = values.clone();
    for variable in &template.variables {
        if let Some(default) = &variable.default {
            resolved
                .entry(variable.name.clone())
                .or_insert_with(|| default.clone());
        }
    }
    resolved
}

/// Produces an executable copy of `template` with placeholders replaced.
///
/// The copy has no id or timestamps. Placeholders whose variable has neither a
/// supplied value nor a default are left as literal text; a *required*
/// variable without a value fails with [`KeelError::MissingVariable`].
pub fn instantiate(template: &Plan, values: &BTreeMap<String, String>) -> Result<Plan> {
    let resolved = resolve_variables(template, values);

    let mut plan = template.clone();
    plan.id = None;
    plan.created_at = None;
    plan.updated_at = None;

    for step in &mut plan.steps {
        step.input = step
            .input
            .iter()
            .map(|(name, value)| (name.clone(), value.substitute(&resolved)))
            .collect();
    }

    if let Some(missing) = template
        .variables
        .iter()
        .find(|v| v.required && !resolved.contains_key(&v.name))
    {
        return Err(KeelError::MissingVariable {
            name: missing.name.clone(),
        });
    }

    Ok(plan)
}
