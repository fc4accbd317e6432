//! Classified request intent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What the user wants, as produced by an upstream classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Intent {
    pub category: String,
    pub subcategory: String,

    /// Values extracted from the request, keyed by variable name
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl Intent {
    pub fn new(category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
            variables: BTreeMap::new(),
        }
    }

    /// Adds an extracted variable value.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// The plan lookup key, `category.subcategory`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.category, self.subcategory)
    }
}
