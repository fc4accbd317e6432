//! The language-model boundary used for plan generation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Text produced by a model call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    #[serde(default)]
    pub tokens_used: u64,
}

impl Generation {
    pub fn new(text: impl Into<String>, tokens_used: u64) -> Self {
        Self {
            text: text.into(),
            tokens_used,
        }
    }
}

/// A model client able to turn a prompt into text.
///
/// With `want_json` set the caller expects a single JSON document; the reply
/// may still be wrapped in prose or code fences.
#[async_trait]
pub trait Model: Send + Sync {
    async fn generate(&self, prompt: &str, want_json: bool) -> Result<Generation>;
}
