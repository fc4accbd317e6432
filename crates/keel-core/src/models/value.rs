//! Loosely-typed step input values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A step input value.
///
/// Plans are authored by hand or generated by a model, so step inputs are
/// loosely typed. The union is serialized untagged: a plan on disk is plain
/// JSON. Whole numbers that fit an `i64` deserialize as [`Value::Integer`] and
/// keep their exact value; everything else numeric is a [`Value::Number`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit JSON null
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a copy with every `{{name}}` placeholder in its strings
    /// replaced by `values[name]`, recursing through lists and maps. Map keys
    /// are left alone, as are placeholders with no entry in `values`.
    ///
    /// Each string is scanned once, left to right. Replacement text is never
    /// scanned again, so a value that itself looks like a placeholder stays
    /// literal.
    pub fn substitute(&self, values: &BTreeMap<String, String>) -> Value {
        match self {
            Value::String(s) => Value::String(substitute_str(s, values)),
            Value::List(items) => Value::List(items.iter().map(|v| v.substitute(values)).collect()),
            Value::Map(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.substitute(values)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Whether `token` occurs in any string nested inside this value.
    pub fn contains(&self, token: &str) -> bool {
        match self {
            Value::String(s) => s.contains(token),
            Value::List(items) => items.iter().any(|v| v.contains(token)),
            Value::Map(map) => map.values().any(|v| v.contains(token)),
            _ => false,
        }
    }
}

fn substitute_str(text: &str, values: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let inner = &rest[start + 2..];
        let Some(end) = inner.find("}}") else {
            rest = &rest[start..];
            break;
        };
        match values.get(&inner[..end]) {
            Some(value) => {
                out.push_str(value);
                rest = &inner[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = inner;
            }
        }
    }
    out.push_str(rest);
    out
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Integer(n) => serde_json::Value::Number(n.into()),
            Value::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}
