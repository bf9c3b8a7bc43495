//! Field values stored inside notes.
//!
//! # Invariants
//! - Numbers keep their original `serde_json::Number` representation so an
//!   export/import cycle reproduces them exactly.
//! - Non-scalar JSON found in stored data is preserved verbatim.

use crate::model::field::FieldType;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Concrete value held by a note for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(Number),
    Text(String),
    /// Anything else found in stored data (`null`, arrays, objects).
    Raw(Value),
}

const TRUE_INPUTS: &[&str] = &["true", "1", "yes", "on", "checked"];

impl FieldValue {
    /// Converts raw form input into a value of the declared field type.
    ///
    /// Coercion never fails: number input that does not parse stays text.
    pub fn coerce(field_type: FieldType, raw: &str) -> Self {
        match field_type {
            FieldType::Boolean => {
                let normalized = raw.trim().to_ascii_lowercase();
                Self::Bool(TRUE_INPUTS.contains(&normalized.as_str()))
            }
            FieldType::Number => parse_number(raw.trim())
                .map(Self::Number)
                .unwrap_or_else(|| Self::Text(raw.to_string())),
            FieldType::Date | FieldType::Text => Self::Text(raw.to_string()),
        }
    }

    /// Empty value for a field with no input.
    pub fn empty(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Boolean => Self::Bool(false),
            _ => Self::Text(String::new()),
        }
    }

    /// Truthiness used for checkbox state and display fallbacks.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Number(value) => value.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
            Self::Text(value) => !value.is_empty(),
            Self::Raw(value) => !matches!(value, Value::Null | Value::Bool(false)),
        }
    }

    /// Text shown in a form input for this value.
    pub fn to_form_text(&self) -> String {
        match self {
            Self::Bool(value) => value.to_string(),
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value.clone(),
            Self::Raw(Value::Null) => String::new(),
            Self::Raw(value) => value.to_string(),
        }
    }

    /// String form used by substring search; falsy values search as empty.
    pub fn as_search_text(&self) -> String {
        if self.is_truthy() {
            self.to_form_text()
        } else {
            String::new()
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(value) => Self::Bool(value),
            Value::Number(value) => Self::Number(value),
            Value::String(value) => Self::Text(value),
            other => Self::Raw(other),
        }
    }
}

/// String form of a stored scalar member.
///
/// Missing and falsy members (`null`, `false`, `0`, `""`) become `""`;
/// arrays and objects have no string form and also become `""`.
pub(crate) fn lossy_string(value: Option<Value>) -> String {
    match value {
        Some(Value::String(value)) => value,
        Some(Value::Bool(true)) => "true".to_string(),
        Some(Value::Number(value)) if value.as_f64() != Some(0.0) => value.to_string(),
        _ => String::new(),
    }
}

fn parse_number(raw: &str) -> Option<Number> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Number::from(int));
    }
    raw.parse::<f64>().ok().and_then(Number::from_f64)
}
