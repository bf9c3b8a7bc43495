//! Field definitions and their value types.
//!
//! # Invariants
//! - `FieldDefinition::name` is trimmed when built through constructors.
//! - Deserializing any unknown `type` value (including non-strings) yields
//!   `FieldType::Text`, so stored data never fails on a bad type.

use crate::model::value::lossy_string;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Value type of one schema field.
///
/// Serialized lowercase (`text|number|date|boolean`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Value")]
pub enum FieldType {
    /// Free text. Also the fallback for unknown types.
    #[default]
    Text,
    /// Numeric value.
    Number,
    /// Calendar date, kept as text (`YYYY-MM-DD` from date inputs).
    Date,
    /// Yes/no flag rendered as a checkbox.
    Boolean,
}

/// All supported field types in display order.
pub const FIELD_TYPES: [FieldType; 4] = [
    FieldType::Text,
    FieldType::Number,
    FieldType::Date,
    FieldType::Boolean,
];

/// Form control used to edit a field of a given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Number,
    Date,
    Checkbox,
}

impl FieldType {
    /// Stable wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Boolean => "boolean",
        }
    }

    /// Exact wire name match; `"Number"` or `" date"` are not type names.
    pub fn parse(value: &str) -> Option<Self> {
        FIELD_TYPES.into_iter().find(|field_type| field_type.as_str() == value)
    }

    /// Parses a type name, falling back to `Text` for anything unknown.
    pub fn parse_lossy(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    /// Form control matching this type.
    pub fn input_kind(self) -> InputKind {
        match self {
            Self::Text => InputKind::Text,
            Self::Number => InputKind::Number,
            Self::Date => InputKind::Date,
            Self::Boolean => InputKind::Checkbox,
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Value> for FieldType {
    fn from(value: Value) -> Self {
        value.as_str().map_or(Self::Text, Self::parse_lossy)
    }
}

impl InputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Checkbox => "checkbox",
        }
    }
}

/// Named, typed slot inside a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(default)]
    pub name: String,
    /// Serialized as `type` to match the stored document layout.
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

impl FieldDefinition {
    /// Builds a field from raw form input.
    ///
    /// The name is trimmed and an unrecognized `field_type` becomes `text`.
    pub fn new(name: impl AsRef<str>, field_type: &str) -> Self {
        Self::typed(name, FieldType::parse_lossy(field_type))
    }

    /// Reads one stored field entry.
    ///
    /// Returns `None` for non-object entries; members of an object entry are
    /// coerced (`null` name becomes blank, unknown type becomes `text`).
    pub fn from_value_lossy(value: Value) -> Option<Self> {
        let Value::Object(mut object) = value else {
            return None;
        };
        let name = lossy_string(object.remove("name"));
        let field_type = object.remove("type").map(FieldType::from).unwrap_or_default();
        Some(Self::typed(name, field_type))
    }

    /// Builds a field with an already-resolved type.
    pub fn typed(name: impl AsRef<str>, field_type: FieldType) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            field_type,
        }
    }
}
