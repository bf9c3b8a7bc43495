//! Note schema (template) model.

use crate::model::field::FieldDefinition;
use crate::model::id::{generate_id, SCHEMA_ID_PREFIX};
use crate::model::value::lossy_string;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const UNNAMED_SCHEMA_LABEL: &str = "(no name)";

/// Named, ordered collection of fields used as a template for notes.
///
/// `fields` may be empty while a schema is being edited; the schema editor
/// refuses to save it that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSchema {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl NoteSchema {
    /// Builds a schema with a caller-provided id. The name is trimmed.
    pub fn new(id: impl Into<String>, name: impl AsRef<str>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            id: id.into(),
            name: name.as_ref().trim().to_string(),
            fields,
        }
    }

    /// Builds a schema with a freshly generated `schema-` id.
    pub fn create(name: impl AsRef<str>, fields: Vec<FieldDefinition>) -> Self {
        Self::new(generate_id(SCHEMA_ID_PREFIX), name, fields)
    }

    /// Reads one stored schema object member by member.
    ///
    /// A non-array `fields` becomes empty; non-object field entries are skipped.
    pub fn from_object_lossy(mut object: Map<String, Value>) -> Self {
        let id = lossy_string(object.remove("id"));
        let name = lossy_string(object.remove("name"));
        let fields = match object.remove("fields") {
            Some(Value::Array(entries)) => {
                let total = entries.len();
                let fields = entries
                    .into_iter()
                    .filter_map(FieldDefinition::from_value_lossy)
                    .collect::<Vec<_>>();
                if fields.len() < total {
                    warn!(
                        "event=dataset_coerce module=model status=recovered key=fields skipped={}",
                        total - fields.len()
                    );
                }
                fields
            }
            _ => Vec::new(),
        };
        Self::new(id, name, fields)
    }

    /// Looks up a field by exact name.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Name for lists and selectors; blank names render as `(no name)`.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            UNNAMED_SCHEMA_LABEL
        } else {
            self.name.as_str()
        }
    }
}
