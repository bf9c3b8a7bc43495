//! Dataset: the single persisted unit holding every schema and note.
//!
//! # Responsibility
//! - Coerce arbitrary JSON documents into a well-formed dataset.
//! - Own cross-entity operations (cascade delete, orphan detection).
//!
//! # Invariants
//! - Missing or non-array `schemas`/`notes` become empty sequences.
//! - Only non-object array elements are dropped (and logged); members of
//!   object elements are coerced to safe defaults, never rejected.
//! - Removing a schema removes every note whose `schema_id` matches it.

use crate::model::note::Note;
use crate::model::schema::NoteSchema;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Complete collection of schemas and notes, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub schemas: Vec<NoteSchema>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// Result of a cascading schema removal.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedSchema {
    pub schema: NoteSchema,
    pub removed_notes: usize,
}

impl Dataset {
    pub fn new(schemas: Vec<NoteSchema>, notes: Vec<Note>) -> Self {
        Self { schemas, notes }
    }

    /// Builds a dataset from any JSON value, coercing shape deviations.
    ///
    /// Non-object documents produce an empty dataset.
    pub fn from_value_lossy(value: Value) -> Self {
        let Value::Object(mut object) = value else {
            warn!("event=dataset_coerce module=model status=recovered reason=not_an_object");
            return Self::default();
        };

        Self {
            schemas: take_array(&mut object, "schemas", NoteSchema::from_object_lossy),
            notes: take_array(&mut object, "notes", Note::from_object_lossy),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.notes.is_empty()
    }

    pub fn schema(&self, id: &str) -> Option<&NoteSchema> {
        self.schemas.iter().find(|schema| schema.id == id)
    }

    pub fn schema_mut(&mut self, id: &str) -> Option<&mut NoteSchema> {
        self.schemas.iter_mut().find(|schema| schema.id == id)
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn note_mut(&mut self, id: &str) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id == id)
    }

    /// Notes belonging to `schema_id`, in stored order.
    pub fn notes_for_schema<'a>(&'a self, schema_id: &'a str) -> impl Iterator<Item = &'a Note> {
        self.notes
            .iter()
            .filter(move |note| note.schema_id == schema_id)
    }

    /// Removes a schema and every note that references it.
    ///
    /// Returns `None` (and changes nothing) when no schema has `id`.
    pub fn remove_schema_cascade(&mut self, id: &str) -> Option<RemovedSchema> {
        let index = self.schemas.iter().position(|schema| schema.id == id)?;
        let schema = self.schemas.remove(index);
        let before = self.notes.len();
        self.notes.retain(|note| note.schema_id != id);
        Some(RemovedSchema {
            schema,
            removed_notes: before - self.notes.len(),
        })
    }

    /// Removes one note by id.
    pub fn remove_note(&mut self, id: &str) -> Option<Note> {
        let index = self.notes.iter().position(|note| note.id == id)?;
        Some(self.notes.remove(index))
    }

    /// Notes whose `schema_id` matches no schema.
    pub fn orphaned_notes(&self) -> Vec<&Note> {
        let known = self
            .schemas
            .iter()
            .map(|schema| schema.id.as_str())
            .collect::<BTreeSet<_>>();
        self.notes
            .iter()
            .filter(|note| !known.contains(note.schema_id.as_str()))
            .collect()
    }
}

fn take_array<T>(
    object: &mut Map<String, Value>,
    key: &'static str,
    read: impl Fn(Map<String, Value>) -> T,
) -> Vec<T> {
    let items = match object.remove(key) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!(
                "event=dataset_coerce module=model status=recovered key={} reason=not_an_array kind={}",
                key,
                json_kind(&other)
            );
            return Vec::new();
        }
        None => return Vec::new(),
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            Value::Object(element) => Some(read(element)),
            other => {
                warn!(
                    "event=dataset_coerce module=model status=recovered key={} index={} reason=not_an_object kind={}",
                    key,
                    index,
                    json_kind(&other)
                );
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
