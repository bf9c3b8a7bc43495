//! Schema editor use-cases.
//!
//! # Responsibility
//! - Turn form drafts (name + dynamic field rows) into schemas.
//! - Create, update and cascade-delete schemas through `AppState`.
//!
//! # Invariants
//! - A saved schema has a non-blank name and at least one named field.
//! - Field rows with blank names are skipped, not rejected.
//! - Deleting a schema deletes all of its notes in the same commit.

use crate::model::field::{FieldDefinition, FieldType};
use crate::model::schema::NoteSchema;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::editor_error::{EditorError, EditorResult};
use crate::state::{AppState, ChangeKind};
use log::info;

/// One editable field row in the schema form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldRow {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    /// Parses `name:type` row input.
    ///
    /// The text after the last colon is a type only when it names one;
    /// otherwise the whole input is the name of a `text` field.
    pub fn parse(input: &str) -> Self {
        input
            .rsplit_once(':')
            .and_then(|(name, field_type)| {
                FieldType::parse(field_type.trim()).map(|field_type| Self::new(name, field_type))
            })
            .unwrap_or_else(|| Self::new(input, FieldType::Text))
    }
}

/// Schema form contents before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaDraft {
    pub name: String,
    pub rows: Vec<FieldRow>,
}

impl SchemaDraft {
    /// Empty form with a single blank `text` row.
    pub fn new_blank() -> Self {
        Self {
            name: String::new(),
            rows: vec![FieldRow::new("", FieldType::Text)],
        }
    }

    /// Form pre-filled from an existing schema.
    pub fn from_schema(schema: &NoteSchema) -> Self {
        Self {
            name: schema.name.clone(),
            rows: schema
                .fields
                .iter()
                .map(|field| FieldRow::new(field.name.clone(), field.field_type))
                .collect(),
        }
    }

    pub fn add_row(&mut self, name: impl Into<String>, field_type: FieldType) {
        self.rows.push(FieldRow::new(name, field_type));
    }

    pub fn remove_row(&mut self, index: usize) -> Option<FieldRow> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    /// Field definitions from rows whose trimmed name is non-empty.
    pub fn fields(&self) -> Vec<FieldDefinition> {
        self.rows
            .iter()
            .filter(|row| !row.name.trim().is_empty())
            .map(|row| FieldDefinition::typed(&row.name, row.field_type))
            .collect()
    }
}

/// Schema list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSummary {
    pub id: String,
    pub name: String,
    pub field_count: usize,
}

/// Schema editor facade over application state.
pub struct SchemaService<'a, S: KeyValueStore> {
    state: &'a mut AppState<S>,
}

impl<'a, S: KeyValueStore> SchemaService<'a, S> {
    pub fn new(state: &'a mut AppState<S>) -> Self {
        Self { state }
    }

    /// Lists schemas in stored order.
    pub fn list(&self) -> Vec<SchemaSummary> {
        self.state
            .dataset()
            .schemas
            .iter()
            .map(|schema| SchemaSummary {
                id: schema.id.clone(),
                name: schema.display_name().to_string(),
                field_count: schema.field_count(),
            })
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&NoteSchema> {
        self.state.dataset().schema(id)
    }

    /// Creates a schema (no selection) or updates the selected one.
    ///
    /// # Errors
    /// - `MissingSchemaName` / `NoFields` on invalid drafts.
    /// - `SchemaNotFound` when `selected` names a vanished schema.
    pub fn save(&mut self, selected: Option<&str>, draft: &SchemaDraft) -> EditorResult<NoteSchema> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(EditorError::MissingSchemaName);
        }
        let fields = draft.fields();
        if fields.is_empty() {
            return Err(EditorError::NoFields);
        }

        let saved = self.state.update(
            ChangeKind::SchemasChanged,
            |dataset| -> EditorResult<NoteSchema> {
                match selected {
                    Some(id) => {
                        let schema = dataset
                            .schema_mut(id)
                            .ok_or_else(|| EditorError::SchemaNotFound(id.to_string()))?;
                        schema.name = name.to_string();
                        schema.fields = fields;
                        Ok(schema.clone())
                    }
                    None => {
                        let schema = NoteSchema::create(name, fields);
                        dataset.schemas.push(schema.clone());
                        Ok(schema)
                    }
                }
            },
        )?;

        info!(
            "event=schema_save module=service status=ok mode={} fields={}",
            if selected.is_some() { "update" } else { "create" },
            saved.field_count()
        );
        Ok(saved)
    }

    /// Deletes the selected schema and its notes.
    ///
    /// Returns the number of notes removed by the cascade.
    pub fn delete(&mut self, selected: Option<&str>) -> EditorResult<usize> {
        let id = selected.ok_or(EditorError::NoSchemaSelected)?;
        let removed = self.state.update(ChangeKind::SchemasChanged, |dataset| {
            dataset
                .remove_schema_cascade(id)
                .ok_or_else(|| EditorError::SchemaNotFound(id.to_string()))
        })?;

        info!(
            "event=schema_delete module=service status=ok removed_notes={}",
            removed.removed_notes
        );
        Ok(removed.removed_notes)
    }
}
