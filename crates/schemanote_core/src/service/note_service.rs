//! Notes editor use-cases.
//!
//! # Responsibility
//! - Track the notes screen selection (`NotesView`) and keep it valid when
//!   schemas change elsewhere.
//! - Build note forms from schema field types and coerce submitted input.
//! - Create, update, delete and filter notes through `AppState`.
//!
//! # Invariants
//! - Saved notes hold a value for every schema field, typed by its declaration.
//! - New notes are only created for schemas present in the dataset.
//! - A note is only edited through the schema it belongs to.
//! - Listing never mutates state.

use crate::model::dataset::Dataset;
use crate::model::field::{FieldType, InputKind};
use crate::model::note::{Note, NoteValues};
use crate::model::schema::NoteSchema;
use crate::model::value::FieldValue;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::editor_error::{EditorError, EditorResult};
use crate::service::schema_service::SchemaSummary;
use crate::state::{AppState, ChangeKind, DataChange, SubscriptionId};
use log::info;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Raw form input keyed by field name.
pub type RawValues = BTreeMap<String, String>;

/// Note list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSummary {
    pub id: String,
    pub title: String,
    pub field_count: usize,
}

/// Current value of one form control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    Checked(bool),
}

impl FormValue {
    /// Raw input string as submitted by the form.
    pub fn as_raw(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Checked(checked) => checked.to_string(),
        }
    }
}

/// One labelled control of the note form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFormField {
    pub name: String,
    pub field_type: FieldType,
    pub input: InputKind,
    pub value: FormValue,
}

/// Note form generated from a schema, optionally filled from a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteForm {
    pub schema_id: String,
    pub note_id: Option<String>,
    pub fields: Vec<NoteFormField>,
}

impl NoteForm {
    /// Overwrites the raw input of field `name`. Returns `false` if absent.
    pub fn set(&mut self, name: &str, raw: &str) -> bool {
        let Some(field) = self.fields.iter_mut().find(|field| field.name == name) else {
            return false;
        };
        field.value = match field.input {
            InputKind::Checkbox => match FieldValue::coerce(FieldType::Boolean, raw) {
                FieldValue::Bool(checked) => FormValue::Checked(checked),
                _ => FormValue::Checked(false),
            },
            _ => FormValue::Text(raw.to_string()),
        };
        true
    }

    /// Form contents as submitted raw values.
    pub fn raw_values(&self) -> RawValues {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.value.as_raw()))
            .collect()
    }
}

/// Selection state of the notes screen.
///
/// Subscribes to schema changes and lazily re-resolves its selection on
/// the next `refresh`.
pub struct NotesView {
    schema_id: Option<String>,
    note_id: Option<String>,
    schemas_stale: Rc<Cell<bool>>,
    subscription: SubscriptionId,
}

impl NotesView {
    /// Subscribes to `state` and selects the first schema, if any.
    pub fn attach<S: KeyValueStore>(state: &mut AppState<S>) -> Self {
        let schemas_stale = Rc::new(Cell::new(false));
        let flag = Rc::clone(&schemas_stale);
        let subscription = state.subscribe(move |change: &DataChange| {
            if change.kind.affects_schemas() {
                flag.set(true);
            }
        });

        Self {
            schema_id: first_schema_id(state.dataset()),
            note_id: None,
            schemas_stale,
            subscription,
        }
    }

    /// Drops the subscription.
    pub fn detach<S: KeyValueStore>(self, state: &mut AppState<S>) -> bool {
        state.unsubscribe(self.subscription)
    }

    pub fn schema_id(&self) -> Option<&str> {
        self.schema_id.as_deref()
    }

    pub fn note_id(&self) -> Option<&str> {
        self.note_id.as_deref()
    }

    /// Whether a schema change arrived since the last refresh.
    pub fn is_stale(&self) -> bool {
        self.schemas_stale.get()
    }

    /// Re-validates the selection against the current dataset.
    ///
    /// Keeps the selected schema while it exists, otherwise falls back to
    /// the first schema. A selected note that vanished is cleared.
    pub fn refresh(&mut self, dataset: &Dataset) {
        self.schemas_stale.set(false);
        let still_present = self
            .schema_id
            .as_deref()
            .is_some_and(|id| dataset.schema(id).is_some());
        if !still_present {
            self.schema_id = first_schema_id(dataset);
            self.note_id = None;
        }
        if self
            .note_id
            .as_deref()
            .is_some_and(|id| dataset.note(id).is_none())
        {
            self.note_id = None;
        }
    }

    /// Switches schema and starts a new (unselected) note.
    ///
    /// Returns `false` and selects nothing when `id` is unknown.
    pub fn select_schema(&mut self, dataset: &Dataset, id: &str) -> bool {
        self.note_id = None;
        if dataset.schema(id).is_some() {
            self.schema_id = Some(id.to_string());
            true
        } else {
            self.schema_id = None;
            false
        }
    }

    pub fn select_note(&mut self, id: impl Into<String>) {
        self.note_id = Some(id.into());
    }

    /// Clears the note selection (the "new note" state).
    pub fn start_new_note(&mut self) {
        self.note_id = None;
    }
}

/// Notes editor facade over application state.
pub struct NoteService<'a, S: KeyValueStore> {
    state: &'a mut AppState<S>,
}

impl<'a, S: KeyValueStore> NoteService<'a, S> {
    pub fn new(state: &'a mut AppState<S>) -> Self {
        Self { state }
    }

    /// Schemas available in the selector.
    pub fn schema_options(&self) -> Vec<SchemaSummary> {
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

    /// Schema the notes screen opens on: the first one, if any.
    pub fn default_schema(&self) -> Option<&NoteSchema> {
        self.state.dataset().schemas.first()
    }

    pub fn get(&self, note_id: &str) -> Option<&Note> {
        self.state.dataset().note(note_id)
    }

    /// Notes of `schema_id` whose values contain `query` (case-insensitive).
    pub fn list(&self, schema_id: Option<&str>, query: &str) -> EditorResult<Vec<NoteSummary>> {
        let schema_id = schema_id.ok_or(EditorError::NoSchemaSelected)?;
        Ok(self
            .state
            .dataset()
            .notes_for_schema(schema_id)
            .filter(|note| note.matches(query))
            .map(|note| NoteSummary {
                id: note.id.clone(),
                title: note.title(),
                field_count: note.values.len(),
            })
            .collect())
    }

    /// Builds the form for `schema_id`, filled from `note_id` when given.
    pub fn form(&self, schema_id: Option<&str>, note_id: Option<&str>) -> EditorResult<NoteForm> {
        let dataset = self.state.dataset();
        let schema = resolve_schema(dataset, schema_id)?;
        let note = match note_id {
            Some(id) => {
                let note = dataset
                    .note(id)
                    .ok_or_else(|| EditorError::NoteNotFound(id.to_string()))?;
                ensure_same_schema(note, &schema.id)?;
                Some(note)
            }
            None => None,
        };

        let fields = schema
            .fields
            .iter()
            .map(|field| {
                let input = field.field_type.input_kind();
                let stored = note.and_then(|note| note.values.get(&field.name));
                let value = match input {
                    InputKind::Checkbox => {
                        FormValue::Checked(stored.is_some_and(FieldValue::is_truthy))
                    }
                    _ => FormValue::Text(stored.map(FieldValue::to_form_text).unwrap_or_default()),
                };
                NoteFormField {
                    name: field.name.clone(),
                    field_type: field.field_type,
                    input,
                    value,
                }
            })
            .collect();

        Ok(NoteForm {
            schema_id: schema.id.clone(),
            note_id: note.map(|note| note.id.clone()),
            fields,
        })
    }

    /// Creates a note (no `note_id`) or replaces the values of one.
    ///
    /// Values are taken for every schema field, coerced by field type;
    /// input naming no schema field is ignored.
    pub fn save(
        &mut self,
        schema_id: Option<&str>,
        note_id: Option<&str>,
        raw: &RawValues,
    ) -> EditorResult<Note> {
        let values = coerce_values(resolve_schema(self.state.dataset(), schema_id)?, raw);
        let schema_id = schema_id.unwrap_or_default();

        let saved = self.state.update(
            ChangeKind::NotesChanged,
            |dataset| -> EditorResult<Note> {
                match note_id {
                    Some(id) => {
                        let note = dataset
                            .note_mut(id)
                            .ok_or_else(|| EditorError::NoteNotFound(id.to_string()))?;
                        ensure_same_schema(note, schema_id)?;
                        note.values = values;
                        Ok(note.clone())
                    }
                    None => {
                        let note = Note::create(schema_id, values);
                        dataset.notes.push(note.clone());
                        Ok(note)
                    }
                }
            },
        )?;

        info!(
            "event=note_save module=service status=ok mode={} values={}",
            if note_id.is_some() { "update" } else { "create" },
            saved.values.len()
        );
        Ok(saved)
    }

    /// Deletes the selected note.
    pub fn delete(&mut self, note_id: Option<&str>) -> EditorResult<Note> {
        let id = note_id.ok_or(EditorError::NoNoteSelected)?;
        let removed = self.state.update(ChangeKind::NotesChanged, |dataset| {
            dataset
                .remove_note(id)
                .ok_or_else(|| EditorError::NoteNotFound(id.to_string()))
        })?;
        info!("event=note_delete module=service status=ok");
        Ok(removed)
    }
}

fn ensure_same_schema(note: &Note, schema_id: &str) -> EditorResult<()> {
    if note.schema_id == schema_id {
        return Ok(());
    }
    Err(EditorError::SchemaMismatch {
        note_id: note.id.clone(),
        schema_id: schema_id.to_string(),
    })
}

fn first_schema_id(dataset: &Dataset) -> Option<String> {
    dataset.schemas.first().map(|schema| schema.id.clone())
}

fn resolve_schema<'d>(dataset: &'d Dataset, schema_id: Option<&str>) -> EditorResult<&'d NoteSchema> {
    let id = schema_id.ok_or(EditorError::NoSchemaSelected)?;
    dataset
        .schema(id)
        .ok_or_else(|| EditorError::SchemaNotFound(id.to_string()))
}

fn coerce_values(schema: &NoteSchema, raw: &RawValues) -> NoteValues {
    schema
        .fields
        .iter()
        .map(|field| {
            let value = raw
                .get(&field.name)
                .map(|input| FieldValue::coerce(field.field_type, input))
                .unwrap_or_else(|| FieldValue::empty(field.field_type));
            (field.name.clone(), value)
        })
        .collect()
}
