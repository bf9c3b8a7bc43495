//! Errors shared by the schema and notes editors.

use crate::repo::dataset_repo::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EditorResult<T> = Result<T, EditorError>;

/// Editor-level failure. Every variant leaves the dataset unchanged.
#[derive(Debug)]
pub enum EditorError {
    /// Schema name is blank after trimming.
    MissingSchemaName,
    /// Schema draft has no field rows with a name.
    NoFields,
    /// An action needing a selected schema ran without one.
    NoSchemaSelected,
    /// An action needing a selected note ran without one.
    NoNoteSelected,
    /// Selected schema id is not in the dataset.
    SchemaNotFound(String),
    /// Selected note id is not in the dataset.
    NoteNotFound(String),
    /// Selected note belongs to a schema other than the selected one.
    SchemaMismatch { note_id: String, schema_id: String },
    /// Persistence failure.
    Store(StoreError),
}

impl EditorError {
    /// Short message suitable for showing to the user as-is.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingSchemaName => "Schema name is required.".to_string(),
            Self::NoFields => "Schema must have at least one field.".to_string(),
            Self::NoSchemaSelected => "No schema is selected.".to_string(),
            Self::NoNoteSelected => "No note is selected.".to_string(),
            Self::SchemaNotFound(_) => "Selected schema not found.".to_string(),
            Self::NoteNotFound(_) => "Selected note not found.".to_string(),
            Self::SchemaMismatch { .. } => {
                "Selected note does not belong to the selected schema.".to_string()
            }
            Self::Store(err) => format!("Could not save changes: {err}"),
        }
    }
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSchemaName => write!(f, "schema name is required"),
            Self::NoFields => write!(f, "schema must have at least one field"),
            Self::NoSchemaSelected => write!(f, "no schema selected"),
            Self::NoNoteSelected => write!(f, "no note selected"),
            Self::SchemaNotFound(id) => write!(f, "schema not found: {id}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::SchemaMismatch { note_id, schema_id } => {
                write!(f, "note {note_id} does not belong to schema {schema_id}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for EditorError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
