//! Core domain logic for SchemaNote.
//!
//! User-defined schemas, notes that instantiate them, and the single JSON
//! dataset document that persists both in a local key/value store.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod state;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::dataset::{Dataset, RemovedSchema};
pub use model::field::{FieldDefinition, FieldType, InputKind, FIELD_TYPES};
pub use model::id::generate_id;
pub use model::note::{Note, NoteValues};
pub use model::schema::NoteSchema;
pub use model::value::FieldValue;
pub use repo::dataset_repo::{DataStore, StoreError, StoreResult, STORAGE_KEY};
pub use repo::kv_repo::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use service::editor_error::{EditorError, EditorResult};
pub use service::note_service::{
    FormValue, NoteForm, NoteFormField, NoteService, NoteSummary, NotesView, RawValues,
};
pub use service::schema_service::{FieldRow, SchemaDraft, SchemaService, SchemaSummary};
pub use state::{AppState, ChangeKind, DataChange, DataObserver, SubscriptionId};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
