use schemanote_core::db::open_db;
use schemanote_core::{
    DataStore, Dataset, FieldDefinition, FieldValue, KeyValueStore, MemoryKeyValueStore, Note,
    NoteSchema, NoteValues, SqliteKeyValueStore, StoreError, STORAGE_KEY,
};
use serde_json::json;

fn book_dataset() -> Dataset {
    let mut values = NoteValues::new();
    values.insert("Title".to_string(), FieldValue::from("Dune"));
    Dataset::new(
        vec![NoteSchema::new(
            "s1",
            "Book",
            vec![FieldDefinition::new("Title", "text")],
        )],
        vec![Note::new("n1", "s1", values)],
    )
}

fn rich_dataset() -> Dataset {
    let mut values = NoteValues::new();
    values.insert("Title".to_string(), FieldValue::from("Dune"));
    values.insert("Pages".to_string(), FieldValue::from(412_i64));
    values.insert(
        "Rating".to_string(),
        FieldValue::Number(serde_json::Number::from_f64(4.5).unwrap()),
    );
    values.insert("Read".to_string(), FieldValue::from(true));
    values.insert("Finished".to_string(), FieldValue::from("2024-03-01"));
    Dataset::new(
        vec![
            NoteSchema::new(
                "s1",
                "Book",
                vec![
                    FieldDefinition::new("Title", "text"),
                    FieldDefinition::new("Pages", "number"),
                    FieldDefinition::new("Rating", "number"),
                    FieldDefinition::new("Read", "boolean"),
                    FieldDefinition::new("Finished", "date"),
                ],
            ),
            NoteSchema::new("s2", "Empty", Vec::new()),
        ],
        vec![
            Note::new("n1", "s1", values),
            Note::new("n2", "missing-schema", NoteValues::new()),
        ],
    )
}

#[test]
fn load_on_absent_storage_returns_empty_dataset() {
    let store = DataStore::new(MemoryKeyValueStore::new());
    let dataset = store.load().unwrap();
    assert!(dataset.schemas.is_empty());
    assert!(dataset.notes.is_empty());
}

#[test]
fn save_then_load_round_trips() {
    let mut store = DataStore::new(MemoryKeyValueStore::new());
    let original = rich_dataset();
    store.save(&original).unwrap();
    assert_eq!(store.load().unwrap(), original);
}

#[test]
fn export_clear_import_reproduces_dataset() {
    let mut store = DataStore::new(MemoryKeyValueStore::new());
    let original = rich_dataset();
    store.save(&original).unwrap();

    let exported = store.export_json().unwrap();
    store.clear().unwrap();
    assert!(store.load().unwrap().is_empty());

    store.import_json(&exported).unwrap();
    assert_eq!(store.load().unwrap(), original);
}

#[test]
fn book_scenario_survives_export_clear_import() {
    let mut store = DataStore::new(MemoryKeyValueStore::new());
    store.save(&book_dataset()).unwrap();

    let exported = store.export_json().unwrap();
    store.clear().unwrap();
    store.import_json(&exported).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded, book_dataset());
    assert_eq!(
        serde_json::to_value(&loaded).unwrap(),
        json!({
            "schemas": [
                { "id": "s1", "name": "Book", "fields": [ { "name": "Title", "type": "text" } ] }
            ],
            "notes": [
                { "id": "n1", "schemaId": "s1", "values": { "Title": "Dune" } }
            ]
        })
    );
}

#[test]
fn export_is_pretty_printed() {
    let mut store = DataStore::new(MemoryKeyValueStore::new());
    store.save(&book_dataset()).unwrap();
    let exported = store.export_json().unwrap();
    assert!(exported.contains('\n'));
    assert!(exported.contains("\n  \"schemas\""));
}

#[test]
fn invalid_import_fails_and_leaves_storage_untouched() {
    let mut store = DataStore::new(MemoryKeyValueStore::new());
    store.save(&book_dataset()).unwrap();
    let before = store.backend().get_item(STORAGE_KEY).unwrap();

    let err = store.import_json("not json").unwrap_err();
    assert!(matches!(err, StoreError::InvalidJson(_)));
    assert_eq!(store.backend().get_item(STORAGE_KEY).unwrap(), before);
    assert_eq!(store.load().unwrap(), book_dataset());
}

#[test]
fn malformed_stored_content_loads_as_empty() {
    let mut backend = MemoryKeyValueStore::new();
    backend.set_item(STORAGE_KEY, "{ broken").unwrap();
    let store = DataStore::new(backend);
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn import_coerces_missing_and_wrong_shaped_arrays() {
    let mut store = DataStore::new(MemoryKeyValueStore::new());
    let imported = store
        .import_json(r#"{ "schemas": { "not": "an array" } }"#)
        .unwrap();
    assert!(imported.is_empty());

    let raw = store.backend().get_item(STORAGE_KEY).unwrap().unwrap();
    assert_eq!(raw, r#"{"schemas":[],"notes":[]}"#);
}

#[test]
fn import_falls_back_to_text_for_unknown_field_types() {
    let mut store = DataStore::new(MemoryKeyValueStore::new());
    store
        .import_json(
            r#"{ "schemas": [ { "id": "s1", "name": "X", "fields": [ { "name": "Mood", "type": "emoji" } ] } ], "notes": [] }"#,
        )
        .unwrap();
    let loaded = store.load().unwrap();
    assert_eq!(loaded.schemas[0].fields[0], FieldDefinition::new("Mood", "text"));
}

#[test]
fn sqlite_backend_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.sqlite3");

    {
        let backend = SqliteKeyValueStore::try_new(open_db(&path).unwrap()).unwrap();
        let mut store = DataStore::new(backend);
        store.save(&rich_dataset()).unwrap();
    }

    let backend = SqliteKeyValueStore::try_new(open_db(&path).unwrap()).unwrap();
    let mut store = DataStore::new(backend);
    assert_eq!(store.load().unwrap(), rich_dataset());

    store.clear().unwrap();
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn import_keeps_entries_with_null_or_wrong_typed_members() {
    let mut store = DataStore::new(MemoryKeyValueStore::new());
    let imported = store
        .import_json(
            r#"{"schemas":[{"id":"s1","name":null,"fields":[{"name":"Title","type":"text"}]},{"id":"s2","name":"Film","fields":null}],"notes":[{"id":"n1","schemaId":"s1","values":null},{"id":"n2","schemaId":"s2","values":{"Title":"Alien"}}]}"#,
        )
        .unwrap();
    assert_eq!(imported.schemas.len(), 2);
    assert_eq!(imported.notes.len(), 2);

    let loaded = store.load().unwrap();
    assert_eq!(loaded, imported);
    assert_eq!(loaded.schemas[0].display_name(), "(no name)");
    assert!(loaded.schemas[1].fields.is_empty());
    assert!(loaded.notes[0].values.is_empty());
    assert!(loaded.orphaned_notes().is_empty());
}

#[test]
fn field_type_names_are_case_sensitive() {
    let mut store = DataStore::new(MemoryKeyValueStore::new());
    store
        .import_json(
            r#"{ "schemas": [ { "id": "s1", "name": "X", "fields": [ { "name": "Pages", "type": "Number" } ] } ], "notes": [] }"#,
        )
        .unwrap();
    let loaded = store.load().unwrap();
    assert_eq!(loaded.schemas[0].fields[0], FieldDefinition::new("Pages", "text"));
}
