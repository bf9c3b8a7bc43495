use schemanote_core::{
    AppState, ChangeKind, DataChange, DataStore, EditorError, FieldType, MemoryKeyValueStore,
    NoteService, RawValues, SchemaDraft, SchemaService,
};
use std::cell::RefCell;
use std::rc::Rc;

fn open_state() -> AppState<MemoryKeyValueStore> {
    AppState::open(DataStore::new(MemoryKeyValueStore::new())).unwrap()
}

fn book_draft() -> SchemaDraft {
    let mut draft = SchemaDraft::new_blank();
    draft.name = "  Book ".to_string();
    draft.add_row("Title", FieldType::Text);
    draft.add_row("Pages", FieldType::Number);
    draft
}

fn raw(pairs: &[(&str, &str)]) -> RawValues {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn create_schema_skips_blank_rows_and_persists() {
    let mut state = open_state();
    let created = SchemaService::new(&mut state).save(None, &book_draft()).unwrap();

    assert!(created.id.starts_with("schema-"));
    assert_eq!(created.name, "Book");
    assert_eq!(created.field_count(), 2);
    assert_eq!(state.store().load().unwrap().schemas, vec![created]);
}

#[test]
fn save_rejects_blank_name_and_empty_fields() {
    let mut state = open_state();
    let mut service = SchemaService::new(&mut state);

    let mut unnamed = book_draft();
    unnamed.name = "   ".to_string();
    assert!(matches!(
        service.save(None, &unnamed),
        Err(EditorError::MissingSchemaName)
    ));

    let mut fieldless = SchemaDraft::new_blank();
    fieldless.name = "Empty".to_string();
    let err = service.save(None, &fieldless).unwrap_err();
    assert!(matches!(err, EditorError::NoFields));
    assert_eq!(err.user_message(), "Schema must have at least one field.");

    assert!(service.list().is_empty());
}

#[test]
fn update_replaces_name_and_fields_in_place() {
    let mut state = open_state();
    let mut service = SchemaService::new(&mut state);
    let first = service.save(None, &book_draft()).unwrap();
    let mut second_draft = book_draft();
    second_draft.name = "Film".to_string();
    let second = service.save(None, &second_draft).unwrap();

    let mut edit = SchemaDraft::from_schema(&first);
    edit.name = "Novel".to_string();
    edit.remove_row(1);
    edit.add_row("Read", FieldType::Boolean);
    let updated = service.save(Some(first.id.as_str()), &edit).unwrap();

    assert_eq!(updated.id, first.id);
    let summaries = service.list();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].id, first.id);
    assert_eq!(summaries[0].name, "Novel");
    assert_eq!(summaries[0].field_count, 2);
    assert_eq!(summaries[1].id, second.id);
}

#[test]
fn update_of_vanished_schema_is_reported() {
    let mut state = open_state();
    let err = SchemaService::new(&mut state)
        .save(Some("schema-gone"), &book_draft())
        .unwrap_err();
    assert!(matches!(err, EditorError::SchemaNotFound(id) if id == "schema-gone"));
}

#[test]
fn delete_cascades_to_notes_of_that_schema_only() {
    let mut state = open_state();
    let (book, film) = {
        let mut service = SchemaService::new(&mut state);
        let book = service.save(None, &book_draft()).unwrap();
        let mut film_draft = book_draft();
        film_draft.name = "Film".to_string();
        let film = service.save(None, &film_draft).unwrap();
        (book, film)
    };
    {
        let mut notes = NoteService::new(&mut state);
        notes
            .save(Some(book.id.as_str()), None, &raw(&[("Title", "Dune")]))
            .unwrap();
        notes
            .save(Some(book.id.as_str()), None, &raw(&[("Title", "Emma")]))
            .unwrap();
        notes
            .save(Some(film.id.as_str()), None, &raw(&[("Title", "Alien")]))
            .unwrap();
    }

    let removed = SchemaService::new(&mut state).delete(Some(book.id.as_str())).unwrap();
    assert_eq!(removed, 2);

    let stored = state.store().load().unwrap();
    assert_eq!(stored.schemas.len(), 1);
    assert_eq!(stored.schemas[0].id, film.id);
    assert_eq!(stored.notes.len(), 1);
    assert_eq!(stored.notes[0].schema_id, film.id);
}

#[test]
fn delete_without_selection_changes_nothing() {
    let mut state = open_state();
    SchemaService::new(&mut state).save(None, &book_draft()).unwrap();

    let err = SchemaService::new(&mut state).delete(None).unwrap_err();
    assert!(matches!(err, EditorError::NoSchemaSelected));
    assert_eq!(err.user_message(), "No schema is selected.");
    assert_eq!(state.dataset().schemas.len(), 1);
}

#[test]
fn schema_change_is_persisted_before_observers_run() {
    let mut state = open_state();
    let observed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&observed);
    state.subscribe(move |change: &DataChange| sink.borrow_mut().push(change.kind));

    SchemaService::new(&mut state).save(None, &book_draft()).unwrap();
    assert_eq!(*observed.borrow(), vec![ChangeKind::SchemasChanged]);

    let mut bad = book_draft();
    bad.name.clear();
    let _ = SchemaService::new(&mut state).save(None, &bad);
    assert_eq!(observed.borrow().len(), 1);
}
