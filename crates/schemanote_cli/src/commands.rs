//! Command handlers.
//!
//! # Responsibility
//! - Translate parsed command lines into schema/note editor calls.
//! - Render results as plain, line-oriented text.
//!
//! # Invariants
//! - Destructive commands without confirmation print the prompt and change nothing.
//! - Handlers write only to the given output; errors are returned, not printed.

use crate::error::{CliError, CliResult};
use schemanote_core::{
    AppState, EditorError, FieldRow, KeyValueStore, NoteForm, NoteService, NotesView,
    SchemaDraft, SchemaService, StoreError,
};
use std::io::Write;
use std::path::Path;

pub const DELETE_SCHEMA_PROMPT: &str = "Delete this schema and all notes that belong to it?";
pub const CLEAR_PROMPT: &str = "Erase all schemas and notes from storage?";
const CONFIRM_HINT: &str = "Re-run with --yes to confirm.";

/// `name=value` pair from `--set`.
pub fn parse_assignment(input: &str) -> Result<(String, String), String> {
    let Some((name, value)) = input.split_once('=') else {
        return Err(format!("expected NAME=VALUE, got `{input}`"));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("field name is empty in `{input}`"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// `name:type` row from `--field`.
pub fn parse_field_row(input: &str) -> Result<FieldRow, String> {
    let row = FieldRow::parse(input);
    if row.name.trim().is_empty() {
        return Err(format!("field name is empty in `{input}`"));
    }
    Ok(row)
}

pub fn schema_list<S: KeyValueStore>(state: &mut AppState<S>, out: &mut dyn Write) -> CliResult<()> {
    let summaries = SchemaService::new(state).list();
    if summaries.is_empty() {
        writeln!(out, "No schemas yet.")?;
        return Ok(());
    }
    for summary in summaries {
        writeln!(
            out,
            "{}\t{}\t{} field(s)",
            summary.id, summary.name, summary.field_count
        )?;
    }
    Ok(())
}

pub fn schema_show<S: KeyValueStore>(
    state: &mut AppState<S>,
    id: &str,
    out: &mut dyn Write,
) -> CliResult<()> {
    let service = SchemaService::new(state);
    let schema = service
        .get(id)
        .ok_or_else(|| EditorError::SchemaNotFound(id.to_string()))?;
    writeln!(out, "id: {}", schema.id)?;
    writeln!(out, "name: {}", schema.display_name())?;
    writeln!(out, "fields:")?;
    for field in &schema.fields {
        writeln!(out, "  - {} ({})", field.name, field.field_type.as_str())?;
    }
    Ok(())
}

pub fn schema_create<S: KeyValueStore>(
    state: &mut AppState<S>,
    name: &str,
    rows: Vec<FieldRow>,
    out: &mut dyn Write,
) -> CliResult<()> {
    let draft = SchemaDraft {
        name: name.to_string(),
        rows,
    };
    let schema = SchemaService::new(state).save(None, &draft)?;
    writeln!(out, "Created schema {} ({})", schema.id, schema.name)?;
    Ok(())
}

/// Renames and/or redefines a schema; omitted parts keep their stored value.
pub fn schema_update<S: KeyValueStore>(
    state: &mut AppState<S>,
    id: &str,
    name: Option<&str>,
    rows: Vec<FieldRow>,
    out: &mut dyn Write,
) -> CliResult<()> {
    let mut service = SchemaService::new(state);
    let mut draft = service
        .get(id)
        .map(SchemaDraft::from_schema)
        .ok_or_else(|| EditorError::SchemaNotFound(id.to_string()))?;
    if let Some(name) = name {
        draft.name = name.to_string();
    }
    if !rows.is_empty() {
        draft.rows = rows;
    }
    let schema = service.save(Some(id), &draft)?;
    writeln!(out, "Updated schema {} ({})", schema.id, schema.name)?;
    Ok(())
}

pub fn schema_delete<S: KeyValueStore>(
    state: &mut AppState<S>,
    id: &str,
    confirmed: bool,
    out: &mut dyn Write,
) -> CliResult<()> {
    let mut service = SchemaService::new(state);
    if service.get(id).is_none() {
        return Err(EditorError::SchemaNotFound(id.to_string()).into());
    }
    if !confirmed {
        writeln!(out, "{DELETE_SCHEMA_PROMPT} {CONFIRM_HINT}")?;
        return Ok(());
    }
    let removed = service.delete(Some(id))?;
    writeln!(out, "Deleted schema {id} and {removed} note(s)")?;
    Ok(())
}

/// Lists notes of `schema_id`, or of the first schema when omitted.
pub fn note_list<S: KeyValueStore>(
    state: &mut AppState<S>,
    schema_id: Option<&str>,
    query: &str,
    out: &mut dyn Write,
) -> CliResult<()> {
    let schema_id = select_schema(state, schema_id)?;
    let notes = NoteService::new(state).list(schema_id.as_deref(), query)?;
    if notes.is_empty() {
        writeln!(out, "No notes match.")?;
        return Ok(());
    }
    for note in notes {
        writeln!(out, "{}\t{}", note.id, note.title)?;
    }
    Ok(())
}

pub fn note_show<S: KeyValueStore>(
    state: &mut AppState<S>,
    id: &str,
    out: &mut dyn Write,
) -> CliResult<()> {
    let service = NoteService::new(state);
    let note = service
        .get(id)
        .ok_or_else(|| EditorError::NoteNotFound(id.to_string()))?;
    writeln!(out, "id: {}", note.id)?;
    writeln!(out, "schema: {}", note.schema_id)?;
    writeln!(out, "title: {}", note.title())?;

    match service.form(Some(note.schema_id.as_str()), Some(id)) {
        Ok(form) => {
            for field in &form.fields {
                writeln!(
                    out,
                    "  {} ({}): {}",
                    field.name,
                    field.field_type.as_str(),
                    field.value.as_raw()
                )?;
            }
        }
        Err(EditorError::SchemaNotFound(_)) => {
            writeln!(out, "  (schema missing; showing stored values)")?;
            for (name, value) in &note.values {
                writeln!(out, "  {}: {}", name, value.to_form_text())?;
            }
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

/// Creates a note in `schema_id`, or in the first schema when omitted.
pub fn note_create<S: KeyValueStore>(
    state: &mut AppState<S>,
    schema_id: Option<&str>,
    assignments: &[(String, String)],
    out: &mut dyn Write,
) -> CliResult<()> {
    let schema_id = select_schema(state, schema_id)?;
    let mut service = NoteService::new(state);
    let mut form = service.form(schema_id.as_deref(), None)?;
    apply_assignments(&mut form, assignments)?;
    let note = service.save(schema_id.as_deref(), None, &form.raw_values())?;
    writeln!(out, "Created note {} ({})", note.id, note.title())?;
    Ok(())
}

/// Overwrites the assigned fields of a note; other fields keep their values.
pub fn note_update<S: KeyValueStore>(
    state: &mut AppState<S>,
    id: &str,
    assignments: &[(String, String)],
    out: &mut dyn Write,
) -> CliResult<()> {
    let mut service = NoteService::new(state);
    let schema_id = service
        .get(id)
        .map(|note| note.schema_id.clone())
        .ok_or_else(|| EditorError::NoteNotFound(id.to_string()))?;
    let mut form = service.form(Some(schema_id.as_str()), Some(id))?;
    apply_assignments(&mut form, assignments)?;
    let note = service.save(Some(schema_id.as_str()), Some(id), &form.raw_values())?;
    writeln!(out, "Updated note {} ({})", note.id, note.title())?;
    Ok(())
}

pub fn note_delete<S: KeyValueStore>(
    state: &mut AppState<S>,
    id: &str,
    out: &mut dyn Write,
) -> CliResult<()> {
    let note = NoteService::new(state).delete(Some(id))?;
    writeln!(out, "Deleted note {} ({})", note.id, note.title())?;
    Ok(())
}

/// Writes the pretty-printed dataset to `output`, or to `out` when omitted.
pub fn export<S: KeyValueStore>(
    state: &AppState<S>,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> CliResult<()> {
    let json = state.export_json()?;
    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n")).map_err(|source| CliError::WriteFile {
                path: path.to_path_buf(),
                source,
            })?;
            writeln!(out, "Exported data to {}", path.display())?;
        }
        None => writeln!(out, "{json}")?,
    }
    Ok(())
}

pub fn import<S: KeyValueStore>(
    state: &mut AppState<S>,
    file: &Path,
    out: &mut dyn Write,
) -> CliResult<()> {
    let json = std::fs::read_to_string(file).map_err(|source| CliError::ReadFile {
        path: file.to_path_buf(),
        source,
    })?;
    let dataset = state.import_json(&json).map_err(|err| match err {
        StoreError::InvalidJson(_) => CliError::ImportRejected(err),
        other => CliError::Store(other),
    })?;
    writeln!(
        out,
        "Imported {} schema(s) and {} note(s)",
        dataset.schemas.len(),
        dataset.notes.len()
    )?;
    Ok(())
}

pub fn clear<S: KeyValueStore>(
    state: &mut AppState<S>,
    confirmed: bool,
    out: &mut dyn Write,
) -> CliResult<()> {
    if !confirmed {
        writeln!(out, "{CLEAR_PROMPT} {CONFIRM_HINT}")?;
        return Ok(());
    }
    state.clear_all()?;
    writeln!(out, "Cleared all data")?;
    Ok(())
}

/// Reports notes whose schema no longer exists.
pub fn doctor<S: KeyValueStore>(state: &AppState<S>, out: &mut dyn Write) -> CliResult<()> {
    let orphans = state.dataset().orphaned_notes();
    if orphans.is_empty() {
        writeln!(out, "No orphaned notes.")?;
        return Ok(());
    }
    writeln!(out, "{} orphaned note(s):", orphans.len())?;
    for note in orphans {
        writeln!(out, "{}\tschema={}\t{}", note.id, note.schema_id, note.title())?;
    }
    Ok(())
}

/// Resolves the schema the notes commands act on, as the notes screen would.
fn select_schema<S: KeyValueStore>(
    state: &mut AppState<S>,
    requested: Option<&str>,
) -> CliResult<Option<String>> {
    let mut view = NotesView::attach(state);
    if let Some(id) = requested {
        if !view.select_schema(state.dataset(), id) {
            view.detach(state);
            return Err(EditorError::SchemaNotFound(id.to_string()).into());
        }
    }
    let selected = view.schema_id().map(str::to_string);
    view.detach(state);
    Ok(selected)
}

fn apply_assignments(form: &mut NoteForm, assignments: &[(String, String)]) -> CliResult<()> {
    for (name, value) in assignments {
        if !form.set(name, value) {
            return Err(CliError::UnknownField(name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemanote_core::{DataStore, FieldType, MemoryKeyValueStore};

    fn open_state() -> AppState<MemoryKeyValueStore> {
        AppState::open(DataStore::new(MemoryKeyValueStore::new())).unwrap()
    }

    fn run(
        state: &mut AppState<MemoryKeyValueStore>,
        command: impl FnOnce(&mut AppState<MemoryKeyValueStore>, &mut dyn Write) -> CliResult<()>,
    ) -> String {
        let mut buffer = Vec::new();
        command(state, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn book_rows() -> Vec<FieldRow> {
        vec![
            parse_field_row("Title:text").unwrap(),
            parse_field_row("Pages:number").unwrap(),
        ]
    }

    fn assign(pairs: &[&str]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|pair| parse_assignment(pair).unwrap())
            .collect()
    }

    #[test]
    fn parse_assignment_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("Title=a=b").unwrap(),
            ("Title".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_assignment(" Pages =").unwrap(),
            ("Pages".to_string(), String::new())
        );
        assert!(parse_assignment("Title").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn parse_field_row_requires_a_name() {
        assert_eq!(
            parse_field_row("Due:date").unwrap(),
            FieldRow::new("Due", FieldType::Date)
        );
        assert!(parse_field_row(":number").is_err());
    }

    #[test]
    fn schema_delete_without_confirmation_keeps_data() {
        let mut state = open_state();
        run(&mut state, |s, out| schema_create(s, "Book", book_rows(), out));
        let id = state.dataset().schemas[0].id.clone();

        let printed = run(&mut state, |s, out| schema_delete(s, &id, false, out));
        assert!(printed.starts_with(DELETE_SCHEMA_PROMPT));
        assert_eq!(state.dataset().schemas.len(), 1);

        run(&mut state, |s, out| schema_delete(s, &id, true, out));
        assert!(state.dataset().schemas.is_empty());
    }

    #[test]
    fn schema_update_keeps_fields_when_none_given() {
        let mut state = open_state();
        run(&mut state, |s, out| schema_create(s, "Book", book_rows(), out));
        let id = state.dataset().schemas[0].id.clone();

        run(&mut state, |s, out| {
            schema_update(s, &id, Some("Novel"), Vec::new(), out)
        });
        let schema = &state.dataset().schemas[0];
        assert_eq!(schema.name, "Novel");
        assert_eq!(schema.field_count(), 2);
    }

    #[test]
    fn note_create_defaults_to_first_schema_and_update_merges() {
        let mut state = open_state();
        run(&mut state, |s, out| schema_create(s, "Book", book_rows(), out));

        let printed = run(&mut state, |s, out| {
            note_create(s, None, &assign(&["Title=Dune", "Pages=412"]), out)
        });
        assert!(printed.contains("(Dune)"));

        let note_id = state.dataset().notes[0].id.clone();
        run(&mut state, |s, out| {
            note_update(s, &note_id, &assign(&["Pages=600"]), out)
        });
        let note = &state.dataset().notes[0];
        assert_eq!(note.title(), "Dune");
        assert_eq!(note.values["Pages"].to_form_text(), "600");

        let listed = run(&mut state, |s, out| note_list(s, None, "dune", out));
        assert_eq!(listed, format!("{note_id}\tDune\n"));
    }

    #[test]
    fn note_create_rejects_unknown_field_without_saving() {
        let mut state = open_state();
        run(&mut state, |s, out| schema_create(s, "Book", book_rows(), out));

        let mut buffer = Vec::new();
        let err = note_create(&mut state, None, &assign(&["Author=Herbert"]), &mut buffer)
            .unwrap_err();
        assert!(matches!(err, CliError::UnknownField(name) if name == "Author"));
        assert!(state.dataset().notes.is_empty());
    }

    #[test]
    fn note_commands_report_missing_schema() {
        let mut state = open_state();
        let mut buffer = Vec::new();
        let err = note_create(&mut state, None, &[], &mut buffer).unwrap_err();
        assert_eq!(err.to_string(), "No schema is selected.");

        let err = note_list(&mut state, Some("schema-x"), "", &mut buffer).unwrap_err();
        assert_eq!(err.to_string(), "Selected schema not found.");
    }

    #[test]
    fn clear_requires_confirmation() {
        let mut state = open_state();
        run(&mut state, |s, out| schema_create(s, "Book", book_rows(), out));

        let printed = run(&mut state, |s, out| clear(s, false, out));
        assert!(printed.starts_with(CLEAR_PROMPT));
        assert_eq!(state.dataset().schemas.len(), 1);

        run(&mut state, |s, out| clear(s, true, out));
        assert!(state.dataset().is_empty());
    }

    #[test]
    fn import_of_invalid_file_leaves_data_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.json");
        std::fs::write(&file, "{ not json").unwrap();

        let mut state = open_state();
        run(&mut state, |s, out| schema_create(s, "Book", book_rows(), out));

        let mut buffer = Vec::new();
        let err = import(&mut state, &file, &mut buffer).unwrap_err();
        assert!(matches!(err, CliError::ImportRejected(_)));
        assert!(err.to_string().contains("left unchanged"));
        assert_eq!(state.dataset().schemas.len(), 1);
    }

    #[test]
    fn export_to_file_then_import_restores_data() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("backup.json");

        let mut state = open_state();
        run(&mut state, |s, out| schema_create(s, "Book", book_rows(), out));
        run(&mut state, |s, out| {
            note_create(s, None, &assign(&["Title=Dune"]), out)
        });
        let before = state.dataset().clone();

        run(&mut state, |s, out| export(s, Some(file.as_path()), out));
        run(&mut state, |s, out| clear(s, true, out));
        let printed = run(&mut state, |s, out| import(s, &file, out));

        assert_eq!(printed, "Imported 1 schema(s) and 1 note(s)\n");
        assert_eq!(state.dataset(), &before);
    }

    #[test]
    fn doctor_lists_orphaned_notes() {
        let mut state = open_state();
        assert_eq!(
            run(&mut state, |s, out| doctor(s, out)),
            "No orphaned notes.\n"
        );

        state
            .import_json(r#"{"schemas":[],"notes":[{"id":"n1","schemaId":"gone","values":{"Name":"Stray"}}]}"#)
            .unwrap();
        let printed = run(&mut state, |s, out| doctor(s, out));
        assert!(printed.contains("n1\tschema=gone\tStray"));
    }
}
