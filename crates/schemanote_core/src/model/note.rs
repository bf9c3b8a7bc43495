//! Note model: one instance of a schema.

use crate::model::id::{generate_id, NOTE_ID_PREFIX};
use crate::model::value::{lossy_string, FieldValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field values of a note keyed by field name.
pub type NoteValues = BTreeMap<String, FieldValue>;

/// Fields probed, in order, when guessing a note title.
const TITLE_FIELD_CANDIDATES: &[&str] = &["Title", "title", "Name", "name"];
const UNTITLED_NOTE_LABEL: &str = "(untitled note)";

/// Single note belonging to a schema.
///
/// `schema_id` is not checked against existing schemas at this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default)]
    pub id: String,
    /// Serialized as `schemaId`.
    #[serde(default)]
    pub schema_id: String,
    #[serde(default)]
    pub values: NoteValues,
}

impl Note {
    pub fn new(id: impl Into<String>, schema_id: impl Into<String>, values: NoteValues) -> Self {
        Self {
            id: id.into(),
            schema_id: schema_id.into(),
            values,
        }
    }

    /// Reads one stored note object member by member.
    ///
    /// A non-object `values` becomes an empty map.
    pub fn from_object_lossy(mut object: Map<String, Value>) -> Self {
        let values = match object.remove("values") {
            Some(Value::Object(values)) => values
                .into_iter()
                .map(|(name, value)| (name, FieldValue::from(value)))
                .collect(),
            _ => NoteValues::new(),
        };
        Self::new(
            lossy_string(object.remove("id")),
            lossy_string(object.remove("schemaId")),
            values,
        )
    }

    /// Builds a note with a freshly generated `note-` id.
    pub fn create(schema_id: impl Into<String>, values: NoteValues) -> Self {
        Self::new(generate_id(NOTE_ID_PREFIX), schema_id, values)
    }

    /// Best-effort display title taken from a `Title`/`Name`-like field.
    pub fn title(&self) -> String {
        TITLE_FIELD_CANDIDATES
            .iter()
            .filter_map(|key| self.values.get(*key))
            .find(|value| value.is_truthy())
            .map(FieldValue::to_form_text)
            .unwrap_or_else(|| UNTITLED_NOTE_LABEL.to_string())
    }

    /// Case-insensitive substring match over all string-coerced values.
    ///
    /// A blank query matches every note.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.values
            .values()
            .any(|value| value.as_search_text().to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteValues};
    use crate::model::value::FieldValue;
    use serde_json::json;

    fn values(pairs: &[(&str, FieldValue)]) -> NoteValues {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn note_serializes_schema_id_in_camel_case() {
        let note = Note::new("n1", "s1", values(&[("Title", "Hello".into())]));
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(
            json,
            json!({ "id": "n1", "schemaId": "s1", "values": { "Title": "Hello" } })
        );
    }

    #[test]
    fn create_generates_note_prefixed_id() {
        let note = Note::create("s1", NoteValues::new());
        assert!(note.id.starts_with("note-"));
        assert_eq!(note.schema_id, "s1");
    }

    #[test]
    fn title_prefers_title_then_name_fields() {
        let titled = Note::new("n1", "s1", values(&[("Title", "Dune".into())]));
        assert_eq!(titled.title(), "Dune");

        let named = Note::new(
            "n2",
            "s1",
            values(&[("Title", "".into()), ("name", "Ada".into())]),
        );
        assert_eq!(named.title(), "Ada");

        let untitled = Note::new("n3", "s1", values(&[("Pages", 12_i64.into())]));
        assert_eq!(untitled.title(), "(untitled note)");
    }

    #[test]
    fn matches_is_case_insensitive_over_all_values() {
        let note = Note::new(
            "n1",
            "s1",
            values(&[("Title", "Dune".into()), ("Pages", 412_i64.into())]),
        );
        assert!(note.matches("dUN"));
        assert!(note.matches("41"));
        assert!(note.matches("   "));
        assert!(!note.matches("foundation"));
    }

    #[test]
    fn from_object_lossy_defaults_bad_members() {
        let serde_json::Value::Object(object) =
            json!({ "id": "n1", "schemaId": 3, "values": [1, 2] })
        else {
            unreachable!("literal is an object");
        };
        let note = Note::from_object_lossy(object);
        assert_eq!(note, Note::new("n1", "3", NoteValues::new()));
    }
}
