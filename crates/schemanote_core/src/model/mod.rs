//! Schema-driven note domain model.
//!
//! # Responsibility
//! - Define field definitions, schemas, notes and the persisted dataset.
//! - Normalize user input into safe defaults instead of rejecting it.
//!
//! # Invariants
//! - Unknown field types always fall back to `FieldType::Text`.
//! - Every schema/note created here carries a generated, prefixed id.
//! - Deleting a schema removes every note that references it.

pub mod dataset;
pub mod field;
pub mod id;
pub mod note;
pub mod schema;
pub mod value;
