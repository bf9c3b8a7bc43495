//! Editor use-case services.
//!
//! # Responsibility
//! - Hold the schema editor and notes editor logic independent of any UI.
//! - Route every mutation through `AppState` so observers stay in sync.

pub mod editor_error;
pub mod note_service;
pub mod schema_service;
