//! Shell error type.

use schemanote_core::db::DbError;
use schemanote_core::{EditorError, LoggingError, StorageError, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    Db(DbError),
    Storage(StorageError),
    Store(StoreError),
    Editor(EditorError),
    Logging(LoggingError),
    /// `import` rejected the file; stored data is unchanged.
    ImportRejected(StoreError),
    /// `--set` named a field the schema does not define.
    UnknownField(String),
    ReadFile { path: PathBuf, source: std::io::Error },
    WriteFile { path: PathBuf, source: std::io::Error },
    Output(std::io::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "cannot open database: {err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Editor(err) => write!(f, "{}", err.user_message()),
            Self::Logging(err) => write!(f, "{err}"),
            Self::ImportRejected(err) => write!(
                f,
                "Import failed: {err}. Existing data was left unchanged."
            ),
            Self::UnknownField(name) => write!(f, "Schema has no field named `{name}`."),
            Self::ReadFile { path, source } => {
                write!(f, "cannot read `{}`: {source}", path.display())
            }
            Self::WriteFile { path, source } => {
                write!(f, "cannot write `{}`: {source}", path.display())
            }
            Self::Output(err) => write!(f, "cannot write output: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Store(err) | Self::ImportRejected(err) => Some(err),
            Self::Editor(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::ReadFile { source, .. } | Self::WriteFile { source, .. } => Some(source),
            Self::Output(err) => Some(err),
            Self::UnknownField(_) => None,
        }
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<StorageError> for CliError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<EditorError> for CliError {
    fn from(value: EditorError) -> Self {
        Self::Editor(value)
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Output(value)
    }
}
