//! `schemanote` command-line shell.
//!
//! # Responsibility
//! - Parse the command tree and resolve configuration.
//! - Open the SQLite-backed store and hand off to `commands`.

mod commands;
mod config;
mod error;

use clap::{Parser, Subcommand};
use commands::{parse_assignment, parse_field_row};
use config::{Overrides, Settings};
use error::CliResult;
use log::info;
use schemanote_core::db::open_db;
use schemanote_core::{init_logging, AppState, DataStore, FieldRow, SqliteKeyValueStore};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "schemanote", version)]
#[command(about = "Define note schemas and keep structured notes in a local store", long_about = None)]
struct Cli {
    /// SQLite database file [env: SCHEMANOTE_DB_PATH]
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Directory for rotating log files; logging is off when unset [env: SCHEMANOTE_LOG_DIR]
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error [env: SCHEMANOTE_LOG_LEVEL]
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage schemas
    Schema {
        #[command(subcommand)]
        command: SchemaCommand,
    },

    /// Manage notes
    Note {
        #[command(subcommand)]
        command: NoteCommand,
    },

    /// Print all data as pretty JSON, or write it to a file
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all data with the contents of a JSON file
    Import {
        /// JSON file produced by `export`
        file: PathBuf,
    },

    /// Erase all schemas and notes
    Clear {
        /// Confirm the erase
        #[arg(long)]
        yes: bool,
    },

    /// Report notes whose schema no longer exists
    Doctor,
}

#[derive(Subcommand)]
enum SchemaCommand {
    /// List schemas
    List,

    /// Show one schema with its fields
    Show { id: String },

    /// Create a schema
    Create {
        #[arg(long)]
        name: String,

        /// Field as NAME:TYPE (text, number, date, boolean); repeatable
        #[arg(long = "field", value_name = "NAME:TYPE", value_parser = parse_field_row)]
        fields: Vec<FieldRow>,
    },

    /// Rename a schema and/or replace its fields
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        /// Replaces all fields when given; repeatable
        #[arg(long = "field", value_name = "NAME:TYPE", value_parser = parse_field_row)]
        fields: Vec<FieldRow>,
    },

    /// Delete a schema and all of its notes
    Delete {
        id: String,

        /// Confirm the delete
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum NoteCommand {
    /// List notes of a schema
    List {
        /// Schema id (first schema when omitted)
        #[arg(long)]
        schema: Option<String>,

        /// Case-insensitive substring over field values
        #[arg(short, long, default_value = "")]
        query: String,
    },

    /// Show one note
    Show { id: String },

    /// Create a note
    Create {
        /// Schema id (first schema when omitted)
        #[arg(long)]
        schema: Option<String>,

        /// Field value as NAME=VALUE; repeatable
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
    },

    /// Change field values of a note
    Update {
        id: String,

        /// Field value as NAME=VALUE; repeatable
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
    },

    /// Delete a note
    Delete { id: String },
}

fn main() {
    let cli = Cli::parse();
    let settings = Settings::from_env(Overrides {
        db: cli.db.clone(),
        log_dir: cli.log_dir.clone(),
        log_level: cli.log_level.clone(),
    });

    if let Err(err) = run(cli.command, &settings) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(command: Commands, settings: &Settings) -> CliResult<()> {
    if let Some(log_dir) = &settings.log_dir {
        init_logging(&settings.log_level, &absolute(log_dir))?;
    }

    let backend = SqliteKeyValueStore::try_new(open_db(&settings.db_path)?)?;
    let mut state = AppState::open(DataStore::new(backend))?;
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        settings.db_path.display()
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    dispatch(command, &mut state, &mut out)?;
    out.flush()?;
    Ok(())
}

fn dispatch(
    command: Commands,
    state: &mut AppState<SqliteKeyValueStore>,
    out: &mut dyn Write,
) -> CliResult<()> {
    match command {
        Commands::Schema { command } => match command {
            SchemaCommand::List => commands::schema_list(state, out),
            SchemaCommand::Show { id } => commands::schema_show(state, &id, out),
            SchemaCommand::Create { name, fields } => {
                commands::schema_create(state, &name, fields, out)
            }
            SchemaCommand::Update { id, name, fields } => {
                commands::schema_update(state, &id, name.as_deref(), fields, out)
            }
            SchemaCommand::Delete { id, yes } => commands::schema_delete(state, &id, yes, out),
        },
        Commands::Note { command } => match command {
            NoteCommand::List { schema, query } => {
                commands::note_list(state, schema.as_deref(), &query, out)
            }
            NoteCommand::Show { id } => commands::note_show(state, &id, out),
            NoteCommand::Create {
                schema,
                assignments,
            } => commands::note_create(state, schema.as_deref(), &assignments, out),
            NoteCommand::Update { id, assignments } => {
                commands::note_update(state, &id, &assignments, out)
            }
            NoteCommand::Delete { id } => commands::note_delete(state, &id, out),
        },
        Commands::Export { output } => commands::export(state, output.as_deref(), out),
        Commands::Import { file } => commands::import(state, &file, out),
        Commands::Clear { yes } => commands::clear(state, yes, out),
        Commands::Doctor => commands::doctor(state, out),
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
