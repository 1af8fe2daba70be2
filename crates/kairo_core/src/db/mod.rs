//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the task store.
//! - Bring the on-disk schema to the current version before any task access.
//!
//! # Invariants
//! - Applied migrations are tracked by name in `schema_migrations`.
//! - Core code must not read/write tasks before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
    /// One named migration failed; its transaction was rolled back.
    MigrationFailed {
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The migration log names a migration this binary does not know.
    UnknownMigration(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::MigrationFailed { name, source } => {
                write!(f, "migration `{name}` failed: {source}")
            }
            Self::UnknownMigration(name) => write!(
                f,
                "database was migrated by a newer version (unknown migration `{name}`)"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::MigrationFailed { source, .. } => Some(source),
            Self::UnknownMigration(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<std::io::Error> for DbError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
