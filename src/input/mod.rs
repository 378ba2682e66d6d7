//! Migration loading
//!
//! Reads migration files from disk and splits them into Up and Down
//! statement lists following the sql-migrate file conventions.

use std::path::{Path, PathBuf};

use serde::Serialize;
use strum_macros::{Display, EnumString};
use thiserror::Error;

pub mod sql;

pub use sql::load_migration;

/// Which half of a migration a statement belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MigrationDirection {
    #[default]
    Up,
    Down,
}

/// One migration file read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    pub contents: String,
}

/// Statements of a migration file split by direction.
///
/// Raw statement text is kept verbatim (terminators and trailing newlines
/// included) so that reports show exactly what the author wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMigration {
    pub up_statements: Vec<String>,
    pub down_statements: Vec<String>,
    pub disable_transaction_up: bool,
    pub disable_transaction_down: bool,
}

impl ParsedMigration {
    pub fn statements(&self, direction: MigrationDirection) -> &[String] {
        match direction {
            MigrationDirection::Up => &self.up_statements,
            MigrationDirection::Down => &self.down_statements,
        }
    }

    /// Whether statements of `direction` run inside the implicit transaction.
    pub fn in_transaction(&self, direction: MigrationDirection) -> bool {
        match direction {
            MigrationDirection::Up => !self.disable_transaction_up,
            MigrationDirection::Down => !self.disable_transaction_down,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("expected a file but {} is a directory", path.display())]
    Directory { path: PathBuf },

    #[error("failed to split statements: {0}")]
    Split(#[from] pg_query::Error),

    #[error("incomplete migration command on line {line}")]
    IncompleteCommand { line: usize },

    #[error("statement on line {line} is not terminated with a semicolon")]
    NoTerminator { line: usize },

    #[error("saw '-- +migrate StatementBegin' with no matching '-- +migrate StatementEnd'")]
    UnclosedStatementBlock,
}

/// Read every path into a [`MigrationFile`], in the given order.
///
/// Paths are made absolute. Directories are rejected rather than walked.
pub fn read_migration_files(paths: &[PathBuf]) -> Result<Vec<MigrationFile>, LoadError> {
    let mut files = Vec::with_capacity(paths.len());

    for path in paths {
        let path = absolute(path)?;
        let metadata = std::fs::metadata(&path).map_err(|e| LoadError::Io {
            path: path.clone(),
            source: e,
        })?;
        if metadata.is_dir() {
            return Err(LoadError::Directory { path });
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| LoadError::Io {
            path: path.clone(),
            source: e,
        })?;
        log::debug!("read {} ({} bytes)", path.display(), contents.len());
        files.push(MigrationFile { path, contents });
    }

    Ok(files)
}

fn absolute(path: &Path) -> Result<PathBuf, LoadError> {
    std::path::absolute(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
