//! Output reporters for different formats
//!
//! Supports the plain-text layout for terminals and a JSON document for
//! tooling. Both write to any `io::Write`.

use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::rules::StatementResult;

pub mod json;
pub mod text;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error writing report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Results of linting one migration file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    #[serde(serialize_with = "serialize_path_forward_slash")]
    pub path: PathBuf,
    pub results: Vec<StatementResult>,
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>, results: Vec<StatementResult>) -> Self {
        Self {
            path: path.into(),
            results,
        }
    }

    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}

#[allow(clippy::ptr_arg)] // serde serialize_with requires &PathBuf, not &Path
fn serialize_path_forward_slash<S: serde::Serializer>(
    path: &PathBuf,
    s: S,
) -> Result<S::Ok, S::Error> {
    s.serialize_str(&path.to_string_lossy().replace('\\', "/"))
}

/// Supported report formats.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    Display,
    EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn reporter(&self) -> Box<dyn Reporter> {
        match self {
            Self::Text => Box::new(TextReporter),
            Self::Json => Box::new(JsonReporter::new(true)),
        }
    }
}

/// Trait for output format reporters.
pub trait Reporter {
    /// Write the reports of every linted file to `out`.
    fn emit(&self, reports: &[FileReport], out: &mut dyn Write) -> Result<(), ReportError>;
}

/// Plain-text reporter: failures only, grouped per file.
pub struct TextReporter;

/// JSON reporter: one object per file with every statement result.
pub struct JsonReporter {
    pub pretty: bool,
}

impl JsonReporter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod test_helpers;
