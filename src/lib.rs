//! pg-safe-migrate: detects unsafe statements in PostgreSQL migration files
//!
//! Migration files follow the sql-migrate layout (`-- +migrate Up` /
//! `-- +migrate Down`). Each statement is parsed with the PostgreSQL parser
//! and checked against a set of rules; `-- pgsafemigrate:nolint` annotations
//! exclude rules per direction.

pub mod annotations;
pub mod config;
pub mod input;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod rules;
pub mod suppress;

// Re-export commonly used types
pub use annotations::AnchorPolicy;
pub use config::Config;
pub use input::{MigrationDirection, MigrationFile};
pub use parser::ir::{IrNode, Located};
pub use pipeline::{LintError, LintPipeline, lint_migration};
pub use rules::{ReportedError, Rule, RuleRegistry, RuleSet, StatementResult};
