//! Lint pipeline: scan, load and evaluate one migration file.
//!
//! The [`LintPipeline`] holds the rule set left after file-independent
//! exclusions. For every file it scans annotations, splits the file into
//! Up and Down statements, narrows the rule set per direction and evaluates
//! Up before Down.

use thiserror::Error;

use crate::annotations::{AnchorPolicy, ScanError, scan_comments};
use crate::input::{LoadError, MigrationDirection, MigrationFile, load_migration};
use crate::rules::{EngineError, RuleRegistry, RuleSet, StatementResult};
use crate::suppress::{Exclusion, Suppressions};

#[derive(Debug, Error)]
pub enum LintError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub struct LintPipeline {
    rules: RuleSet,
    anchor: AnchorPolicy,
}

impl LintPipeline {
    /// Build a pipeline over every registered rule except `excluded`.
    pub fn new<S: AsRef<str>>(
        registry: &RuleRegistry,
        excluded: &[S],
        anchor: AnchorPolicy,
    ) -> Self {
        Self {
            rules: registry.all().except(excluded),
            anchor,
        }
    }

    /// Lint a single file. Any error is fatal for that file only.
    pub fn lint(&self, file: &MigrationFile) -> Result<Vec<StatementResult>, LintError> {
        log::debug!("linting {}", file.path.display());

        let comments = scan_comments(&file.contents, self.anchor)?;
        let suppressions = Suppressions::from_comments(&comments);
        let migration = load_migration(&file.contents)?;

        let mut results = Vec::new();
        for direction in [MigrationDirection::Up, MigrationDirection::Down] {
            let statements = migration.statements(direction);
            if statements.is_empty() {
                continue;
            }

            let rules = match suppressions.for_direction(direction) {
                Exclusion::Nothing => self.rules.clone(),
                Exclusion::All => RuleSet::new(),
                Exclusion::Rules(names) => self.rules.except(&names),
            };
            log::debug!(
                "{}: {} {direction} statement(s), {} active rule(s)",
                file.path.display(),
                statements.len(),
                rules.len()
            );

            results.extend(rules.evaluate(
                direction,
                migration.in_transaction(direction),
                &file.path,
                statements,
            )?);
        }

        Ok(results)
    }
}

/// Lint one file with the given exclusions. See [`LintPipeline::lint`].
pub fn lint_migration<S: AsRef<str>>(
    file: &MigrationFile,
    registry: &RuleRegistry,
    excluded: &[S],
    anchor: AnchorPolicy,
) -> Result<Vec<StatementResult>, LintError> {
    LintPipeline::new(registry, excluded, anchor).lint(file)
}
