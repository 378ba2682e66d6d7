//! Statement evaluation
//!
//! Parses each raw statement of a migration direction, runs every rule of a
//! `RuleSet` against it and collects one `StatementResult` per parsed
//! statement.

use std::path::Path;

use thiserror::Error;

use crate::input::MigrationDirection;
use crate::parser::ir::{IrNode, Located};
use crate::parser::parse_statements;
use crate::rules::{MigrationContext, RuleSet, StatementResult, Violation};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to parse statement: {0}")]
    Parser(#[source] pg_query::Error),
}

/// What a raw statement turned into after parsing.
enum Parsed {
    Statements(Vec<Located<IrNode>>),
    Rejected(String),
}

impl RuleSet {
    /// Evaluate the raw statements of one migration direction.
    ///
    /// Statements the parser rejects become a single parse-error result and
    /// evaluation moves on. Any other parser failure aborts. Results are in
    /// source order; a raw statement holding several statements yields one
    /// result per statement, each carrying the same raw text.
    pub fn evaluate(
        &self,
        direction: MigrationDirection,
        in_transaction: bool,
        file: &Path,
        statements: &[String],
    ) -> Result<Vec<StatementResult>, EngineError> {
        let mut parsed = Vec::with_capacity(statements.len());
        let mut siblings: Vec<Located<IrNode>> = Vec::new();

        for raw in statements {
            match parse_statements(raw) {
                Ok(nodes) => {
                    siblings.extend(nodes.iter().cloned());
                    parsed.push(Parsed::Statements(nodes));
                }
                Err(pg_query::Error::Parse(message)) => {
                    log::debug!("parse error in {direction} statement: {message}");
                    parsed.push(Parsed::Rejected(message));
                }
                Err(e) => return Err(EngineError::Parser(e)),
            }
        }

        let mut results = Vec::new();
        for (raw, outcome) in statements.iter().zip(parsed) {
            let nodes = match outcome {
                Parsed::Statements(nodes) => nodes,
                Parsed::Rejected(message) => {
                    results.push(StatementResult::parse_error(direction, message, raw.as_str()));
                    continue;
                }
            };

            let ctx = MigrationContext {
                direction,
                statements: &siblings,
                in_transaction,
                raw_sql: raw,
                file,
            };
            for stmt in &nodes {
                results.push(self.evaluate_one(stmt, &ctx));
            }
        }

        log::debug!(
            "evaluated {} {direction} statement(s) against {} rule(s)",
            statements.len(),
            self.len()
        );
        Ok(results)
    }

    fn evaluate_one(&self, stmt: &Located<IrNode>, ctx: &MigrationContext<'_>) -> StatementResult {
        let mut result = StatementResult::passed(ctx.direction);
        for rule in self.iter() {
            if rule.check(stmt, ctx) {
                result.push_violation(Violation {
                    alias: rule.alias().to_string(),
                    documentation: rule.documentation().to_string(),
                    statement: ctx.raw_sql.to_string(),
                });
            }
        }
        result
    }
}
