//! Shared test helpers for rule unit tests.

use std::path::Path;

use crate::input::MigrationDirection;
use crate::parser::ir::*;
use crate::parser::parse_statements;
use crate::rules::{MigrationContext, Rule};

/// Parse every statement of `sql`, panicking on parse errors.
pub fn parse_all(sql: &str) -> Vec<Located<IrNode>> {
    parse_statements(sql).unwrap_or_else(|e| panic!("failed to parse {sql:?}: {e}"))
}

/// Parse exactly one statement.
pub fn parse_one(sql: &str) -> Located<IrNode> {
    let mut stmts = parse_all(sql);
    assert_eq!(stmts.len(), 1, "expected exactly one statement in {sql:?}");
    stmts.remove(0)
}

/// Build an Up `MigrationContext` over `statements`.
pub fn make_ctx<'a>(
    statements: &'a [Located<IrNode>],
    raw_sql: &'a str,
    in_transaction: bool,
) -> MigrationContext<'a> {
    MigrationContext {
        direction: MigrationDirection::Up,
        statements,
        in_transaction,
        raw_sql,
        file: Path::new("migrations/001.sql"),
    }
}

/// Evaluate `rule` on the first statement of `sql`, with every statement of
/// `sql` as siblings.
pub fn check_first(rule: &dyn Rule, sql: &str, in_transaction: bool) -> bool {
    let stmts = parse_all(sql);
    let ctx = make_ctx(&stmts, sql, in_transaction);
    rule.check(&stmts[0], &ctx)
}

/// Evaluate `rule` on every statement of `sql` and return the indices that fired.
pub fn fired_at(rule: &dyn Rule, sql: &str, in_transaction: bool) -> Vec<usize> {
    let stmts = parse_all(sql);
    let ctx = make_ctx(&stmts, sql, in_transaction);
    stmts
        .iter()
        .enumerate()
        .filter(|(_, stmt)| rule.check(stmt, &ctx))
        .map(|(i, _)| i)
        .collect()
}

/// A rule with a fixed alias that always returns the same verdict.
pub struct FixedRule {
    alias: String,
    fires: bool,
}

impl FixedRule {
    pub fn new(alias: &str, fires: bool) -> Self {
        Self {
            alias: alias.to_string(),
            fires,
        }
    }
}

impl Rule for FixedRule {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn documentation(&self) -> &str {
        "Fixed test rule."
    }

    fn explain(&self) -> &str {
        "Fixed test rule used by unit tests."
    }

    fn check(&self, _: &Located<IrNode>, _: &MigrationContext<'_>) -> bool {
        self.fires
    }
}
