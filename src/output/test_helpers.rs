//! Shared test helpers for output module tests.

use crate::input::MigrationDirection;
use crate::rules::{StatementResult, Violation};

/// A failed Up result with one violation per `(alias, statement, documentation)`.
pub fn failed(errors: &[(&str, &str, &str)]) -> StatementResult {
    let mut result = StatementResult::passed(MigrationDirection::Up);
    for (alias, statement, documentation) in errors {
        result.push_violation(Violation {
            alias: alias.to_string(),
            documentation: documentation.to_string(),
            statement: statement.to_string(),
        });
    }
    result
}

pub fn passed() -> StatementResult {
    StatementResult::passed(MigrationDirection::Up)
}
