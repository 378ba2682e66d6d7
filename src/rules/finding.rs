use serde::Serialize;

use crate::input::MigrationDirection;

/// Alias reported for statements the parser rejected.
pub const PARSE_ERROR_ALIAS: &str = "parse-error";

/// A rule matched a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub alias: String,
    pub documentation: String,
    /// Raw text of the offending statement, as written in the file.
    pub statement: String,
}

/// A statement the parser rejected. Its message stands in for the rule
/// documentation in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    pub message: String,
    pub statement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportedError {
    Violation(Violation),
    ParseError(ParseError),
}

impl ReportedError {
    pub fn alias(&self) -> &str {
        match self {
            Self::Violation(v) => &v.alias,
            Self::ParseError(_) => PARSE_ERROR_ALIAS,
        }
    }

    pub fn documentation(&self) -> &str {
        match self {
            Self::Violation(v) => &v.documentation,
            Self::ParseError(e) => &e.message,
        }
    }

    pub fn statement(&self) -> &str {
        match self {
            Self::Violation(v) => &v.statement,
            Self::ParseError(e) => &e.statement,
        }
    }
}

/// Outcome of evaluating one parsed statement (or one unparsable raw statement).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementResult {
    pub passed: bool,
    pub direction: MigrationDirection,
    pub errors: Vec<ReportedError>,
}

impl StatementResult {
    pub fn passed(direction: MigrationDirection) -> Self {
        Self {
            passed: true,
            direction,
            errors: Vec::new(),
        }
    }

    pub fn parse_error(
        direction: MigrationDirection,
        message: impl Into<String>,
        statement: impl Into<String>,
    ) -> Self {
        Self {
            passed: false,
            direction,
            errors: vec![ReportedError::ParseError(ParseError {
                message: message.into(),
                statement: statement.into(),
            })],
        }
    }

    /// Record a violation and mark the result failed.
    pub fn push_violation(&mut self, violation: Violation) {
        self.passed = false;
        self.errors.push(ReportedError::Violation(violation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_accessors() {
        let result =
            StatementResult::parse_error(MigrationDirection::Down, "syntax error", "SELEC 1;");
        assert!(!result.passed);
        assert_eq!(result.errors.len(), 1);
        let err = &result.errors[0];
        assert_eq!(err.alias(), "parse-error");
        assert_eq!(err.documentation(), "syntax error");
        assert_eq!(err.statement(), "SELEC 1;");
    }

    #[test]
    fn test_push_violation_fails_result() {
        let mut result = StatementResult::passed(MigrationDirection::Up);
        assert!(result.passed);
        result.push_violation(Violation {
            alias: "a".to_string(),
            documentation: "docs".to_string(),
            statement: "SELECT 1;".to_string(),
        });
        assert!(!result.passed);
        assert_eq!(result.errors[0].alias(), "a");
    }

    #[test]
    fn test_serialize_json() {
        let result = StatementResult::parse_error(MigrationDirection::Up, "boom", "X;");
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "passed": false,
                "direction": "up",
                "errors": [{"kind": "parse_error", "message": "boom", "statement": "X;"}],
            })
        );
    }
}
