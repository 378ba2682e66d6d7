//! sql-migrate file parsing
//!
//! Splits a migration script into Up and Down statements using the
//! `-- +migrate` directives. Scripts without any direction marker are
//! treated as Up-only and split with the pg_query statement splitter.

use crate::input::{LoadError, MigrationDirection, ParsedMigration};
use crate::parser::split_statements;

/// Prefix of every sql-migrate directive line.
pub const COMMAND_PREFIX: &str = "-- +migrate ";
const NO_TRANSACTION: &str = "notransaction";

/// Words following [`COMMAND_PREFIX`], or `None` when `line` is not a
/// directive. The prefix must start the line exactly.
pub fn command_words(line: &str) -> Option<std::str::SplitWhitespace<'_>> {
    line.strip_prefix(COMMAND_PREFIX).map(str::split_whitespace)
}

/// Direction opened by a `-- +migrate Up` / `-- +migrate Down` line.
pub fn marker_direction(line: &str) -> Option<MigrationDirection> {
    match command_words(line)?.next()? {
        "Up" => Some(MigrationDirection::Up),
        "Down" => Some(MigrationDirection::Down),
        _ => None,
    }
}

/// Parse the statements of a migration script.
///
/// Line-oriented, following sql-migrate:
/// - lines before the first direction marker are ignored
/// - `-- ` comment lines are skipped (directives excepted)
/// - a statement ends on a line whose last word before any `--` ends with `;`
/// - semicolons inside `StatementBegin`/`StatementEnd` do not end a statement
pub fn load_migration(sql: &str) -> Result<ParsedMigration, LoadError> {
    let mut parsed = ParsedMigration::default();
    let mut direction: Option<MigrationDirection> = None;
    let mut buf = String::new();
    let mut ignore_semicolons = false;
    let mut statement_ended = false;

    for (i, line) in sql.lines().enumerate() {
        let line_number = i + 1;

        if line.starts_with("-- ") && !line.starts_with("-- +") {
            continue;
        }

        if let Some(mut words) = command_words(line) {
            let command = words
                .next()
                .ok_or(LoadError::IncompleteCommand { line: line_number })?;
            let no_transaction = words.any(|w| w == NO_TRANSACTION);

            match command {
                "Up" | "Down" => {
                    if !buf.trim().is_empty() {
                        return Err(LoadError::NoTerminator { line: line_number });
                    }
                    if command == "Up" {
                        direction = Some(MigrationDirection::Up);
                        parsed.disable_transaction_up |= no_transaction;
                    } else {
                        direction = Some(MigrationDirection::Down);
                        parsed.disable_transaction_down |= no_transaction;
                    }
                }
                "StatementBegin" if direction.is_some() => {
                    statement_ended = false;
                    ignore_semicolons = true;
                }
                "StatementEnd" if direction.is_some() => {
                    statement_ended = ignore_semicolons;
                    ignore_semicolons = false;
                }
                _ => {}
            }
        }

        let Some(current) = direction else {
            continue;
        };

        if !line.starts_with("-- +") {
            buf.push_str(line);
            buf.push('\n');
        }

        if (!ignore_semicolons && ends_with_semicolon(line)) || statement_ended {
            statement_ended = false;
            let statement = std::mem::take(&mut buf);
            match current {
                MigrationDirection::Up => parsed.up_statements.push(statement),
                MigrationDirection::Down => parsed.down_statements.push(statement),
            }
        }
    }

    if ignore_semicolons {
        return Err(LoadError::UnclosedStatementBlock);
    }

    if direction.is_none() {
        log::debug!("no direction markers found, splitting as a plain script");
        return Ok(ParsedMigration {
            up_statements: split_statements(sql)?,
            ..ParsedMigration::default()
        });
    }

    let rest = buf.trim();
    if !rest.is_empty() && !rest.starts_with("-- +") {
        return Err(LoadError::NoTerminator {
            line: sql.lines().count(),
        });
    }

    Ok(parsed)
}

/// True when the last word before any `--` comment ends with `;`.
fn ends_with_semicolon(line: &str) -> bool {
    line.split_whitespace()
        .take_while(|word| !word.starts_with("--"))
        .last()
        .is_some_and(|word| word.ends_with(';'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_direction() {
        assert_eq!(marker_direction("-- +migrate Up"), Some(MigrationDirection::Up));
        assert_eq!(
            marker_direction("-- +migrate Down notransaction"),
            Some(MigrationDirection::Down)
        );
        assert_eq!(marker_direction("-- +migrate StatementBegin"), None);
        assert_eq!(marker_direction("-- +migrate Upwards"), None);
        assert_eq!(marker_direction("-- +migrateUp"), None);
        assert_eq!(marker_direction("--+migrate Down"), None);
        assert_eq!(marker_direction("---  +migrate Down"), None);
        assert_eq!(marker_direction("  -- +migrate Down"), None);
    }

    #[test]
    fn test_ends_with_semicolon() {
        assert!(ends_with_semicolon("SELECT 1;"));
        assert!(ends_with_semicolon("SELECT 1; -- trailing"));
        assert!(!ends_with_semicolon("SELECT 1"));
        assert!(!ends_with_semicolon("SELECT 1 -- ;"));
        assert!(!ends_with_semicolon(""));
    }

    #[test]
    fn test_only_up_statements() {
        let m = load_migration(
            "\n-- +migrate Up\nSELECT 1;\nUPDATE \"movies\" SET updated_at = CURRENT_TIMESTAMP;\n-- +migrate Down\n-- nothing to downgrade",
        )
        .expect("load failed");
        assert_eq!(
            m.up_statements,
            vec![
                "SELECT 1;\n",
                "UPDATE \"movies\" SET updated_at = CURRENT_TIMESTAMP;\n",
            ]
        );
        assert!(m.down_statements.is_empty());
        assert!(!m.disable_transaction_up);
    }

    #[test]
    fn test_up_and_down_statements() {
        let m = load_migration(
            "\n-- +migrate Up\nSELECT 1;\nUPDATE \"movies\" SET updated_at = CURRENT_TIMESTAMP;\n-- +migrate Down\nUPDATE \"movies\" SET updated_at = NULL;\n",
        )
        .expect("load failed");
        assert_eq!(m.up_statements.len(), 2);
        assert_eq!(
            m.down_statements,
            vec!["UPDATE \"movies\" SET updated_at = NULL;\n"]
        );
    }

    #[test]
    fn test_plain_script_falls_back_to_splitter() {
        let m = load_migration(
            "\n\t\tSELECT 1;\n\t\tUPDATE \"movies\" SET updated_at = CURRENT_TIMESTAMP;",
        )
        .expect("load failed");
        assert_eq!(
            m.up_statements,
            vec![
                "SELECT 1;",
                "UPDATE \"movies\" SET updated_at = CURRENT_TIMESTAMP;",
            ]
        );
        assert!(m.down_statements.is_empty());
    }

    #[test]
    fn test_plain_script_parse_error_is_fatal() {
        let err = load_migration("ALTER TABLE movies ADD COLUMN;").unwrap_err();
        assert!(matches!(err, LoadError::Split(_)), "got {err:?}");
    }

    #[test]
    fn test_notransaction_option() {
        let m = load_migration(
            "-- +migrate Up notransaction\nCREATE INDEX CONCURRENTLY i ON t (c);\n-- +migrate Down\nDROP INDEX i;\n",
        )
        .expect("load failed");
        assert!(m.disable_transaction_up);
        assert!(!m.disable_transaction_down);
        assert!(!m.in_transaction(MigrationDirection::Up));
        assert!(m.in_transaction(MigrationDirection::Down));
    }

    #[test]
    fn test_statement_block_keeps_inner_semicolons() {
        let sql = "-- +migrate Up\n\
                   -- +migrate StatementBegin\n\
                   CREATE FUNCTION f() RETURNS int AS $$\n\
                   BEGIN\n\
                   RETURN 1;\n\
                   END;\n\
                   $$ LANGUAGE plpgsql;\n\
                   -- +migrate StatementEnd\n\
                   SELECT 2;\n";
        let m = load_migration(sql).expect("load failed");
        assert_eq!(m.up_statements.len(), 2);
        assert!(m.up_statements[0].starts_with("CREATE FUNCTION"));
        assert!(m.up_statements[0].contains("RETURN 1;\nEND;\n"));
        assert_eq!(m.up_statements[1], "SELECT 2;\n");
    }

    #[test]
    fn test_unclosed_statement_block() {
        let err = load_migration("-- +migrate Up\n-- +migrate StatementBegin\nSELECT 1;\n")
            .unwrap_err();
        assert!(matches!(err, LoadError::UnclosedStatementBlock), "got {err:?}");
    }

    #[test]
    fn test_missing_terminator_before_marker() {
        let err = load_migration("-- +migrate Up\nSELECT 1\n-- +migrate Down\nSELECT 2;\n")
            .unwrap_err();
        assert!(matches!(err, LoadError::NoTerminator { line: 3 }), "got {err:?}");
    }

    #[test]
    fn test_missing_terminator_at_end() {
        let err = load_migration("-- +migrate Up\nSELECT 1").unwrap_err();
        assert!(matches!(err, LoadError::NoTerminator { .. }), "got {err:?}");
    }

    #[test]
    fn test_incomplete_command() {
        let err = load_migration("-- +migrate \nSELECT 1;").unwrap_err();
        assert!(matches!(err, LoadError::IncompleteCommand { line: 1 }), "got {err:?}");
    }

    #[test]
    fn test_suppression_comments_are_not_statements() {
        let m = load_migration(
            "-- +migrate Up\n-- pgsafemigrate:nolint\nCREATE INDEX i ON t (c);\n",
        )
        .expect("load failed");
        assert_eq!(m.up_statements, vec!["CREATE INDEX i ON t (c);\n"]);
    }
}
