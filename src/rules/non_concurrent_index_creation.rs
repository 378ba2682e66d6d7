//! `CREATE INDEX` without `CONCURRENTLY`
//!
//! A plain `CREATE INDEX` holds a `SHARE` lock on the table for the whole
//! build, which blocks inserts, updates and deletes.

use crate::parser::ir::{IrNode, Located};
use crate::rules::MigrationContext;

pub(super) const DOCUMENTATION: &str =
    "Non-concurrent index creation will not allow writes while the index is being built.";

pub(super) const EXPLAIN: &str = "high-availability-avoid-non-concurrent-index-creation\n\
         \n\
         What it detects:\n\
         A CREATE INDEX statement that does not use the CONCURRENTLY option.\n\
         \n\
         Why it's dangerous:\n\
         Without CONCURRENTLY, PostgreSQL takes a SHARE lock on the table for\n\
         the entire index build. Reads keep working but every INSERT, UPDATE\n\
         and DELETE waits until the build finishes, which can take minutes on\n\
         large tables.\n\
         \n\
         Example (bad):\n\
           CREATE INDEX idx_movies_title ON movies (title);\n\
         \n\
         Fix:\n\
           -- +migrate Up notransaction\n\
           CREATE INDEX CONCURRENTLY IF NOT EXISTS idx_movies_title ON movies (title);\n\
         \n\
         CONCURRENTLY cannot run inside a transaction, so the migration\n\
         direction must be marked notransaction.";

pub(super) fn check(stmt: &Located<IrNode>, _ctx: &MigrationContext<'_>) -> bool {
    matches!(&stmt.node, IrNode::CreateIndex(ci) if !ci.concurrent)
}

#[cfg(test)]
mod tests {
    use crate::rules::BuiltinRule;
    use crate::rules::test_helpers::check_first;

    const RULE: BuiltinRule = BuiltinRule::NonConcurrentIndexCreation;

    #[test]
    fn test_fires_without_concurrently() {
        assert!(check_first(&RULE, "CREATE INDEX test_idx ON movies(title);", true));
        assert!(check_first(&RULE, "CREATE UNIQUE INDEX ON movies(title);", false));
    }

    #[test]
    fn test_no_finding_with_concurrently() {
        assert!(!check_first(
            &RULE,
            "CREATE INDEX CONCURRENTLY test_idx ON movies(title);",
            false
        ));
    }

    #[test]
    fn test_ignores_other_statements() {
        assert!(!check_first(&RULE, "DROP INDEX test_idx;", true));
        assert!(!check_first(&RULE, "SELECT 1;", true));
    }
}
