//! Concurrent index operations inside a transaction

use crate::parser::ir::{IrNode, Located};
use crate::rules::MigrationContext;

pub(super) const DOCUMENTATION: &str =
    "Concurrent index operations cannot be executed inside a transaction.";

pub(super) const EXPLAIN: &str = "transactions-concurrent-index-operation-cannot-be-executed-in-transaction\n\
         \n\
         What it detects:\n\
         CREATE INDEX CONCURRENTLY or DROP INDEX CONCURRENTLY in a migration\n\
         direction that runs inside the implicit migration transaction.\n\
         \n\
         Why it's dangerous:\n\
         PostgreSQL rejects concurrent index operations inside a transaction\n\
         block, so the migration fails at deploy time.\n\
         \n\
         Example (bad):\n\
           -- +migrate Up\n\
           CREATE INDEX CONCURRENTLY idx_movies_title ON movies (title);\n\
         \n\
         Fix:\n\
           -- +migrate Up notransaction\n\
           CREATE INDEX CONCURRENTLY IF NOT EXISTS idx_movies_title ON movies (title);";

pub(super) fn check(stmt: &Located<IrNode>, ctx: &MigrationContext<'_>) -> bool {
    if !ctx.in_transaction {
        return false;
    }
    match &stmt.node {
        IrNode::CreateIndex(ci) => ci.concurrent,
        IrNode::DropIndex(di) => di.concurrent,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::rules::BuiltinRule;
    use crate::rules::test_helpers::check_first;

    const RULE: BuiltinRule = BuiltinRule::ConcurrentIndexInTransaction;

    #[test]
    fn test_fires_in_transaction() {
        assert!(check_first(
            &RULE,
            "CREATE INDEX CONCURRENTLY i ON movies (title);",
            true
        ));
        assert!(check_first(&RULE, "DROP INDEX CONCURRENTLY i;", true));
    }

    #[test]
    fn test_no_finding_outside_transaction() {
        assert!(!check_first(
            &RULE,
            "CREATE INDEX CONCURRENTLY i ON movies (title);",
            false
        ));
        assert!(!check_first(&RULE, "DROP INDEX CONCURRENTLY i;", false));
    }

    #[test]
    fn test_no_finding_for_plain_index_operations() {
        assert!(!check_first(&RULE, "CREATE INDEX i ON movies (title);", true));
        assert!(!check_first(&RULE, "DROP INDEX i;", true));
    }
}
