//! `DROP INDEX` without `CONCURRENTLY`

use crate::parser::ir::{IrNode, Located};
use crate::rules::MigrationContext;

pub(super) const DOCUMENTATION: &str =
    "Non-concurrent index drop will not allow writes while the index is being built.";

pub(super) const EXPLAIN: &str = "high-availability-avoid-non-concurrent-index-drop\n\
         \n\
         What it detects:\n\
         A DROP INDEX statement that does not use the CONCURRENTLY option.\n\
         \n\
         Why it's dangerous:\n\
         A plain DROP INDEX acquires an ACCESS EXCLUSIVE lock on the parent\n\
         table. While the lock is queued behind long-running queries, every\n\
         new query on the table waits as well.\n\
         \n\
         Example (bad):\n\
           DROP INDEX idx_movies_title;\n\
         \n\
         Fix:\n\
           -- +migrate Up notransaction\n\
           DROP INDEX CONCURRENTLY IF EXISTS idx_movies_title;";

pub(super) fn check(stmt: &Located<IrNode>, _ctx: &MigrationContext<'_>) -> bool {
    matches!(&stmt.node, IrNode::DropIndex(di) if !di.concurrent)
}
