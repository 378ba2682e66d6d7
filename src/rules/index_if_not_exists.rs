//! Non-idempotent index operations outside a transaction

use crate::parser::ir::{IrNode, Located};
use crate::rules::MigrationContext;

pub(super) const DOCUMENTATION: &str = "Creating/removing an index outside of a transaction without an IF (NOT) EXISTS option can cause a migration to not be idempotent.";

pub(super) const EXPLAIN: &str = "transactions-index-if-not-exists-missing\n\
         \n\
         What it detects:\n\
         CREATE INDEX without IF NOT EXISTS, or DROP INDEX without IF EXISTS,\n\
         in a migration direction marked notransaction.\n\
         \n\
         Why it's dangerous:\n\
         Without a transaction, a migration that fails halfway leaves the\n\
         statements that already ran in place. A failed CREATE INDEX\n\
         CONCURRENTLY even leaves an invalid index behind. Re-running the\n\
         migration then fails on the index that already exists (or is already\n\
         gone).\n\
         \n\
         Example (bad):\n\
           -- +migrate Up notransaction\n\
           CREATE INDEX CONCURRENTLY idx_movies_title ON movies (title);\n\
         \n\
         Fix:\n\
           -- +migrate Up notransaction\n\
           CREATE INDEX CONCURRENTLY IF NOT EXISTS idx_movies_title ON movies (title);";

pub(super) fn check(stmt: &Located<IrNode>, ctx: &MigrationContext<'_>) -> bool {
    if ctx.in_transaction {
        return false;
    }
    match &stmt.node {
        IrNode::CreateIndex(ci) => !ci.if_not_exists,
        IrNode::DropIndex(di) => !di.if_exists,
        _ => false,
    }
}
