//! Transaction control inside the migration transaction

use crate::parser::ir::{IrNode, Located};
use crate::rules::MigrationContext;

pub(super) const DOCUMENTATION: &str = "Nested transactions are not supported in PostgreSQL.";

pub(super) const EXPLAIN: &str = "transactions-no-nested-transactions\n\
         \n\
         What it detects:\n\
         BEGIN, START TRANSACTION, COMMIT or ROLLBACK in a migration direction\n\
         that already runs inside the implicit migration transaction.\n\
         \n\
         Why it's dangerous:\n\
         PostgreSQL has no nested transactions. A BEGIN only emits a warning,\n\
         but a COMMIT or ROLLBACK ends the migration tool's own transaction\n\
         early, so later statements run outside it and a failure can no longer\n\
         be rolled back as a unit.\n\
         \n\
         Fix:\n\
         Remove the explicit transaction statements, or mark the direction\n\
         notransaction if the migration manages its own transactions:\n\
           -- +migrate Up notransaction";

pub(super) fn check(stmt: &Located<IrNode>, ctx: &MigrationContext<'_>) -> bool {
    ctx.in_transaction && matches!(&stmt.node, IrNode::Transaction(kind) if kind.is_block_control())
}
