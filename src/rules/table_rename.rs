//! `ALTER TABLE ... RENAME TO`

use crate::parser::ir::{IrNode, Located};
use crate::rules::MigrationContext;

pub(super) const DOCUMENTATION: &str =
    "Renaming a table can cause errors in previous application versions.";

pub(super) const EXPLAIN: &str = "high-availability-avoid-table-rename\n\
         \n\
         What it detects:\n\
         ALTER TABLE ... RENAME TO ...\n\
         \n\
         Why it's dangerous:\n\
         During a rolling deploy the previous application version keeps\n\
         querying the old table name. Every such query fails as soon as the\n\
         migration commits.\n\
         \n\
         Example (bad):\n\
           ALTER TABLE movies RENAME TO films;\n\
         \n\
         Fix:\n\
         Create the new table (or a view named after it), migrate readers and\n\
         writers over several releases, then drop the old name once nothing\n\
         uses it.";

pub(super) fn check(stmt: &Located<IrNode>, _ctx: &MigrationContext<'_>) -> bool {
    matches!(stmt.node, IrNode::RenameTable(_))
}
