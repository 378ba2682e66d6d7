//! Unnamed indexes

use crate::parser::ir::{IrNode, Located};
use crate::rules::MigrationContext;

pub(super) const DOCUMENTATION: &str = "Indexes should be explicitly named.";

pub(super) const EXPLAIN: &str = "maintainability-indexes-name-is-required\n\
         \n\
         What it detects:\n\
         CREATE INDEX without an index name.\n\
         \n\
         Why it matters:\n\
         PostgreSQL generates a name from the table and column names. Later\n\
         migrations that drop or rename the index have to guess that name,\n\
         and IF NOT EXISTS cannot be used without one.\n\
         \n\
         Example (bad):\n\
           CREATE INDEX ON movies (title);\n\
         \n\
         Fix:\n\
           CREATE INDEX idx_movies_title ON movies (title);";

pub(super) fn check(stmt: &Located<IrNode>, _ctx: &MigrationContext<'_>) -> bool {
    match &stmt.node {
        IrNode::CreateIndex(ci) => ci
            .index_name
            .as_deref()
            .is_none_or(|name| name.trim().is_empty()),
        _ => false,
    }
}
