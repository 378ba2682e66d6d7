//! Added columns without a `COMMENT ON COLUMN`

use crate::parser::ir::{IrNode, Located};
use crate::rules::{MigrationContext, alter_table_check};

pub(super) const DOCUMENTATION: &str =
    "Newly added columns should also include a COMMENT for documentation purposes.";

pub(super) const EXPLAIN: &str = "maintainability-describe-new-column-with-comment\n\
         \n\
         What it detects:\n\
         ALTER TABLE ... ADD COLUMN where at least one added column has no\n\
         non-empty COMMENT ON COLUMN in the same migration direction.\n\
         \n\
         Why it matters:\n\
         Column comments are the schema's own documentation and show up in\n\
         psql and most database tools. Writing them alongside the column is\n\
         much cheaper than reconstructing intent later.\n\
         \n\
         Example (bad):\n\
           ALTER TABLE movies ADD COLUMN released_at date;\n\
         \n\
         Fix:\n\
           ALTER TABLE movies ADD COLUMN released_at date;\n\
           COMMENT ON COLUMN movies.released_at IS 'First theatrical release';";

pub(super) fn check(stmt: &Located<IrNode>, ctx: &MigrationContext<'_>) -> bool {
    alter_table_check::added_columns(stmt)
        .any(|(at, col)| !has_comment(ctx, at.name.lookup_key(), &col.name))
}

fn has_comment(ctx: &MigrationContext<'_>, table_key: &str, column: &str) -> bool {
    ctx.statements.iter().any(|s| match &s.node {
        IrNode::CommentOnColumn(c) => {
            c.table_name.lookup_key() == table_key
                && c.column_name == column
                && !c.comment.trim().is_empty()
        }
        _ => false,
    })
}
