//! `ALTER COLUMN ... SET NOT NULL` without a validated check constraint
//!
//! `SET NOT NULL` scans the whole table under an `ACCESS EXCLUSIVE` lock
//! unless a valid `CHECK (col IS NOT NULL)` constraint already proves the
//! column has no nulls. The safe sequence adds that constraint `NOT VALID`,
//! validates it, then sets the column.

use crate::parser::ir::{AlterTableAction, IrNode, Located, TableConstraint};
use crate::rules::{MigrationContext, alter_table_check};

pub(super) const DOCUMENTATION: &str = "Setting a column as NOT NULL acquires an exclusive lock on the table until the constraint is validated on all table rows.";

pub(super) const EXPLAIN: &str = "high-availability-alter-column-not-null-exclusive-lock\n\
         \n\
         What it detects:\n\
         ALTER TABLE ... ALTER COLUMN ... SET NOT NULL when the same migration\n\
         direction does not add a CHECK (column IS NOT NULL) NOT VALID\n\
         constraint on that table and column.\n\
         \n\
         Why it's dangerous:\n\
         SET NOT NULL holds an ACCESS EXCLUSIVE lock while every row is\n\
         checked. Reads and writes on the table are blocked for the duration\n\
         of the scan.\n\
         \n\
         Example (bad):\n\
           ALTER TABLE movies ALTER COLUMN title SET NOT NULL;\n\
         \n\
         Fix:\n\
           ALTER TABLE movies ADD CONSTRAINT movies_title_nn\n\
             CHECK (title IS NOT NULL) NOT VALID;\n\
           ALTER TABLE movies VALIDATE CONSTRAINT movies_title_nn;\n\
           ALTER TABLE movies ALTER COLUMN title SET NOT NULL;\n\
           ALTER TABLE movies DROP CONSTRAINT movies_title_nn;";

pub(super) fn check(stmt: &Located<IrNode>, ctx: &MigrationContext<'_>) -> bool {
    alter_table_check::alter_actions(stmt).any(|(at, action)| {
        let AlterTableAction::SetNotNull { column_name } = action else {
            return false;
        };
        !alter_table_check::sibling_actions_on(ctx, at.name.lookup_key())
            .any(|sibling| is_not_valid_not_null_check(sibling, column_name))
    })
}

fn is_not_valid_not_null_check(action: &AlterTableAction, column: &str) -> bool {
    matches!(
        action,
        AlterTableAction::AddConstraint(TableConstraint::Check {
            not_valid: true,
            not_null_column: Some(col),
            ..
        }) if col == column
    )
}
