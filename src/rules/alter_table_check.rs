//! Shared helpers for rules that inspect ALTER TABLE actions.
//!
//! Used by the required-column, set-not-null and column-comment rules, which
//! all look at the actions of the statement under evaluation and, for some,
//! at the other ALTER TABLE statements of the same direction.

use crate::parser::ir::{AlterTable, AlterTableAction, ColumnDef, IrNode, Located};
use crate::rules::MigrationContext;

/// The actions of `stmt` when it is an ALTER TABLE, paired with the statement.
pub fn alter_actions(
    stmt: &Located<IrNode>,
) -> impl Iterator<Item = (&AlterTable, &AlterTableAction)> {
    let alter = match &stmt.node {
        IrNode::AlterTable(at) => Some(at),
        _ => None,
    };
    alter
        .into_iter()
        .flat_map(|at| at.actions.iter().map(move |action| (at, action)))
}

/// Columns added by `stmt`.
pub fn added_columns(stmt: &Located<IrNode>) -> impl Iterator<Item = (&AlterTable, &ColumnDef)> {
    alter_actions(stmt).filter_map(|(at, action)| match action {
        AlterTableAction::AddColumn(col) => Some((at, col)),
        _ => None,
    })
}

/// Every action of every ALTER TABLE in the direction that targets `table_key`.
pub fn sibling_actions_on<'a>(
    ctx: &'a MigrationContext<'_>,
    table_key: &'a str,
) -> impl Iterator<Item = &'a AlterTableAction> {
    ctx.statements
        .iter()
        .flat_map(alter_actions)
        .filter(move |(at, _)| at.name.lookup_key() == table_key)
        .map(|(_, action)| action)
}
