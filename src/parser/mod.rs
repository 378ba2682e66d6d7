//! SQL parsing, statement splitting and IR generation

pub mod ir;
pub(crate) mod pg_query;

pub use self::pg_query::{
    ScannedToken, TokenKind, parse_statements, scan_tokens, split_statements,
};
pub use ir::{
    AlterTable, AlterTableAction, ColumnDef, CommentOnColumn, CreateIndex, DropIndex, IrNode,
    Located, QualifiedName, RenameTable, SourceSpan, TableConstraint, TransactionKind,
};
