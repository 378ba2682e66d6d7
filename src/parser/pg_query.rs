//! pg_query AST to IR conversion
//!
//! This module converts the pg_query crate's PostgreSQL AST into the simplified
//! IR layer used by the rule engine, splits scripts into standalone statements,
//! and exposes the raw scanner token stream used by the comment scanner.

use crate::parser::ir::{
    AlterTable, AlterTableAction, ColumnDef, CommentOnColumn, CreateIndex, DropIndex, IrNode,
    Located, QualifiedName, RenameTable, SourceSpan, TableConstraint, TransactionKind,
};
use pg_query::NodeEnum;
use pg_query::protobuf::{
    AlterTableType, ConstrType, NullTestType, ObjectType, Token, TransactionStmtKind,
};


/// Classification of a scanner token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `-- ...` comment.
    LineComment,
    /// `/* ... */` comment.
    BlockComment,
    /// Any token that is part of a statement (keyword, identifier, `;`, ...).
    Sql,
}

impl TokenKind {
    pub fn is_comment(&self) -> bool {
        !matches!(self, TokenKind::Sql)
    }
}

/// One token of the scanner stream, with byte offsets into the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedToken {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

/// Run the PostgreSQL scanner over `sql` and classify every token.
///
/// The scanner does not need syntactically valid SQL, only lexically valid
/// input (an unterminated quote or comment is still an error).
pub fn scan_tokens(sql: &str) -> Result<Vec<ScannedToken>, pg_query::Error> {
    let result = pg_query::scan(sql)?;
    Ok(result
        .tokens
        .iter()
        .map(|t| ScannedToken {
            kind: match t.token() {
                Token::SqlComment => TokenKind::LineComment,
                Token::CComment => TokenKind::BlockComment,
                _ => TokenKind::Sql,
            },
            start: t.start.max(0) as usize,
            end: t.end.max(0) as usize,
        })
        .collect())
}

/// Parse a SQL string into a list of located IR nodes.
///
/// Fails as a whole when any statement in `source` does not parse; callers
/// that need per-statement recovery split the script first. Statements that
/// parse but have no IR mapping (e.g. GRANT, SELECT) come back as `Ignored`.
pub fn parse_statements(source: &str) -> Result<Vec<Located<IrNode>>, pg_query::Error> {
    let result = pg_query::parse(source)?;
    let mut nodes = Vec::new();

    for raw_stmt in &result.protobuf.stmts {
        let (start_offset, end_offset) = statement_bounds(source, raw_stmt);
        let raw_sql = source.get(start_offset..end_offset).unwrap_or("");

        let node = match raw_stmt.stmt.as_ref().and_then(|s| s.node.as_ref()) {
            Some(node_enum) => convert_node(node_enum, raw_sql),
            None => IrNode::Ignored {
                raw_sql: raw_sql.to_string(),
            },
        };

        nodes.push(Located {
            node,
            span: SourceSpan {
                start_offset,
                end_offset,
            },
        });
    }

    Ok(nodes)
}

/// Split a multi-statement script into standalone statements.
///
/// Each statement keeps its terminating `;`, loses its comments, and is
/// re-parsed on its own to make sure stripping comments left valid SQL.
///
/// ```text
/// SELECT 1; SELECT 2; -- note
/// SELECT 3;
/// ```
/// yields `["SELECT 1;", "SELECT 2;", "SELECT 3;"]`.
pub fn split_statements(source: &str) -> Result<Vec<String>, pg_query::Error> {
    let result = pg_query::parse(source)?;
    let mut statements = Vec::new();

    for raw_stmt in &result.protobuf.stmts {
        let (start, end) = statement_bounds(source, raw_stmt);
        let end = if source.as_bytes().get(end) == Some(&b';') {
            end + 1
        } else {
            end
        };
        let Some(text) = source.get(start..end) else {
            continue;
        };

        let stripped = strip_comments(text)?;
        let stmt = stripped.trim();
        if stmt.is_empty() {
            continue;
        }
        pg_query::parse(stmt)?;
        statements.push(stmt.to_string());
    }

    Ok(statements)
}

/// Remove every comment token from `sql`. Block comments become a single
/// space so that the tokens around them stay separated.
fn strip_comments(sql: &str) -> Result<String, pg_query::Error> {
    let mut out = sql.to_string();
    for token in scan_tokens(sql)?.iter().rev() {
        let replacement = match token.kind {
            TokenKind::LineComment => "",
            TokenKind::BlockComment => " ",
            TokenKind::Sql => continue,
        };
        if token.end <= out.len() && out.is_char_boundary(token.start) {
            out.replace_range(token.start..token.end, replacement);
        }
    }
    Ok(out)
}

/// Byte range of a raw statement. A zero length means "until end of input".
fn statement_bounds(source: &str, raw_stmt: &pg_query::protobuf::RawStmt) -> (usize, usize) {
    let start = (raw_stmt.stmt_location.max(0) as usize).min(source.len());
    let end = if raw_stmt.stmt_len > 0 {
        (start + raw_stmt.stmt_len as usize).min(source.len())
    } else {
        source.len()
    };
    (start, end)
}

/// Convert a pg_query `NodeEnum` into an IR node.
fn convert_node(node: &NodeEnum, raw_sql: &str) -> IrNode {
    let ignored = || IrNode::Ignored {
        raw_sql: raw_sql.to_string(),
    };

    match node {
        NodeEnum::IndexStmt(idx) => IrNode::CreateIndex(convert_create_index(idx)),
        NodeEnum::DropStmt(drop) if drop.remove_type() == ObjectType::ObjectIndex => {
            IrNode::DropIndex(convert_drop_index(drop))
        }
        NodeEnum::AlterTableStmt(alter) if alter.objtype() == ObjectType::ObjectTable => {
            convert_alter_table(alter).unwrap_or_else(ignored)
        }
        NodeEnum::RenameStmt(rename) if rename.rename_type() == ObjectType::ObjectTable => {
            IrNode::RenameTable(RenameTable {
                name: relation_to_qualified_name(rename.relation.as_ref()),
                new_name: rename.newname.clone(),
            })
        }
        NodeEnum::CommentStmt(comment) if comment.objtype() == ObjectType::ObjectColumn => {
            convert_comment_on_column(comment).unwrap_or_else(ignored)
        }
        NodeEnum::TransactionStmt(txn) => IrNode::Transaction(convert_transaction_kind(txn.kind())),
        _ => ignored(),
    }
}

// ---------------------------------------------------------------------------
// Indexes
// ---------------------------------------------------------------------------

fn convert_create_index(idx: &pg_query::protobuf::IndexStmt) -> CreateIndex {
    CreateIndex {
        index_name: optional_name(&idx.idxname),
        table_name: relation_to_qualified_name(idx.relation.as_ref()),
        unique: idx.unique,
        concurrent: idx.concurrent,
        if_not_exists: idx.if_not_exists,
    }
}

/// `DROP INDEX a, s.b` lists each target as a `List` of `String` nodes.
fn convert_drop_index(drop: &pg_query::protobuf::DropStmt) -> DropIndex {
    let names = drop
        .objects
        .iter()
        .filter_map(|obj| match obj.node.as_ref() {
            Some(NodeEnum::List(list)) => name_from_parts(&string_items(&list.items)),
            _ => None,
        })
        .collect();

    DropIndex {
        names,
        concurrent: drop.concurrent,
        if_exists: drop.missing_ok,
    }
}

// ---------------------------------------------------------------------------
// ALTER TABLE
// ---------------------------------------------------------------------------

/// Returns `None` when no command produced an action worth modelling.
fn convert_alter_table(alter: &pg_query::protobuf::AlterTableStmt) -> Option<IrNode> {
    let actions: Vec<AlterTableAction> = alter
        .cmds
        .iter()
        .filter_map(|cmd_node| match cmd_node.node.as_ref() {
            Some(NodeEnum::AlterTableCmd(cmd)) => Some(convert_alter_table_cmd(cmd)),
            _ => None,
        })
        .collect();

    if actions.is_empty() {
        return None;
    }

    Some(IrNode::AlterTable(AlterTable {
        name: relation_to_qualified_name(alter.relation.as_ref()),
        actions,
    }))
}

fn convert_alter_table_cmd(cmd: &pg_query::protobuf::AlterTableCmd) -> AlterTableAction {
    let def = cmd.def.as_ref().and_then(|d| d.node.as_ref());
    match (cmd.subtype(), def) {
        (AlterTableType::AtAddColumn, Some(NodeEnum::ColumnDef(col))) => {
            AlterTableAction::AddColumn(convert_column_def(col))
        }
        (AlterTableType::AtSetNotNull, _) => AlterTableAction::SetNotNull {
            column_name: cmd.name.clone(),
        },
        (AlterTableType::AtAddConstraint, Some(NodeEnum::Constraint(con))) => {
            AlterTableAction::AddConstraint(convert_table_constraint(con))
        }
        (subtype, _) => AlterTableAction::Other {
            description: format!("{:?}", subtype),
        },
    }
}

fn convert_column_def(col: &pg_query::protobuf::ColumnDef) -> ColumnDef {
    let mut not_null = false;
    let mut has_default = col.raw_default.is_some();

    for con_node in &col.constraints {
        let Some(NodeEnum::Constraint(con)) = con_node.node.as_ref() else {
            continue;
        };
        match con.contype() {
            ConstrType::ConstrNotnull | ConstrType::ConstrPrimary => not_null = true,
            ConstrType::ConstrDefault | ConstrType::ConstrIdentity | ConstrType::ConstrGenerated => {
                has_default = true
            }
            _ => {}
        }
    }

    ColumnDef {
        name: col.colname.clone(),
        not_null,
        has_default,
    }
}

fn convert_table_constraint(con: &pg_query::protobuf::Constraint) -> TableConstraint {
    let name = optional_name(&con.conname);
    if con.contype() != ConstrType::ConstrCheck {
        return TableConstraint::Other { name };
    }

    let not_null_column = con
        .raw_expr
        .as_ref()
        .and_then(|expr| match expr.node.as_ref() {
            Some(NodeEnum::NullTest(test)) if test.nulltesttype() == NullTestType::IsNotNull => {
                test.arg.as_ref().and_then(|arg| match arg.node.as_ref() {
                    Some(NodeEnum::ColumnRef(col_ref)) => {
                        string_items(&col_ref.fields).last().cloned()
                    }
                    _ => None,
                })
            }
            _ => None,
        });

    TableConstraint::Check {
        name,
        not_valid: con.skip_validation,
        not_null_column,
    }
}

// ---------------------------------------------------------------------------
// COMMENT ON COLUMN
// ---------------------------------------------------------------------------

/// The object of `COMMENT ON COLUMN` is a list of names ending in
/// `table, column`, optionally preceded by a schema.
fn convert_comment_on_column(comment: &pg_query::protobuf::CommentStmt) -> Option<IrNode> {
    let parts = match comment.object.as_ref().and_then(|o| o.node.as_ref()) {
        Some(NodeEnum::List(list)) => string_items(&list.items),
        _ => return None,
    };
    let (column_name, table_parts) = parts.split_last()?;
    let table_name = name_from_parts(table_parts)?;

    Some(IrNode::CommentOnColumn(CommentOnColumn {
        table_name,
        column_name: column_name.clone(),
        comment: comment.comment.clone(),
    }))
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

fn convert_transaction_kind(kind: TransactionStmtKind) -> TransactionKind {
    match kind {
        TransactionStmtKind::TransStmtBegin | TransactionStmtKind::TransStmtStart => {
            TransactionKind::Begin
        }
        TransactionStmtKind::TransStmtCommit => TransactionKind::Commit,
        TransactionStmtKind::TransStmtRollback => TransactionKind::Rollback,
        _ => TransactionKind::Other,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Convert a name to `Option<String>`, treating empty strings as `None`.
fn optional_name(name: &str) -> Option<String> {
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn relation_to_qualified_name(rv: Option<&pg_query::protobuf::RangeVar>) -> QualifiedName {
    match rv {
        Some(rv) if !rv.schemaname.is_empty() => {
            QualifiedName::qualified(rv.schemaname.clone(), rv.relname.clone())
        }
        Some(rv) => QualifiedName::unqualified(rv.relname.clone()),
        None => QualifiedName::unqualified(""),
    }
}

/// Collect the `sval` of every `String` node in a list.
fn string_items(items: &[pg_query::protobuf::Node]) -> Vec<String> {
    items
        .iter()
        .filter_map(|n| match n.node.as_ref() {
            Some(NodeEnum::String(s)) => Some(s.sval.clone()),
            _ => None,
        })
        .collect()
}

/// Build a name from `[..., schema, name]`; a catalog prefix is dropped.
fn name_from_parts(parts: &[String]) -> Option<QualifiedName> {
    match parts {
        [] => None,
        [name] => Some(QualifiedName::unqualified(name.clone())),
        [.., schema, name] => Some(QualifiedName::qualified(schema.clone(), name.clone())),
    }
}
