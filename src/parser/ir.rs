//! Intermediate Representation (IR) for SQL statements
//!
//! The IR layer decouples the parser from the rule engine. It represents
//! only the information the safety rules need, not the full PostgreSQL AST.

use std::fmt;

/// A parsed SQL statement mapped to a high-level operation.
/// Each variant carries only the fields rules need, not the full AST.
#[derive(Debug, Clone, PartialEq)]
pub enum IrNode {
    CreateIndex(CreateIndex),
    DropIndex(DropIndex),
    AlterTable(AlterTable),
    RenameTable(RenameTable),
    CommentOnColumn(CommentOnColumn),
    Transaction(TransactionKind),
    /// SQL that parsed successfully but has no IR mapping (e.g., GRANT, SELECT).
    /// Not an error, just not relevant to any rule.
    Ignored { raw_sql: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    /// `None` for `CREATE INDEX ON t (c)`.
    pub index_name: Option<String>,
    pub table_name: QualifiedName,
    pub unique: bool,
    pub concurrent: bool,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropIndex {
    pub names: Vec<QualifiedName>,
    pub concurrent: bool,
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    pub name: QualifiedName,
    pub actions: Vec<AlterTableAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableAction {
    AddColumn(ColumnDef),
    SetNotNull { column_name: String },
    AddConstraint(TableConstraint),
    /// Catch-all for ALTER TABLE actions we parse but don't model.
    Other { description: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameTable {
    pub name: QualifiedName,
    pub new_name: String,
}

/// `COMMENT ON COLUMN [schema.]table.column IS '...'`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentOnColumn {
    pub table_name: QualifiedName,
    pub column_name: String,
    /// Empty for `IS NULL` and `IS ''`.
    pub comment: String,
}

/// Transaction-control statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// `BEGIN` or `START TRANSACTION`.
    Begin,
    /// `COMMIT` or `END`.
    Commit,
    /// `ROLLBACK` or `ABORT`.
    Rollback,
    /// Savepoints, two-phase commit and friends.
    Other,
}

impl TransactionKind {
    /// True for statements that open or close a transaction block.
    pub fn is_block_control(&self) -> bool {
        matches!(self, Self::Begin | Self::Commit | Self::Rollback)
    }
}

// --- Supporting types ---

/// Schema-qualified name. `schema` is None for unqualified references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub schema: Option<String>,
    pub name: String,
}

impl QualifiedName {
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// Returns the name used to match statements against each other.
    /// Ignores the schema: migrations rarely mix qualified and unqualified
    /// references to the same table within one direction.
    pub fn lookup_key(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(s) => write!(f, "{}.{}", s, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    /// Explicit `NOT NULL` (or `PRIMARY KEY`) on the column.
    pub not_null: bool,
    /// `DEFAULT`, `GENERATED ... AS IDENTITY` or a generated expression.
    pub has_default: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    Check {
        name: Option<String>,
        /// `NOT VALID` was given.
        not_valid: bool,
        /// Set when the expression is exactly `<column> IS NOT NULL`.
        not_null_column: Option<String>,
    },
    /// Any constraint kind no rule inspects.
    Other { name: Option<String> },
}

/// A parsed statement with its source location.
#[derive(Debug, Clone)]
pub struct Located<T> {
    pub node: T,
    pub span: SourceSpan,
}

/// Location of a statement inside the text handed to the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpan {
    pub start_offset: usize, // byte offset from start of text
    pub end_offset: usize,
}
