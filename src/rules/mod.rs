//! Rule catalog, registry and engine
//!
//! Each rule implements the `Rule` trait and decides, for a single parsed
//! statement, whether the statement is unsafe. Rules see the sibling
//! statements of the same migration direction and whether that direction
//! runs inside a transaction.

use std::path::Path;
use std::sync::Arc;

use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, IntoStaticStr};

use crate::input::MigrationDirection;
use crate::parser::ir::{IrNode, Located};

#[cfg(test)]
pub mod test_helpers;

pub mod alter_table_check;
pub mod engine;
pub mod finding;
pub mod rule_set;

mod column_comment;
mod concurrent_index_in_transaction;
mod index_if_not_exists;
mod index_name_required;
mod nested_transactions;
mod non_concurrent_index_creation;
mod non_concurrent_index_drop;
mod required_column;
mod set_not_null;
mod table_rename;

pub use engine::EngineError;
pub use finding::{PARSE_ERROR_ALIAS, ParseError, ReportedError, StatementResult, Violation};
pub use rule_set::{RegistryError, RuleSet};

/// Rule family. Every alias starts with its category followed by `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Category {
    HighAvailability,
    Maintainability,
    Transactions,
}

impl Category {
    /// Recover the category from a rule alias.
    pub fn from_alias(alias: &str) -> Option<Self> {
        Self::iter().find(|c| {
            alias
                .strip_prefix(c.as_ref())
                .is_some_and(|rest| rest.starts_with('-'))
        })
    }

    /// Human-readable name, e.g. `High Availability`.
    pub fn title(&self) -> String {
        self.as_ref()
            .split('-')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Context available to rules while a statement is evaluated.
pub struct MigrationContext<'a> {
    pub direction: MigrationDirection,

    /// Every successfully parsed statement of the current direction,
    /// the one under evaluation included.
    pub statements: &'a [Located<IrNode>],

    /// Whether the direction runs inside the implicit migration transaction.
    pub in_transaction: bool,

    /// Raw text of the statement currently evaluated.
    pub raw_sql: &'a str,

    /// The migration file being linted.
    pub file: &'a Path,
}

/// Trait that every rule implements.
pub trait Rule: Send + Sync {
    /// Unique identifier, `<category>-<code>`.
    fn alias(&self) -> &str;

    /// One-line guidance shown next to every violation.
    fn documentation(&self) -> &str;

    /// Detailed explanation for `explain`: failure mode, example and fix.
    fn explain(&self) -> &str;

    /// Return true when `stmt` violates the rule. Rules never fail.
    fn check(&self, stmt: &Located<IrNode>, ctx: &MigrationContext<'_>) -> bool;

    fn category(&self) -> Option<Category> {
        Category::from_alias(self.alias())
    }
}

/// The built-in rule catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, IntoStaticStr)]
pub enum BuiltinRule {
    /// `CREATE INDEX` without `CONCURRENTLY`.
    #[strum(serialize = "high-availability-avoid-non-concurrent-index-creation")]
    NonConcurrentIndexCreation,
    /// `DROP INDEX` without `CONCURRENTLY`.
    #[strum(serialize = "high-availability-avoid-non-concurrent-index-drop")]
    NonConcurrentIndexDrop,
    /// `ALTER TABLE ... RENAME TO`.
    #[strum(serialize = "high-availability-avoid-table-rename")]
    TableRename,
    /// `ADD COLUMN ... NOT NULL` without a default.
    #[strum(serialize = "high-availability-avoid-required-column")]
    RequiredColumn,
    /// `SET NOT NULL` without a prior `NOT VALID` check constraint.
    #[strum(serialize = "high-availability-alter-column-not-null-exclusive-lock")]
    SetNotNull,
    /// Transaction control inside the migration transaction.
    #[strum(serialize = "transactions-no-nested-transactions")]
    NestedTransactions,
    /// Concurrent index operations inside a transaction.
    #[strum(
        serialize = "transactions-concurrent-index-operation-cannot-be-executed-in-transaction"
    )]
    ConcurrentIndexInTransaction,
    /// Index create/drop outside a transaction without `IF [NOT] EXISTS`.
    #[strum(serialize = "transactions-index-if-not-exists-missing")]
    IndexIfNotExists,
    /// `CREATE INDEX` without a name.
    #[strum(serialize = "maintainability-indexes-name-is-required")]
    IndexNameRequired,
    /// Added columns without a `COMMENT ON COLUMN`.
    #[strum(serialize = "maintainability-describe-new-column-with-comment")]
    ColumnComment,
}

impl From<BuiltinRule> for Arc<dyn Rule> {
    fn from(value: BuiltinRule) -> Self {
        Arc::new(value)
    }
}

impl Rule for BuiltinRule {
    fn alias(&self) -> &str {
        let alias: &'static str = (*self).into();
        alias
    }

    fn documentation(&self) -> &str {
        match *self {
            Self::NonConcurrentIndexCreation => non_concurrent_index_creation::DOCUMENTATION,
            Self::NonConcurrentIndexDrop => non_concurrent_index_drop::DOCUMENTATION,
            Self::TableRename => table_rename::DOCUMENTATION,
            Self::RequiredColumn => required_column::DOCUMENTATION,
            Self::SetNotNull => set_not_null::DOCUMENTATION,
            Self::NestedTransactions => nested_transactions::DOCUMENTATION,
            Self::ConcurrentIndexInTransaction => concurrent_index_in_transaction::DOCUMENTATION,
            Self::IndexIfNotExists => index_if_not_exists::DOCUMENTATION,
            Self::IndexNameRequired => index_name_required::DOCUMENTATION,
            Self::ColumnComment => column_comment::DOCUMENTATION,
        }
    }

    fn explain(&self) -> &str {
        match *self {
            Self::NonConcurrentIndexCreation => non_concurrent_index_creation::EXPLAIN,
            Self::NonConcurrentIndexDrop => non_concurrent_index_drop::EXPLAIN,
            Self::TableRename => table_rename::EXPLAIN,
            Self::RequiredColumn => required_column::EXPLAIN,
            Self::SetNotNull => set_not_null::EXPLAIN,
            Self::NestedTransactions => nested_transactions::EXPLAIN,
            Self::ConcurrentIndexInTransaction => concurrent_index_in_transaction::EXPLAIN,
            Self::IndexIfNotExists => index_if_not_exists::EXPLAIN,
            Self::IndexNameRequired => index_name_required::EXPLAIN,
            Self::ColumnComment => column_comment::EXPLAIN,
        }
    }

    fn check(&self, stmt: &Located<IrNode>, ctx: &MigrationContext<'_>) -> bool {
        match *self {
            Self::NonConcurrentIndexCreation => non_concurrent_index_creation::check(stmt, ctx),
            Self::NonConcurrentIndexDrop => non_concurrent_index_drop::check(stmt, ctx),
            Self::TableRename => table_rename::check(stmt, ctx),
            Self::RequiredColumn => required_column::check(stmt, ctx),
            Self::SetNotNull => set_not_null::check(stmt, ctx),
            Self::NestedTransactions => nested_transactions::check(stmt, ctx),
            Self::ConcurrentIndexInTransaction => concurrent_index_in_transaction::check(stmt, ctx),
            Self::IndexIfNotExists => index_if_not_exists::check(stmt, ctx),
            Self::IndexNameRequired => index_name_required::check(stmt, ctx),
            Self::ColumnComment => column_comment::check(stmt, ctx),
        }
    }
}

/// Registry of every available rule.
///
/// Built once at startup and passed by reference; read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct RuleRegistry {
    rules: RuleSet,
}

impl RuleRegistry {
    /// Create a new empty rule registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in catalog.
    pub fn with_defaults() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register_defaults()?;
        Ok(registry)
    }

    /// Register all built-in rules.
    pub fn register_defaults(&mut self) -> Result<(), RegistryError> {
        BuiltinRule::iter().try_for_each(|r| self.register(r.into()))
    }

    /// Register a single rule. Fails when the alias is already taken.
    pub fn register(&mut self, rule: Arc<dyn Rule>) -> Result<(), RegistryError> {
        self.rules.add(rule)
    }

    pub fn get(&self, alias: &str) -> Option<&dyn Rule> {
        self.rules.get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.rules.contains(alias)
    }

    /// Iterate all rules in alias order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter()
    }

    /// An owned copy of the full catalog.
    pub fn all(&self) -> RuleSet {
        self.rules.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_helpers::FixedRule;

    #[test]
    fn test_category_from_alias() {
        assert_eq!(
            Category::from_alias("high-availability-avoid-table-rename"),
            Some(Category::HighAvailability)
        );
        assert_eq!(
            Category::from_alias("transactions-no-nested-transactions"),
            Some(Category::Transactions)
        );
        assert_eq!(
            Category::from_alias("maintainability-indexes-name-is-required"),
            Some(Category::Maintainability)
        );
        assert_eq!(Category::from_alias("transactionsno-nested"), None);
        assert_eq!(Category::from_alias("parse-error"), None);
    }

    #[test]
    fn test_category_title() {
        assert_eq!(Category::HighAvailability.title(), "High Availability");
        assert_eq!(Category::Transactions.title(), "Transactions");
    }

    #[test]
    fn test_builtin_aliases_carry_a_category() {
        for rule in BuiltinRule::iter() {
            assert!(rule.category().is_some(), "{} has no category", rule.alias());
        }
    }

    #[test]
    fn test_all_rules_have_documentation() {
        let registry = RuleRegistry::with_defaults().expect("defaults");
        assert_eq!(registry.iter().count(), 10);

        for rule in registry.iter() {
            let alias = rule.alias();
            let docs = rule.documentation();
            assert!(docs.len() > 10, "{alias} documentation too short: {docs:?}");
            assert!(docs.ends_with('.'), "{alias} documentation should be a sentence");
        }
    }

    #[test]
    fn test_all_rules_have_valid_explain() {
        let registry = RuleRegistry::with_defaults().expect("defaults");

        for rule in registry.iter() {
            let alias = rule.alias();
            let explain = rule.explain();
            assert!(explain.len() > 20, "{alias} explain text too short");
            assert!(
                explain.contains(alias),
                "{alias} explain text should reference its own alias"
            );
        }
    }

    #[test]
    fn test_registry_iterates_in_alias_order() {
        let registry = RuleRegistry::with_defaults().expect("defaults");
        let aliases: Vec<&str> = registry.iter().map(|r| r.alias()).collect();
        let mut sorted = aliases.clone();
        sorted.sort_unstable();
        assert_eq!(aliases, sorted);
        assert_eq!(aliases[0], "high-availability-alter-column-not-null-exclusive-lock");
    }

    #[test]
    fn test_registering_a_duplicate_alias_fails() {
        let mut registry = RuleRegistry::with_defaults().expect("defaults");
        let err = registry
            .register(Arc::new(FixedRule::new("transactions-no-nested-transactions", true)))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateAlias(ref alias) if alias == "transactions-no-nested-transactions"
        ));
        assert_eq!(registry.iter().count(), 10);
    }

    #[test]
    fn test_register_defaults_twice_fails() {
        let mut registry = RuleRegistry::with_defaults().expect("defaults");
        assert!(registry.register_defaults().is_err());
    }

    #[test]
    fn test_external_rule_registration() {
        let mut registry = RuleRegistry::with_defaults().expect("defaults");
        registry
            .register(Arc::new(FixedRule::new("maintainability-custom", false)))
            .expect("register");
        assert!(registry.contains("maintainability-custom"));
        assert_eq!(
            registry.get("maintainability-custom").and_then(|r| r.category()),
            Some(Category::Maintainability)
        );
        assert!(registry.get("unknown").is_none());
    }
}
