//! `ADD COLUMN ... NOT NULL` without a default

use crate::parser::ir::{IrNode, Located};
use crate::rules::{MigrationContext, alter_table_check};

pub(super) const DOCUMENTATION: &str =
    "Newly added columns must either define a default value or be nullable.";

pub(super) const EXPLAIN: &str = "high-availability-avoid-required-column\n\
         \n\
         What it detects:\n\
         ALTER TABLE ... ADD COLUMN ... NOT NULL where the column has no\n\
         DEFAULT. Identity and generated columns count as having a default.\n\
         \n\
         Why it's dangerous:\n\
         The statement fails outright on a table that already has rows. On an\n\
         empty table it succeeds, but the previous application version does\n\
         not know about the column and every INSERT it issues fails with a\n\
         not-null violation.\n\
         \n\
         Example (bad):\n\
           ALTER TABLE movies ADD COLUMN rating integer NOT NULL;\n\
         \n\
         Fix:\n\
           ALTER TABLE movies ADD COLUMN rating integer NOT NULL DEFAULT 0;\n\
         or add the column as nullable and backfill it.";

pub(super) fn check(stmt: &Located<IrNode>, _ctx: &MigrationContext<'_>) -> bool {
    alter_table_check::added_columns(stmt).any(|(_, col)| col.not_null && !col.has_default)
}

#[cfg(test)]
mod tests {
    use crate::rules::BuiltinRule;
    use crate::rules::test_helpers::check_first;

    const RULE: BuiltinRule = BuiltinRule::RequiredColumn;

    #[test]
    fn test_fires_on_not_null_without_default() {
        assert!(check_first(
            &RULE,
            "ALTER TABLE movies ADD COLUMN rating integer NOT NULL;",
            true
        ));
    }

    #[test]
    fn test_fires_when_any_added_column_is_required() {
        assert!(check_first(
            &RULE,
            "ALTER TABLE movies ADD COLUMN a text, ADD COLUMN b text NOT NULL;",
            true
        ));
    }

    #[test]
    fn test_no_finding_with_default_or_nullable() {
        for sql in [
            "ALTER TABLE movies ADD COLUMN rating integer NOT NULL DEFAULT 0;",
            "ALTER TABLE movies ADD COLUMN rating integer;",
            "ALTER TABLE movies ADD COLUMN id bigint NOT NULL GENERATED ALWAYS AS IDENTITY;",
        ] {
            assert!(!check_first(&RULE, sql, true), "{sql}");
        }
    }

    #[test]
    fn test_ignores_create_table() {
        assert!(!check_first(
            &RULE,
            "CREATE TABLE movies (id bigint NOT NULL);",
            true
        ));
    }
}
