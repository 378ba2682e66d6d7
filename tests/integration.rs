//! Integration tests for the full lint pipeline.

use pg_safe_migrate::annotations::ScanError;
use pg_safe_migrate::input::read_migration_files;
use pg_safe_migrate::output::{FileReport, OutputFormat};
use pg_safe_migrate::{
    AnchorPolicy, LintError, LintPipeline, MigrationDirection, MigrationFile, ReportedError,
    RuleRegistry, StatementResult, lint_migration,
};
use std::path::PathBuf;

const INDEX_CREATION: &str = "high-availability-avoid-non-concurrent-index-creation";
const INDEX_DROP: &str = "high-availability-avoid-non-concurrent-index-drop";
const TABLE_RENAME: &str = "high-availability-avoid-table-rename";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/migrations")
        .join(name)
}

fn registry() -> RuleRegistry {
    RuleRegistry::with_defaults().expect("defaults")
}

/// Lint one fixture file with no global exclusions.
fn lint_fixture(name: &str) -> Result<Vec<StatementResult>, LintError> {
    let files = read_migration_files(&[fixture(name)]).expect("read fixture");
    lint_migration::<&str>(&files[0], &registry(), &[], AnchorPolicy::Marker)
}

fn inline(contents: &str) -> MigrationFile {
    MigrationFile {
        path: PathBuf::from("/migrations/inline.sql"),
        contents: contents.to_string(),
    }
}

fn aliases(results: &[StatementResult]) -> Vec<Vec<&str>> {
    results
        .iter()
        .map(|r| r.errors.iter().map(|e| e.alias()).collect())
        .collect()
}

// ===========================================================================
// Fixture files
// ===========================================================================

#[test]
fn test_clean_fixture_passes() {
    let results = lint_fixture("001_clean.sql").expect("lint");
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.passed), "{results:?}");
}

#[test]
fn test_unsafe_fixture_reports_each_direction() {
    let results = lint_fixture("002_unsafe.sql").expect("lint");
    let directions: Vec<MigrationDirection> = results.iter().map(|r| r.direction).collect();
    assert_eq!(
        directions,
        vec![
            MigrationDirection::Up,
            MigrationDirection::Up,
            MigrationDirection::Down
        ]
    );
    assert_eq!(
        aliases(&results),
        vec![vec![INDEX_CREATION], vec![TABLE_RENAME], vec![TABLE_RENAME]]
    );
}

#[test]
fn test_suppressed_fixture_passes() {
    let results = lint_fixture("003_suppressed.sql").expect("lint");
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.passed), "{results:?}");
}

#[test]
fn test_parse_error_fixture_continues() {
    let results = lint_fixture("004_parse_error.sql").expect("lint");
    assert_eq!(results.len(), 2);
    assert!(matches!(results[0].errors[..], [ReportedError::ParseError(_)]));
    assert_eq!(aliases(&results[1..]), vec![vec![INDEX_DROP]]);
}

#[test]
fn test_misplaced_annotation_fixture_is_fatal() {
    let err = lint_fixture("005_misplaced_annotation.sql").unwrap_err();
    assert!(
        matches!(err, LintError::Scan(ScanError::NotAdjacent { .. })),
        "got {err:?}"
    );
}

#[test]
fn test_annotation_after_statement_fixture_passes() {
    let results = lint_fixture("007_nolint_after_statement.sql").expect("lint");
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.passed), "{results:?}");
}

#[test]
fn test_notransaction_fixture_passes() {
    let results = lint_fixture("006_notransaction.sql").expect("lint");
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.passed), "{results:?}");
}

// ===========================================================================
// Suppression behaviour on unmarked files
// ===========================================================================

#[test]
fn test_unmarked_index_creation_fails() {
    let results = lint_migration::<&str>(
        &inline("CREATE INDEX test_idx ON movies(title);"),
        &registry(),
        &[],
        AnchorPolicy::Marker,
    )
    .expect("lint");
    assert_eq!(results.len(), 1);
    assert!(!results[0].passed);
    assert_eq!(aliases(&results), vec![vec![INDEX_CREATION]]);
}

#[test]
fn test_matching_suppression_passes() {
    let sql = format!("-- pgsafemigrate:nolint:{INDEX_CREATION}\nCREATE INDEX test_idx ON movies(title);");
    let results =
        lint_migration::<&str>(&inline(&sql), &registry(), &[], AnchorPolicy::Marker).expect("lint");
    assert_eq!(results.len(), 1);
    assert!(results[0].passed);
}

#[test]
fn test_unrelated_suppression_still_fails() {
    let sql = format!("-- pgsafemigrate:nolint:{TABLE_RENAME}\nCREATE INDEX test_idx ON movies(title);");
    let suppressed =
        lint_migration::<&str>(&inline(&sql), &registry(), &[], AnchorPolicy::Marker).expect("lint");
    let plain = lint_migration::<&str>(
        &inline("CREATE INDEX test_idx ON movies(title);"),
        &registry(),
        &[],
        AnchorPolicy::Marker,
    )
    .expect("lint");
    assert_eq!(aliases(&suppressed), aliases(&plain));
    assert_eq!(suppressed[0].passed, plain[0].passed);
}

// ===========================================================================
// Pipeline reuse and reporting
// ===========================================================================

#[test]
fn test_pipeline_is_reusable_across_files() {
    let files = read_migration_files(&[fixture("002_unsafe.sql"), fixture("001_clean.sql")])
        .expect("read fixtures");
    let pipeline = LintPipeline::new(&registry(), &[TABLE_RENAME], AnchorPolicy::Marker);

    let reports: Vec<FileReport> = files
        .iter()
        .map(|f| FileReport::new(f.path.clone(), pipeline.lint(f).expect("lint")))
        .collect();

    assert!(!reports[0].passed());
    assert!(reports[1].passed());
    assert_eq!(
        aliases(&reports[0].results),
        vec![vec![INDEX_CREATION], vec![], vec![]]
    );
}

#[test]
fn test_text_report_for_fixture() {
    let files = read_migration_files(&[fixture("002_unsafe.sql")]).expect("read fixture");
    let results = lint_migration::<&str>(&files[0], &registry(), &[], AnchorPolicy::Marker)
        .expect("lint");
    let reports = vec![FileReport::new("migrations/002_unsafe.sql", results)];

    let mut out = Vec::new();
    OutputFormat::Text
        .reporter()
        .emit(&reports, &mut out)
        .expect("emit");
    let text = String::from_utf8(out).expect("utf8");

    assert!(text.starts_with("File migrations/002_unsafe.sql Results:\n"), "{text}");
    assert_eq!(text.matches("violation found for statement").count(), 3);
    assert!(text.contains("\t  ALTER TABLE films RENAME TO movies;\n"), "{text}");
}
