//! pg-safe-migrate CLI
//!
//! Entry point for the command-line tool.
//!
//! Exit codes:
//! - 0: Every statement passed
//! - 1: At least one statement failed a rule or could not be parsed
//! - 2: Tool error (config error, unknown rule alias, load failure, I/O error, etc.)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use pg_safe_migrate::config::{self, Config, DEFAULT_CONFIG_FILE};
use pg_safe_migrate::input::read_migration_files;
use pg_safe_migrate::output::{FileReport, OutputFormat};
use pg_safe_migrate::{LintPipeline, RuleRegistry};

#[derive(Parser, Debug)]
#[command(name = "pg-safe-migrate")]
#[command(about = "Detects unsafe statements in PostgreSQL migration files", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lint migration files
    Check {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Comma-separated rule aliases to skip (repeatable)
        #[arg(long, value_delimiter = ',')]
        excluded_rules: Vec<String>,

        /// Override output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Migration files to lint
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List every built-in rule
    ListRules,

    /// Explain a specific rule (e.g. explain transactions-no-nested-transactions)
    Explain {
        alias: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    match run(args) {
        Ok(passed) => {
            if !passed {
                std::process::exit(1);
            }
            // exit 0 is implicit
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(2);
        }
    }
}

/// Dispatch a subcommand.
///
/// Returns `Ok(false)` if any statement failed, `Ok(true)` otherwise, or `Err`
/// on tool errors.
fn run(args: Args) -> Result<bool> {
    let registry = RuleRegistry::with_defaults().context("Failed to register built-in rules")?;

    match args.command {
        Command::Check {
            config,
            excluded_rules,
            format,
            files,
        } => check(&registry, config.as_deref(), excluded_rules, format, &files),
        Command::ListRules => {
            list_rules(&registry)?;
            Ok(true)
        }
        Command::Explain { alias } => {
            explain_rule(&registry, &alias)?;
            Ok(true)
        }
    }
}

fn check(
    registry: &RuleRegistry,
    config_path: Option<&Path>,
    excluded_rules: Vec<String>,
    format: Option<OutputFormat>,
    files: &[PathBuf],
) -> Result<bool> {
    let config = load_config(config_path)?;
    config
        .validate(registry)
        .context("Invalid configuration")?;

    // CLI exclusions add to the configured ones.
    let mut excluded = config.rules.excluded.clone();
    excluded.extend(
        excluded_rules
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty()),
    );
    config::validate_aliases(&excluded, registry).context("Invalid --excluded-rules")?;

    let migrations = read_migration_files(files).context("Failed to load migrations")?;
    let pipeline = LintPipeline::new(registry, &excluded, config.annotations.anchor);

    let mut reports = Vec::with_capacity(migrations.len());
    for migration in &migrations {
        let results = pipeline
            .lint(migration)
            .with_context(|| format!("Failed to lint {}", migration.path.display()))?;
        reports.push(FileReport::new(migration.path.clone(), results));
    }

    let format = format.unwrap_or(config.output.format);
    let stdout = std::io::stdout();
    format
        .reporter()
        .emit(&reports, &mut stdout.lock())
        .with_context(|| format!("Failed to write {format} report"))?;

    let passed = reports.iter().all(FileReport::passed);
    if passed {
        eprintln!("✓ No problems found!");
    } else {
        eprintln!("❌ Problems found.");
    }
    Ok(passed)
}

/// Load configuration from file.
///
/// If `config_path` is `Some`, the user explicitly passed `--config` and the file
/// must exist (error if not found). If `None`, the default config path is used;
/// a missing default config file is not an error (falls back to defaults with a warning).
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Config::from_file(path).context("Failed to load configuration")
        }
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                Config::from_file(default_path).context("Failed to load configuration")
            } else {
                log::warn!(
                    "Config file {} not found, using defaults",
                    default_path.display()
                );
                Ok(Config::default())
            }
        }
    }
}

/// Print category, alias and documentation per rule, columns aligned.
fn list_rules(registry: &RuleRegistry) -> Result<()> {
    let rows: Vec<(String, &str, &str)> = registry
        .iter()
        .map(|rule| {
            let category = rule
                .category()
                .map(|c| c.title())
                .unwrap_or_else(|| "Other".to_string());
            (category, rule.alias(), rule.documentation())
        })
        .collect();
    let category_width = rows.iter().map(|(c, _, _)| c.len()).max().unwrap_or(0);
    let alias_width = rows.iter().map(|(_, a, _)| a.len()).max().unwrap_or(0);

    let mut out = std::io::stdout().lock();
    for (category, alias, documentation) in &rows {
        writeln!(
            out,
            "{category:<category_width$} {alias:<alias_width$} {documentation}"
        )?;
    }
    Ok(())
}

fn explain_rule(registry: &RuleRegistry, alias: &str) -> Result<()> {
    let Some(rule) = registry.get(alias) else {
        anyhow::bail!("Unknown rule: {}", alias);
    };

    println!("Rule: {}", rule.alias());
    if let Some(category) = rule.category() {
        println!("Category: {}", category.title());
    }
    println!("Description: {}", rule.documentation());
    println!();
    println!("{}", rule.explain());
    Ok(())
}
