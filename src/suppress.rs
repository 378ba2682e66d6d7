//! Suppression directive parsing
//!
//! Parses `nolint` annotations embedded in SQL line comments:
//! - `-- pgsafemigrate:nolint` - suppress every rule
//! - `-- pgsafemigrate:nolint:rule-a` - suppress one rule
//! - `-- pgsafemigrate:nolint:rule-a,rule-b` - suppress several rules
//!
//! An annotation applies to the whole migration direction it appears in.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::annotations::Comment;
use crate::input::MigrationDirection;

/// Namespace every annotation starts with.
pub const NAMESPACE: &str = "pgsafemigrate";

static NOLINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^{NAMESPACE}:nolint(?::([a-z0-9-]+(?:,[a-z0-9-]+)*))?$"
    ))
    .expect("nolint pattern is a valid regex")
});

/// A parsed `nolint` annotation.
///
/// `valid == false` means the comment was not an annotation at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoLint {
    pub valid: bool,
    /// Aliases named by the annotation, in order of appearance, without duplicates.
    pub rule_names: Vec<String>,
}

impl NoLint {
    /// Parse the text of a comment (without the leading `--`).
    ///
    /// Anything that does not match the grammar exactly, including a
    /// trailing `:` with no alias list, is not an annotation.
    pub fn parse(comment: &str) -> Self {
        let Some(captures) = NOLINT_PATTERN.captures(comment.trim()) else {
            return Self::default();
        };

        let mut rule_names: Vec<String> = Vec::new();
        if let Some(list) = captures.get(1) {
            for alias in list.as_str().split(',') {
                if !rule_names.iter().any(|r| r == alias) {
                    rule_names.push(alias.to_string());
                }
            }
        }

        Self {
            valid: true,
            rule_names,
        }
    }

    /// True when this annotation suppresses every rule.
    pub fn excludes_all(&self) -> bool {
        self.valid && self.rule_names.is_empty()
    }
}

/// What a direction's annotations suppress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Exclusion {
    #[default]
    Nothing,
    All,
    Rules(Vec<String>),
}

impl Exclusion {
    fn merge(&mut self, annotation: &NoLint) {
        if !annotation.valid {
            return;
        }
        if annotation.excludes_all() {
            *self = Exclusion::All;
            return;
        }
        match self {
            Exclusion::All => {}
            Exclusion::Nothing => *self = Exclusion::Rules(annotation.rule_names.clone()),
            Exclusion::Rules(names) => {
                for alias in &annotation.rule_names {
                    if !names.contains(alias) {
                        names.push(alias.clone());
                    }
                }
            }
        }
    }

    /// Aliases to exclude, or `None` when every rule is excluded.
    pub fn rule_names(&self) -> Option<&[String]> {
        match self {
            Exclusion::Nothing => Some(&[]),
            Exclusion::All => None,
            Exclusion::Rules(names) => Some(names),
        }
    }
}

/// Suppressions collected from one file, keyed by direction.
#[derive(Debug, Default)]
pub struct Suppressions {
    by_direction: HashMap<MigrationDirection, Exclusion>,
}

impl Suppressions {
    /// Fold every valid annotation into the exclusion of its direction.
    pub fn from_comments(comments: &[Comment]) -> Self {
        let mut suppressions = Self::default();
        for comment in comments {
            if let Some(annotation) = comment.suppression() {
                suppressions
                    .by_direction
                    .entry(comment.direction)
                    .or_default()
                    .merge(annotation);
            }
        }
        suppressions
    }

    pub fn for_direction(&self, direction: MigrationDirection) -> Exclusion {
        self.by_direction.get(&direction).cloned().unwrap_or_default()
    }
}
