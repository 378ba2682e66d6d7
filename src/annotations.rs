//! Comment scanning
//!
//! Walks the scanner token stream of a migration script, classifies every
//! comment (sql-migrate directive, `nolint` annotation or plain text), tags
//! it with the migration direction active at its position, and checks that
//! every `nolint` annotation sits directly after the token it modifies.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::MigrationDirection;
use crate::input::sql::{command_words, marker_direction};
use crate::parser::{TokenKind, scan_tokens};
use crate::suppress::NoLint;

/// Annotations are only recognised in comments starting exactly like this.
const LINE_COMMENT_PREFIX: &str = "-- ";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("nolint annotation found at token {token_index} is not adjacent to the statement or direction marker it modifies")]
    NotAdjacent { token_index: usize },

    #[error("failed to tokenize SQL: {0}")]
    Tokenize(#[from] pg_query::Error),
}

/// What a suppression annotation may anchor to when a statement token
/// precedes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorPolicy {
    /// The first comment after a direction marker belongs to the marker:
    /// an annotation there must follow the marker directly. Any later
    /// annotation may follow a statement.
    #[default]
    Marker,
    /// An annotation may always follow the nearest statement.
    Statement,
}

/// Classification of a line or block comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentKind {
    /// `-- +migrate Up` or `-- +migrate Down` at the start of a line.
    DirectionMarker,
    /// Any other `-- +migrate` directive (`StatementBegin`, `StatementEnd`).
    Directive,
    /// A valid `nolint` annotation.
    Suppression(NoLint),
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment text without the leading `--` and surrounding whitespace.
    pub content: String,
    /// 1-based position among all scanner tokens, comments included.
    pub token_index: usize,
    pub kind: CommentKind,
    /// Direction active at this comment (its own direction for markers).
    pub direction: MigrationDirection,
}

impl Comment {
    /// The annotation carried by this comment, if it is a valid one.
    pub fn suppression(&self) -> Option<&NoLint> {
        match &self.kind {
            CommentKind::Suppression(nl) => Some(nl),
            _ => None,
        }
    }
}

/// Token preceding the one being scanned.
#[derive(Clone, Copy)]
enum Previous {
    Start,
    Sql,
    Marker,
    Comment,
}

/// Classify a line comment the way the migration loader reads lines:
/// directives must open their line, and only `-- ` comments are annotations.
fn classify_line_comment(raw: &str, at_line_start: bool) -> CommentKind {
    if at_line_start && marker_direction(raw).is_some() {
        return CommentKind::DirectionMarker;
    }
    if at_line_start && command_words(raw).is_some() {
        return CommentKind::Directive;
    }
    let Some(text) = raw.strip_prefix(LINE_COMMENT_PREFIX) else {
        return CommentKind::Plain;
    };
    let annotation = NoLint::parse(text);
    if annotation.valid {
        CommentKind::Suppression(annotation)
    } else {
        CommentKind::Plain
    }
}

/// Scan the comments of `sql` and validate annotation placement.
///
/// Returns comments in source order. A script without comments yields an
/// empty list.
pub fn scan_comments(sql: &str, anchor: AnchorPolicy) -> Result<Vec<Comment>, ScanError> {
    let tokens = scan_tokens(sql)?;

    let mut comments = Vec::new();
    let mut current_direction = MigrationDirection::default();
    // Set by a marker, cleared by the next comment.
    let mut first_after_marker = false;
    let mut previous = Previous::Start;

    for (i, token) in tokens.iter().enumerate() {
        let token_index = i + 1;
        if !token.kind.is_comment() {
            previous = Previous::Sql;
            continue;
        }

        let raw = sql.get(token.start..token.end).unwrap_or("");
        let kind = match token.kind {
            TokenKind::LineComment => {
                let at_line_start =
                    token.start == 0 || sql.get(..token.start).is_some_and(|s| s.ends_with('\n'));
                classify_line_comment(raw, at_line_start)
            }
            _ => CommentKind::Plain,
        };
        let content = match token.kind {
            TokenKind::LineComment => raw.trim_start_matches('-').trim().to_string(),
            _ => raw
                .trim_start_matches("/*")
                .trim_end_matches("*/")
                .trim()
                .to_string(),
        };

        if kind == CommentKind::DirectionMarker {
            current_direction = marker_direction(raw).unwrap_or(current_direction);
        }

        if matches!(kind, CommentKind::Suppression(_)) {
            let anchored = match previous {
                Previous::Start | Previous::Marker => true,
                Previous::Comment => false,
                Previous::Sql => match anchor {
                    AnchorPolicy::Marker => !first_after_marker,
                    AnchorPolicy::Statement => true,
                },
            };
            if !anchored {
                return Err(ScanError::NotAdjacent { token_index });
            }
        }

        if kind == CommentKind::DirectionMarker {
            first_after_marker = true;
            previous = Previous::Marker;
        } else {
            first_after_marker = false;
            previous = Previous::Comment;
        }

        comments.push(Comment {
            content,
            token_index,
            kind,
            direction: current_direction,
        });
    }

    log::debug!("scanned {} comment(s) from {} token(s)", comments.len(), tokens.len());
    Ok(comments)
}
