//! Import injection into a parenthesized import block.
//!
//! The injector guarantees a required import path appears exactly once:
//!
//! 1. If `"<path>"` already occurs anywhere in the file, nothing changes.
//! 2. Otherwise it is inserted on its own line right after the anchor import
//!    (a known sibling, matched even when aliased).
//! 3. Without an anchor it goes right before the block's closing `)`.
//! 4. Without an import block the file is left untouched and the caller
//!    reports a warning.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::text::{byte_offset_to_line, indentation};

/// Required import plus the sibling it should follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportSpec {
    /// Import path, unquoted.
    pub path: String,
    /// Import path of the anchor sibling, unquoted.
    pub anchor: String,
}

impl Default for ImportSpec {
    fn default() -> Self {
        ImportSpec {
            path: "gamelink/internal/repository".to_string(),
            anchor: "gamelink/internal/model".to_string(),
        }
    }
}

impl ImportSpec {
    pub fn new(path: impl Into<String>, anchor: impl Into<String>) -> Self {
        ImportSpec {
            path: path.into(),
            anchor: anchor.into(),
        }
    }

    fn quoted_path(&self) -> String {
        format!("\"{}\"", self.path)
    }

    fn quoted_anchor(&self) -> String {
        format!("\"{}\"", self.anchor)
    }
}

/// Where (if anywhere) the import ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InjectOutcome {
    /// The path was already in the file; content unchanged.
    AlreadyPresent,
    /// Inserted after the anchor; `line` is the new import's line.
    AfterAnchor { line: u32 },
    /// Anchor missing; inserted before the closing delimiter.
    BeforeClose { line: u32 },
    /// No import block found; content unchanged.
    NoInsertionPoint,
}

impl InjectOutcome {
    /// Whether the content was modified.
    pub fn inserted(&self) -> bool {
        matches!(
            self,
            InjectOutcome::AfterAnchor { .. } | InjectOutcome::BeforeClose { .. }
        )
    }
}

/// Where a new entry can go: byte offset, indentation, line terminator.
type InsertionPoint = (usize, String, &'static str);

/// Byte layout of the first parenthesized import block.
struct ImportBlock {
    /// Offset where the anchor line ends (start of the following line).
    anchor_end: Option<InsertionPoint>,
    /// Offset of the closing `)` line.
    close_start: Option<InsertionPoint>,
}

/// The terminator a line ends with; LF for an unterminated last line.
fn line_terminator(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

fn scan_import_block(content: &str, quoted_anchor: &str) -> Option<ImportBlock> {
    let mut offset = 0;
    let mut in_block = false;
    let mut block = ImportBlock {
        anchor_end: None,
        close_start: None,
    };
    let mut entry_indent = "\t".to_string();

    for line in content.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        let trimmed = line.trim();

        if !in_block {
            if trimmed.starts_with("import (") || trimmed == "import(" {
                in_block = true;
            }
            continue;
        }

        if trimmed == ")" {
            block.close_start = Some((start, entry_indent, line_terminator(line)));
            return Some(block);
        }
        if trimmed.is_empty() {
            continue;
        }
        entry_indent = indentation(line).to_string();
        if block.anchor_end.is_none() && trimmed.ends_with(quoted_anchor) {
            block.anchor_end = Some((offset, entry_indent.clone(), line_terminator(line)));
        }
    }

    // Unterminated block: an anchor is still usable.
    in_block.then_some(block)
}

/// Ensure `spec.path` is imported exactly once.
pub fn inject_import<'a>(content: &'a str, spec: &ImportSpec) -> (Cow<'a, str>, InjectOutcome) {
    let quoted = spec.quoted_path();
    if content.contains(&quoted) {
        tracing::debug!("{} already imported", quoted);
        return (Cow::Borrowed(content), InjectOutcome::AlreadyPresent);
    }

    let Some(block) = scan_import_block(content, &spec.quoted_anchor()) else {
        tracing::debug!("no import block found");
        return (Cow::Borrowed(content), InjectOutcome::NoInsertionPoint);
    };

    let (at, indent, eol, after_anchor) = match (block.anchor_end, block.close_start) {
        (Some((at, indent, eol)), _) => (at, indent, eol, true),
        (None, Some((at, indent, eol))) => {
            tracing::warn!(
                "anchor {} not imported, inserting before closing delimiter",
                spec.quoted_anchor()
            );
            (at, indent, eol, false)
        }
        (None, None) => return (Cow::Borrowed(content), InjectOutcome::NoInsertionPoint),
    };

    let mut out = String::with_capacity(content.len() + indent.len() + quoted.len() + 2);
    out.push_str(&content[..at]);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push_str(eol);
    }
    let line = byte_offset_to_line(&out, out.len());
    out.push_str(&indent);
    out.push_str(&quoted);
    out.push_str(eol);
    out.push_str(&content[at..]);

    let outcome = if after_anchor {
        InjectOutcome::AfterAnchor { line }
    } else {
        InjectOutcome::BeforeClose { line }
    };
    (Cow::Owned(out), outcome)
}
