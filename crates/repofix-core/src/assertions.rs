//! Removal of compile-time interface assertions.
//!
//! Generated files end with lines such as
//!
//! ```text
//! var _ repository.RoleRepository = (*RoleRepository)(nil)
//! ```
//!
//! which stop compiling once the concrete type is renamed. The stripper
//! deletes every such line for the configured contract package and then
//! trims blank lines left dangling at the end of the file.

use std::borrow::Cow;

use regex::Regex;
use serde::Serialize;

use crate::error::{FixError, FixResult};
use crate::text::trim_trailing_blank_lines;

/// Matches whole self-check lines for one package namespace.
#[derive(Debug, Clone)]
pub struct AssertionStripper {
    pattern: Regex,
}

/// What a strip pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StripReport {
    /// Number of assertion lines removed.
    pub removed: usize,
    /// 1-indexed line numbers of the removed lines in the input.
    pub lines: Vec<u32>,
    /// Blank lines trimmed from the end of the file afterwards.
    pub trimmed_blank: usize,
}

impl AssertionStripper {
    pub fn new(package: &str) -> FixResult<Self> {
        let pattern = format!(
            r"^\s*var _ {}\.\w+ = \(\*\w+\)\(nil\)\s*$",
            regex::escape(package)
        );
        let pattern = Regex::new(&pattern).map_err(|e| {
            FixError::internal(format!("assertion pattern failed to compile: {}", e))
        })?;
        Ok(AssertionStripper { pattern })
    }

    /// Whether a single line (without its newline) is an assertion.
    pub fn is_assertion(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }

    /// Remove every assertion line from `content`.
    pub fn strip<'a>(&self, content: &'a str) -> (Cow<'a, str>, StripReport) {
        let mut report = StripReport::default();
        let mut out = String::with_capacity(content.len());

        for (index, line) in content.split_inclusive('\n').enumerate() {
            let bare = line.strip_suffix('\n').unwrap_or(line);
            let bare = bare.strip_suffix('\r').unwrap_or(bare);
            if self.is_assertion(bare) {
                report.removed += 1;
                report.lines.push(index as u32 + 1);
            } else {
                out.push_str(line);
            }
        }

        if report.removed == 0 {
            return (Cow::Borrowed(content), report);
        }
        report.trimmed_blank = trim_trailing_blank_lines(&mut out);
        tracing::debug!(
            "removed {} assertion(s), trimmed {} blank line(s)",
            report.removed,
            report.trimmed_blank
        );
        (Cow::Owned(out), report)
    }
}
