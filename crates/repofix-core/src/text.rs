//! Text position and line utilities.
//!
//! - Lines are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**

// ============================================================================
// Position Conversions
// ============================================================================

/// Convert a byte offset to a 1-indexed line number.
///
/// Offsets past the end of `content` map to the last line.
pub fn byte_offset_to_line(content: &str, offset: usize) -> u32 {
    let offset = offset.min(content.len());
    content.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count() as u32
        + 1
}

// ============================================================================
// Line Utilities
// ============================================================================

/// Count the number of lines in the content.
pub fn line_count(content: &str) -> u32 {
    let newlines = content.bytes().filter(|&b| b == b'\n').count() as u32;
    if content.is_empty() {
        0
    } else if content.ends_with('\n') {
        newlines
    } else {
        newlines + 1
    }
}

/// Leading whitespace of a line.
pub fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Drop blank lines at the end of `content`, keeping a single trailing
/// newline if the content had one.
///
/// Returns the number of blank lines removed.
pub fn trim_trailing_blank_lines(content: &mut String) -> usize {
    let had_newline = content.ends_with('\n');
    let mut removed = 0;
    while !content.is_empty() {
        let body = content.strip_suffix('\n').unwrap_or(content.as_str());
        let last_start = body.rfind('\n').map(|p| p + 1).unwrap_or(0);
        if !body[last_start..].trim().is_empty() {
            break;
        }
        content.truncate(last_start);
        removed += 1;
    }
    if had_newline && !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    removed
}

// ============================================================================
// Tests
// ============================================================================
