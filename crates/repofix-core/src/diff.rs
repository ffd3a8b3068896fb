//! Unified diff generation for dry runs.

use similar::TextDiff;

/// Unified diff between `old` and `new`, labelled with `label`.
///
/// Returns an empty string when the texts are identical.
pub fn unified_diff(label: &str, old: &str, new: &str) -> String {
    if old == new {
        return String::new();
    }
    let diff = TextDiff::from_lines(old, new);
    let mut unified = diff.unified_diff();
    unified
        .context_radius(3)
        .header(&format!("a/{}", label), &format!("b/{}", label));
    unified.to_string()
}
