//! Diff generation for check mode.

use similar::TextDiff;

/// Unified diff turning `current` into `expected`, with `a/` and `b/`
/// headers naming `path`. Empty when the texts are equal.
#[must_use]
pub fn generate_unified_diff(path: &str, current: &str, expected: &str) -> String {
    if current == expected {
        return String::new();
    }
    TextDiff::from_lines(current, expected)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string()
}
