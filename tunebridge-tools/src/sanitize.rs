//! Query sanitization for text interpolated into AppleScript string literals.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum length, in characters, of a sanitized query.
pub const MAX_QUERY_LEN: usize = 100;

/// Anything outside letters, numbers, `_`, whitespace, `-`, `.`, `(`, `)` and `&`.
///
/// Spelled out by category rather than `\w`: the regex crate's `\w` also
/// admits combining marks, connector punctuation and joiners. The information
/// separators U+001C..U+001F count as whitespace here.
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\p{L}\p{N}_\s\x1C-\x1F\-\.\(\)&]")
        .expect("disallowed-character pattern is valid")
});

/// Sanitize caller-supplied text (track, playlist, or artist names) before it is
/// embedded in a quoted AppleScript literal.
///
/// The steps run in a fixed order:
/// 1. prefix every `"` with a backslash,
/// 2. prefix every `'` with a backslash,
/// 3. delete every character outside the allowed set,
/// 4. keep the first [`MAX_QUERY_LEN`] characters.
///
/// Step 3 runs on the escaped text and neither the backslash nor the quote is
/// in the allowed set, so quotes end up stripped rather than escaped:
/// `He said "hi"` becomes `He said hi`. That ordering is kept as-is; it is the
/// observable contract of every tool that takes free text.
///
/// Never fails; the result may be empty.
pub fn sanitize_query(query: &str) -> String {
    let escaped = query.replace('"', "\\\"").replace('\'', "\\'");
    let filtered = DISALLOWED.replace_all(&escaped, "");
    filtered.chars().take(MAX_QUERY_LEN).collect()
}
