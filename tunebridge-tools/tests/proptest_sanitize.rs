//! Property-based tests for query sanitization using proptest.

use proptest::prelude::*;

use tunebridge_tools::{MAX_QUERY_LEN, sanitize_query};

/// Letters, numbers, `_`, whitespace (including U+001C..U+001F) and `-.()&`.
fn is_allowed(c: char) -> bool {
    c.is_alphanumeric()
        || c.is_whitespace()
        || ('\u{1C}'..='\u{1F}').contains(&c)
        || matches!(c, '_' | '-' | '.' | '(' | ')' | '&')
}

/// Combining marks, joiners and connector punctuation that sit next to
/// letters in Unicode but must never survive sanitization.
const NON_LETTER_NEIGHBOURS: &[char] = &[
    '\u{0301}', '\u{0308}', '\u{093F}', '\u{200C}', '\u{200D}', '\u{203F}', '\u{2060}',
    '\u{FE0F}', '\u{FE33}',
];

proptest! {
    #[test]
    fn sanitized_length_is_bounded(input in any::<String>()) {
        prop_assert!(sanitize_query(&input).chars().count() <= MAX_QUERY_LEN);
    }

    #[test]
    fn sanitized_has_no_quotes_or_backslashes(input in ".{0,200}") {
        let out = sanitize_query(&input);
        prop_assert!(!out.contains('"'));
        prop_assert!(!out.contains('\''));
        prop_assert!(!out.contains('\\'));
    }

    #[test]
    fn sanitize_is_idempotent(input in any::<String>()) {
        let once = sanitize_query(&input);
        prop_assert_eq!(sanitize_query(&once), once);
    }

    #[test]
    fn ascii_output_stays_in_allowed_set(input in "[ -~]{0,200}") {
        for c in sanitize_query(&input).chars() {
            prop_assert!(is_allowed(c), "unexpected character {:?}", c);
        }
    }

    #[test]
    fn unicode_output_stays_in_allowed_set(input in any::<String>()) {
        for c in sanitize_query(&input).chars() {
            prop_assert!(is_allowed(c), "unexpected character {:?}", c);
            prop_assert!(!NON_LETTER_NEIGHBOURS.contains(&c), "unexpected character {:?}", c);
        }
    }

    #[test]
    fn marks_between_letters_are_dropped(
        word in "[a-z]{1,20}",
        mark in proptest::sample::select(NON_LETTER_NEIGHBOURS),
    ) {
        let input: String = word.chars().flat_map(|c| [c, mark]).collect();
        prop_assert_eq!(sanitize_query(&input), word);
    }

    #[test]
    fn allowed_ascii_text_passes_through(input in "[A-Za-z0-9_ .()&-]{0,100}") {
        prop_assert_eq!(sanitize_query(&input), input);
    }

    #[test]
    fn long_allowed_text_is_a_prefix(input in "[a-z]{101,300}") {
        let out = sanitize_query(&input);
        prop_assert_eq!(out.chars().count(), MAX_QUERY_LEN);
        prop_assert!(input.starts_with(&out));
    }
}
