//! Query classification.
//!
//! [`classify`] turns whatever the user typed into a [`SearchIntent`]. It is
//! pure and total: every string maps to exactly one intent.
//!
//! ```
//! use book_scout::models::SearchIntent;
//! use book_scout::query::classify;
//!
//! assert_eq!(
//!     classify("978-89-374-6044-9"),
//!     SearchIntent::IsbnLookup { digits: "9788937460449".to_string() }
//! );
//! ```

use std::ops::RangeInclusive;

use crate::models::SearchIntent;

/// Hangul syllables block. Titles containing these are treated as local-script.
pub const LOCAL_SCRIPT_RANGE: RangeInclusive<char> = '\u{AC00}'..='\u{D7A3}';

/// Field-scoped prefixes understood by full-text providers.
const FIELD_MARKERS: &[&str] = &["intitle:", "inauthor:", "inpublisher:", "subject:", "isbn:"];

/// Parse a raw query string into a search intent.
pub fn classify(raw: &str) -> SearchIntent {
    let trimmed = raw.trim();

    if let Some(digits) = isbn_digits(trimmed) {
        return SearchIntent::IsbnLookup { digits };
    }

    if let Some((title, author)) = trimmed.split_once('/') {
        let author = author.trim();
        if !author.is_empty() {
            return SearchIntent::StructuredQuery {
                title: title.trim().to_string(),
                author: author.to_string(),
            };
        }
    }

    SearchIntent::FullTextQuery {
        text: trimmed.to_string(),
        is_likely_local_script: contains_local_script(trimmed),
    }
}

/// Extract ISBN digits if the input is nothing but a 10 or 13 digit ISBN.
///
/// Hyphens, spaces and a leading `isbn`/`isbn:` marker are ignored.
pub fn isbn_digits(input: &str) -> Option<String> {
    let mut rest = input.trim();
    if rest
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("isbn"))
    {
        rest = rest[4..].trim_start().trim_start_matches(':');
    }

    let compact: String = rest
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();

    let valid_len = compact.len() == 10 || compact.len() == 13;
    if valid_len && compact.chars().all(|c| c.is_ascii_digit()) {
        Some(compact)
    } else {
        None
    }
}

/// Whether any character falls in [`LOCAL_SCRIPT_RANGE`].
pub fn contains_local_script(text: &str) -> bool {
    text.chars().any(|c| LOCAL_SCRIPT_RANGE.contains(&c))
}

/// Whether the text already carries a provider field-scoped term.
pub fn has_field_marker(text: &str) -> bool {
    text.split_whitespace()
        .any(|token| split_marker(token).is_some())
}

/// Remove field markers and quotes, leaving plain search words.
pub fn strip_field_markers(text: &str) -> String {
    text.split_whitespace()
        .map(|token| split_marker(token).map_or(token, |(_, rest)| rest))
        .map(|token| token.trim_matches('"'))
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn split_marker(token: &str) -> Option<(&str, &str)> {
    FIELD_MARKERS.iter().find_map(|marker| {
        let head = token.get(..marker.len())?;
        if head.eq_ignore_ascii_case(marker) {
            Some((head, &token[marker.len()..]))
        } else {
            None
        }
    })
}
