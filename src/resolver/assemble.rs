//! Final ordering of merged results.

use std::collections::{HashMap, HashSet};

use crate::models::{BookCandidate, MergeKey, Origin, ResolvedBook};
use crate::utils::{backfill, merge};

/// Build the final list from primary and secondary candidates.
///
/// Primary records come first in their own order. Secondary records sharing
/// a merge key only fill fields the primary record lacks, plus page count. Secondary records with no
/// primary counterpart follow. Rows whose key is in `known_keys` are
/// flagged, never removed or moved.
pub fn assemble(
    primary: Vec<BookCandidate>,
    secondary: Vec<BookCandidate>,
    known_keys: &HashSet<String>,
    local_language: &str,
) -> Vec<ResolvedBook> {
    let primary = merge(primary, local_language);
    let secondary = merge(secondary, local_language);

    let mut by_key: HashMap<MergeKey, Vec<BookCandidate>> = HashMap::new();
    let mut unmatched = Vec::new();
    let primary_keys: HashSet<MergeKey> = primary.iter().map(BookCandidate::merge_key).collect();

    for book in secondary {
        let key = book.merge_key();
        if primary_keys.contains(&key) {
            by_key.entry(key).or_default().push(book);
        } else {
            unmatched.push(book);
        }
    }

    let ranked = primary
        .into_iter()
        .map(|book| {
            let donors = by_key.remove(&book.merge_key()).unwrap_or_default();
            (backfill(book, &donors, local_language), Origin::Primary)
        })
        .chain(unmatched.into_iter().map(|book| (book, Origin::Secondary)));

    ranked
        .map(|(book, origin)| {
            let in_library = known_keys.contains(book.merge_key().as_str());
            ResolvedBook {
                book,
                origin,
                in_library,
            }
        })
        .collect()
}
