//! Merging of book candidates reported by different providers.
//!
//! Candidates are grouped by [`MergeKey`] and each group is reduced field by
//! field. No provider is preferred wholesale: a record can end up with the
//! title of one provider and the page count of another.

use std::collections::HashMap;

use crate::models::{BookCandidate, MergeKey};
use crate::query::contains_local_script;

/// Merge candidates that describe the same book
///
/// Groups keep the order in which their key first appears. The result is
/// deterministic for a given input order.
pub fn merge(candidates: Vec<BookCandidate>, local_language: &str) -> Vec<BookCandidate> {
    let mut groups: Vec<Vec<BookCandidate>> = Vec::new();
    let mut index: HashMap<MergeKey, usize> = HashMap::new();

    for candidate in candidates {
        let key = candidate.merge_key();
        match index.get(&key) {
            Some(&slot) => groups[slot].push(candidate),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![candidate]);
            }
        }
    }

    groups
        .into_iter()
        .filter_map(|group| merge_group(group, local_language))
        .collect()
}

/// Reduce one group of same-key candidates to a single record
///
/// Returns `None` only for an empty group.
pub fn merge_group(group: Vec<BookCandidate>, local_language: &str) -> Option<BookCandidate> {
    if group.len() <= 1 {
        return group.into_iter().next();
    }
    let first = &group[0];

    Some(BookCandidate {
        id: first.id.clone(),
        title: pick_title(&group),
        authors: pick_authors(&group),
        page_count: pick_page_count(&group),
        language_code: pick_language(&group, local_language),
        cover_url: pick_cover(&group),
    })
}

/// Backfill `base` from `donors`
///
/// Identity fields (`id`, `title`, `authors`) always come from `base`. The
/// descriptive fields are chosen across base and donors with the same rules
/// as [`merge`].
pub fn enrich(base: BookCandidate, donors: &[BookCandidate], local_language: &str) -> BookCandidate {
    if donors.is_empty() {
        return base;
    }

    let mut pool = Vec::with_capacity(donors.len() + 1);
    pool.push(base.clone());
    pool.extend(donors.iter().cloned());

    BookCandidate {
        page_count: pick_page_count(&pool),
        language_code: pick_language(&pool, local_language),
        cover_url: pick_cover(&pool),
        ..base
    }
}

/// Fill only what `base` lacks from `donors`
///
/// Page count still follows the merge policy. Language and cover are taken
/// from a donor only when `base` has none, so a provider's own cover is
/// never swapped out.
pub fn backfill(base: BookCandidate, donors: &[BookCandidate], local_language: &str) -> BookCandidate {
    if donors.is_empty() {
        return base;
    }

    let mut pool = Vec::with_capacity(donors.len() + 1);
    pool.push(base.clone());
    pool.extend(donors.iter().cloned());

    BookCandidate {
        page_count: pick_page_count(&pool),
        language_code: base
            .language_code
            .clone()
            .or_else(|| pick_language(donors, local_language)),
        cover_url: base.cover_url.clone().or_else(|| pick_cover(donors)),
        ..base
    }
}

/// Longest title in the local script, else longest overall
fn pick_title(group: &[BookCandidate]) -> String {
    let local = longest(
        group
            .iter()
            .map(|c| c.title.as_str())
            .filter(|t| contains_local_script(t)),
    );

    local
        .or_else(|| longest(group.iter().map(|c| c.title.as_str())))
        .unwrap_or_default()
        .to_string()
}

fn pick_authors(group: &[BookCandidate]) -> Vec<String> {
    let mut best: Option<&Vec<String>> = None;
    for candidate in group {
        if best.map_or(true, |b| candidate.authors.len() > b.len()) {
            best = Some(&candidate.authors);
        }
    }
    best.cloned().unwrap_or_default()
}

/// Unique mode (seen at least twice), else the maximum
fn pick_page_count(group: &[BookCandidate]) -> Option<u32> {
    let pages: Vec<u32> = group.iter().filter_map(|c| c.page_count).collect();

    let mut counts: HashMap<u32, usize> = HashMap::new();
    for &p in &pages {
        *counts.entry(p).or_insert(0) += 1;
    }

    let top = counts.values().copied().max().unwrap_or(0);
    if top >= 2 {
        let mut modes = counts.iter().filter(|(_, &n)| n == top).map(|(&p, _)| p);
        if let (Some(mode), None) = (modes.next(), modes.next()) {
            return Some(mode);
        }
    }

    pages.into_iter().max()
}

fn pick_language(group: &[BookCandidate], local_language: &str) -> Option<String> {
    let codes = || group.iter().filter_map(|c| c.language_code.as_deref());

    codes()
        .find(|code| code.eq_ignore_ascii_case(local_language))
        .or_else(|| codes().next())
        .map(str::to_string)
}

fn pick_cover(group: &[BookCandidate]) -> Option<String> {
    longest(group.iter().filter_map(|c| c.cover_url.as_deref())).map(str::to_string)
}

/// Longest string by character count; the earliest wins a tie
fn longest<'a>(values: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;
    for value in values {
        let len = value.chars().count();
        if best.map_or(true, |(_, best_len)| len > best_len) {
            best = Some((value, len));
        }
    }
    best.map(|(value, _)| value)
}
