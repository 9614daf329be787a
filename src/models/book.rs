//! Book candidate model shared by every provider.

use serde::{Deserialize, Serialize};

/// Title used when a provider record carries no title at all.
///
/// Records are never dropped for a missing title so that positions keep
/// matching the provider's own ranking.
pub const MISSING_TITLE: &str = "(No Title)";

/// A single book record as reported by one provider (or merged from several).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookCandidate {
    /// Provider-scoped opaque identifier
    pub id: String,

    /// Book title (never empty)
    pub title: String,

    /// Authors in provider order
    #[serde(default)]
    pub authors: Vec<String>,

    /// Number of pages, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,

    /// Short language code such as "ko" or "en"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,

    /// Cover image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl BookCandidate {
    /// Create a candidate with the required fields.
    ///
    /// A blank title is replaced with [`MISSING_TITLE`].
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            MISSING_TITLE.to_string()
        } else {
            title
        };

        Self {
            id: id.into(),
            title,
            authors: Vec::new(),
            page_count: None,
            language_code: None,
            cover_url: None,
        }
    }

    /// Set the author list
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Set the page count; zero is treated as unknown
    pub fn page_count(mut self, pages: Option<u32>) -> Self {
        self.page_count = pages.filter(|p| *p > 0);
        self
    }

    /// Set the language code
    pub fn language_code(mut self, code: Option<String>) -> Self {
        self.language_code = code.filter(|c| !c.trim().is_empty());
        self
    }

    /// Set the cover URL
    pub fn cover_url(mut self, url: Option<String>) -> Self {
        self.cover_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    /// First listed author, if any
    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    /// Key identifying "the same book" across providers
    pub fn merge_key(&self) -> MergeKey {
        MergeKey::new(&self.title, self.first_author().unwrap_or(""))
    }
}

/// Normalised `title|first-author` string used to group candidates.
///
/// This is a coarse exact-match key: two editions with the same title and
/// first author share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergeKey(String);

impl MergeKey {
    /// Build a key from a title and a single author name
    pub fn new(title: &str, author: &str) -> Self {
        Self(format!(
            "{}|{}",
            title.trim().to_lowercase(),
            author.to_lowercase()
        ))
    }

    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key, returning the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for MergeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_gets_placeholder() {
        let book = BookCandidate::new("1", "   ");
        assert_eq!(book.title, MISSING_TITLE);
    }

    #[test]
    fn test_zero_page_count_is_unknown() {
        let book = BookCandidate::new("1", "Dune").page_count(Some(0));
        assert_eq!(book.page_count, None);
    }

    #[test]
    fn test_merge_key_normalises_title_and_author() {
        let book = BookCandidate::new("1", "  Dune ").authors(["Frank Herbert", "Someone Else"]);
        assert_eq!(book.merge_key().as_str(), "dune|frank herbert");
    }

    #[test]
    fn test_merge_key_without_author() {
        let book = BookCandidate::new("1", "Dune");
        assert_eq!(book.merge_key().as_str(), "dune|");
    }

    #[test]
    fn test_merge_key_hangul_is_unchanged() {
        let key = MergeKey::new("박시백의 조선왕조실록", "박시백");
        assert_eq!(key.as_str(), "박시백의 조선왕조실록|박시백");
    }
}
