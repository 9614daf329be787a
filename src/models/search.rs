//! Search intent and provider query models.

use serde::{Deserialize, Serialize};

use crate::query::{contains_local_script, strip_field_markers};

/// What the user asked for, as parsed from a raw query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchIntent {
    /// A 10 or 13 digit ISBN
    IsbnLookup { digits: String },

    /// "Title / Author" input
    StructuredQuery { title: String, author: String },

    /// Anything else
    FullTextQuery {
        text: String,
        is_likely_local_script: bool,
    },
}

impl SearchIntent {
    /// Whether this intent is an ISBN lookup
    pub fn is_isbn(&self) -> bool {
        matches!(self, SearchIntent::IsbnLookup { .. })
    }
}

impl std::fmt::Display for SearchIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchIntent::IsbnLookup { digits } => write!(f, "ISBN {}", digits),
            SearchIntent::StructuredQuery { title, author } => {
                write!(f, "title \"{}\" by \"{}\"", title, author)
            }
            SearchIntent::FullTextQuery {
                text,
                is_likely_local_script,
            } => {
                if *is_likely_local_script {
                    write!(f, "full text \"{}\" (local script)", text)
                } else {
                    write!(f, "full text \"{}\"", text)
                }
            }
        }
    }
}

/// How a provider should scope the query text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum QueryScope {
    /// ISBN-filtered search
    Isbn,
    /// Title-scoped search
    Title,
    /// Title and author scoped search
    TitleAuthor { title: String, author: String },
    /// Unscoped keyword search
    Keyword,
}

/// A query handed to a provider's `search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Query text (ISBN digits for [`QueryScope::Isbn`])
    pub text: String,

    /// Field scope
    pub scope: QueryScope,

    /// Whether the text contains local-script characters
    pub local_script: bool,
}

impl SearchQuery {
    fn with_scope(text: impl Into<String>, scope: QueryScope) -> Self {
        let text = text.into();
        let local_script = contains_local_script(&text);
        Self {
            text,
            scope,
            local_script,
        }
    }

    /// ISBN-filtered search
    pub fn isbn(digits: impl Into<String>) -> Self {
        Self::with_scope(digits, QueryScope::Isbn)
    }

    /// Title-scoped search
    pub fn title(text: impl Into<String>) -> Self {
        Self::with_scope(text, QueryScope::Title)
    }

    /// Title plus author search
    pub fn title_author(title: impl Into<String>, author: impl Into<String>) -> Self {
        let title = title.into();
        let author = author.into();
        let text = format!("{} {}", title, author).trim().to_string();
        Self::with_scope(text, QueryScope::TitleAuthor { title, author })
    }

    /// Unscoped keyword search
    pub fn keyword(text: impl Into<String>) -> Self {
        Self::with_scope(text, QueryScope::Keyword)
    }

    /// Provider query for a parsed intent
    pub fn from_intent(intent: &SearchIntent) -> Self {
        match intent {
            SearchIntent::IsbnLookup { digits } => Self::isbn(digits.clone()),
            SearchIntent::StructuredQuery { title, author } => {
                Self::title_author(title.clone(), author.clone())
            }
            SearchIntent::FullTextQuery {
                text,
                is_likely_local_script,
            } => Self {
                text: text.clone(),
                scope: QueryScope::Title,
                local_script: *is_likely_local_script,
            },
        }
    }

    /// The same query with field markers removed and no scope
    pub fn broadened(&self) -> Self {
        Self::keyword(strip_field_markers(&self.text))
    }

    /// Whether this is an ISBN-filtered query
    pub fn is_isbn(&self) -> bool {
        self.scope == QueryScope::Isbn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_from_full_text_keeps_flag() {
        let intent = SearchIntent::FullTextQuery {
            text: "채식주의자".to_string(),
            is_likely_local_script: true,
        };
        let query = SearchQuery::from_intent(&intent);
        assert_eq!(query.scope, QueryScope::Title);
        assert!(query.local_script);
    }

    #[test]
    fn test_title_author_text_joins_parts() {
        let query = SearchQuery::title_author("Dune", "Frank Herbert");
        assert_eq!(query.text, "Dune Frank Herbert");
        assert!(!query.local_script);
    }

    #[test]
    fn test_broadened_strips_markers() {
        let query = SearchQuery::title("intitle:dune inauthor:herbert");
        let broad = query.broadened();
        assert_eq!(broad.scope, QueryScope::Keyword);
        assert_eq!(broad.text, "dune herbert");
    }

    #[test]
    fn test_intent_display() {
        let intent = SearchIntent::IsbnLookup {
            digits: "9788937460449".to_string(),
        };
        assert_eq!(intent.to_string(), "ISBN 9788937460449");
    }
}
