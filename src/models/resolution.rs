//! Final resolution output returned to callers.

use serde::{Deserialize, Serialize};

use super::book::BookCandidate;

/// Which provider tier a record was ranked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Primary,
    Secondary,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Primary => f.write_str("primary"),
            Origin::Secondary => f.write_str("secondary"),
        }
    }
}

/// A book in the final list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBook {
    #[serde(flatten)]
    pub book: BookCandidate,

    /// Provider tier the record ranked from
    pub origin: Origin,

    /// Whether the caller's library already holds a book with the same key
    pub in_library: bool,
}

/// Kind of provider call made while resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Search,
    Broadened,
    IsbnLookup,
}

impl std::fmt::Display for CallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallKind::Search => f.write_str("search"),
            CallKind::Broadened => f.write_str("broadened search"),
            CallKind::IsbnLookup => f.write_str("isbn lookup"),
        }
    }
}

/// Outcome of a single provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallOutcome {
    /// Call succeeded with this many candidates
    Ok { count: usize },
    /// Call failed; the failure was isolated
    Failed { error: String },
}

/// Per-call diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDiagnostic {
    /// Provider id
    pub source: String,

    /// Call kind
    pub call: CallKind,

    /// What happened
    pub outcome: CallOutcome,
}

impl ProviderDiagnostic {
    /// Whether the call failed
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, CallOutcome::Failed { .. })
    }
}

/// Result of resolving one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Ordered results
    pub books: Vec<ResolvedBook>,

    /// One entry per provider call, in issue order
    pub diagnostics: Vec<ProviderDiagnostic>,
}

impl Resolution {
    /// No provider produced anything, after fallbacks
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Number of results
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Every attempted call failed (as opposed to "searched, found nothing")
    pub fn all_failed(&self) -> bool {
        !self.diagnostics.is_empty() && self.diagnostics.iter().all(|d| d.is_failure())
    }

    /// Candidates without the ranking metadata
    pub fn candidates(&self) -> impl Iterator<Item = &BookCandidate> {
        self.books.iter().map(|b| &b.book)
    }
}
