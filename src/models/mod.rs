//! Core data models for book candidates, queries, and resolutions.

mod book;
mod resolution;
mod search;

pub use book::{BookCandidate, MergeKey, MISSING_TITLE};
pub use resolution::{
    CallKind, CallOutcome, Origin, ProviderDiagnostic, Resolution, ResolvedBook,
};
pub use search::{QueryScope, SearchIntent, SearchQuery};
