//! Utility modules supporting book resolution.
//!
//! - [`HttpClient`]: Shared HTTP client returning classified [`SourceError`](crate::sources::SourceError)s
//! - [`build_url`]: Build a provider URL with encoded query parameters
//! - [`merge`]: Collapse candidates sharing a merge key, field by field
//! - [`enrich`]: Backfill one record from others without touching its identity
//! - [`backfill`]: Fill only the fields a record lacks
//! - Terminal helpers for the CLI table output
//!
//! # Merging
//!
//! ```rust
//! use book_scout::models::BookCandidate;
//! use book_scout::utils::merge;
//!
//! let merged = merge(
//!     vec![
//!         BookCandidate::new("a", "Dune").authors(["Frank Herbert"]).page_count(Some(412)),
//!         BookCandidate::new("b", "dune").authors(["frank herbert"]).page_count(Some(688)),
//!     ],
//!     "ko",
//! );
//! assert_eq!(merged.len(), 1);
//! assert_eq!(merged[0].page_count, Some(688));
//! ```

mod dedup;
mod display;
mod http;

pub use dedup::{backfill, enrich, merge, merge_group};
pub use display::{
    book_table, calculate_column_widths, format_authors, format_pages, get_book_table_columns,
    is_terminal, terminal_info, terminal_width, truncate_at_word, truncate_with_ellipsis,
    ColumnConfig, Terminal, DEFAULT_WIDTH,
};
pub use http::{build_url, get_user_agent, HttpClient, DEFAULT_TIMEOUT_SECS};
