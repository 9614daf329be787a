//! # book-scout
//!
//! Resolves a free-form book query (title, author, ISBN, or a mix) into a
//! ranked, deduplicated list of book records by querying several
//! bibliographic providers at once.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`query`]: Query classification into a [`models::SearchIntent`]
//! - [`sources`]: Provider plugins behind the [`Source`] trait
//! - [`resolver`]: Concurrent fan-out, fallback, and final assembly
//! - [`models`]: Core data structures (BookCandidate, Resolution, etc.)
//! - [`utils`]: HTTP client, merging, and terminal display helpers
//! - [`library`]: Membership checks against already-saved books
//! - [`config`]: Configuration management
//!
//! ```no_run
//! use book_scout::config::Config;
//! use book_scout::Resolver;
//! use std::collections::HashSet;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = Resolver::from_config(&Config::default())?;
//! let resolution = resolver.resolve("채식주의자 / 한강", &HashSet::<String>::new()).await;
//! for book in resolution.candidates() {
//!     println!("{}", book.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod library;
pub mod models;
pub mod query;
pub mod resolver;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use library::{JsonLibrary, LibraryStore};
pub use models::{BookCandidate, Resolution, SearchIntent};
pub use query::classify;
pub use resolver::Resolver;
pub use sources::{Source, SourceRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
