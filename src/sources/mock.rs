//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::models::{BookCandidate, SearchQuery};
use crate::sources::{Source, SourceCapabilities, SourceError};

/// A mock source for testing that returns predefined responses.
///
/// Unconfigured calls succeed with no results. Every call is recorded so
/// tests can check which queries were issued.
#[derive(Debug)]
pub struct MockSource {
    id: String,
    capabilities: SourceCapabilities,
    delay: Option<Duration>,
    search_response: Mutex<Option<Result<Vec<BookCandidate>, SourceError>>>,
    search_script: Mutex<VecDeque<Vec<BookCandidate>>>,
    isbn_response: Mutex<Option<Result<Option<BookCandidate>, SourceError>>>,
    queries: Mutex<Vec<SearchQuery>>,
    isbn_lookups: Mutex<Vec<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockSource {
    /// Create a new mock source.
    pub fn new(id: impl Into<String>, capabilities: SourceCapabilities) -> Self {
        Self {
            id: id.into(),
            capabilities,
            delay: None,
            search_response: Mutex::new(None),
            search_script: Mutex::new(VecDeque::new()),
            isbn_response: Mutex::new(None),
            queries: Mutex::new(Vec::new()),
            isbn_lookups: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the books returned by `search`.
    pub fn set_search_books(&self, books: Vec<BookCandidate>) {
        *lock(&self.search_response) = Some(Ok(books));
    }

    /// Queue books for the next `search` call only.
    ///
    /// Queued responses are used up in order before the fixed response applies.
    pub fn push_search_books(&self, books: Vec<BookCandidate>) {
        lock(&self.search_script).push_back(books);
    }

    /// Make `search` fail.
    pub fn set_search_error(&self, error: SourceError) {
        *lock(&self.search_response) = Some(Err(error));
    }

    /// Set the book returned by `lookup_by_isbn`.
    pub fn set_isbn_book(&self, book: Option<BookCandidate>) {
        *lock(&self.isbn_response) = Some(Ok(book));
    }

    /// Make `lookup_by_isbn` fail.
    pub fn set_isbn_error(&self, error: SourceError) {
        *lock(&self.isbn_response) = Some(Err(error));
    }

    /// Queries received by `search`, in call order.
    pub fn queries(&self) -> Vec<SearchQuery> {
        lock(&self.queries).clone()
    }

    /// ISBNs received by `lookup_by_isbn`, in call order.
    pub fn isbn_lookups(&self) -> Vec<String> {
        lock(&self.isbn_lookups).clone()
    }

    /// Total number of calls received.
    pub fn call_count(&self) -> usize {
        lock(&self.queries).len() + lock(&self.isbn_lookups).len()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> SourceCapabilities {
        self.capabilities
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<BookCandidate>, SourceError> {
        if !self.supports_search() {
            return Err(SourceError::Unsupported(format!("{} search", self.id)));
        }
        lock(&self.queries).push(query.clone());
        self.pause().await;

        if let Some(books) = lock(&self.search_script).pop_front() {
            return Ok(books);
        }
        let response = lock(&self.search_response).clone();
        response.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn lookup_by_isbn(&self, isbn: &str) -> Result<Option<BookCandidate>, SourceError> {
        if !self.supports_isbn_lookup() {
            return Err(SourceError::Unsupported(format!("{} isbn lookup", self.id)));
        }
        lock(&self.isbn_lookups).push(isbn.to_string());
        self.pause().await;

        let response = lock(&self.isbn_response).clone();
        response.unwrap_or(Ok(None))
    }
}

/// Helper function to create a mock book for testing.
pub fn make_book(id: &str, title: &str, author: &str) -> BookCandidate {
    let book = BookCandidate::new(id, title);
    if author.is_empty() {
        book
    } else {
        book.authors([author])
    }
}
