//! Query resolution across the provider registry.
//!
//! A [`Resolver`] takes a [`SearchIntent`], fans out to the providers that
//! can answer it, and hands the joined results to the merger and assembler.
//! Provider calls run concurrently but their results are always consumed in
//! registry order, so completion order never changes the output.
//!
//! A failing or slow provider never fails the request. Its call contributes
//! nothing and is reported as a [`ProviderDiagnostic`] instead.

mod assemble;

pub use assemble::assemble;

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::library::LibraryStore;
use crate::models::{
    BookCandidate, CallKind, CallOutcome, ProviderDiagnostic, Resolution, SearchIntent,
    SearchQuery,
};
use crate::query::classify;
use crate::sources::{Source, SourceError, SourceRegistry};
use crate::utils::{enrich, merge};

/// Default per-call timeout
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves queries against a fixed primary / secondary / enrichment registry
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: SourceRegistry,
    call_timeout: Duration,
    local_language: String,
}

impl Resolver {
    pub fn new(registry: SourceRegistry) -> Self {
        Self {
            registry,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            local_language: "ko".to_string(),
        }
    }

    /// Bound every provider call by `timeout`
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Language code preferred when merging
    pub fn with_local_language(mut self, language: impl Into<String>) -> Self {
        self.local_language = language.into();
        self
    }

    /// Build the default providers from configuration
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Ok(Self::new(SourceRegistry::from_config(config)?)
            .with_call_timeout(Duration::from_secs(config.search.timeout_seconds))
            .with_local_language(config.search.local_language.clone()))
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Classify a raw query and resolve it
    ///
    /// A blank query resolves to nothing without calling any provider.
    pub async fn resolve(&self, raw: &str, library: &dyn LibraryStore) -> Resolution {
        if raw.trim().is_empty() {
            return Resolution::default();
        }

        let intent = classify(raw);
        let known = library.existing_merge_keys();
        self.resolve_intent(&intent, &known).await
    }

    /// Resolve an already classified intent
    pub async fn resolve_intent(
        &self,
        intent: &SearchIntent,
        known_keys: &HashSet<String>,
    ) -> Resolution {
        tracing::debug!("Resolving {}", intent);

        match intent {
            SearchIntent::IsbnLookup { digits } => self.resolve_isbn(digits, known_keys).await,
            SearchIntent::StructuredQuery { .. } | SearchIntent::FullTextQuery { .. } => {
                let query = SearchQuery::from_intent(intent);
                if query.text.is_empty() {
                    return Resolution::default();
                }
                self.resolve_text(&query, known_keys).await
            }
        }
    }

    async fn resolve_isbn(&self, digits: &str, known_keys: &HashSet<String>) -> Resolution {
        let ((primary_hit, primary_diag), (backfill, backfill_diag)) = tokio::join!(
            self.lookup(self.registry.primary(), digits),
            self.lookup(self.registry.enrichment(), digits),
        );
        let mut diagnostics = vec![primary_diag, backfill_diag];
        let donors: Vec<BookCandidate> = backfill.into_iter().collect();

        if let Some(hit) = primary_hit {
            let book = enrich(hit, &donors, &self.local_language);
            return Resolution {
                books: assemble(vec![book], Vec::new(), known_keys, &self.local_language),
                diagnostics,
            };
        }

        tracing::info!("No primary record for ISBN {}, trying secondary search", digits);
        let (found, diag) = self
            .search(self.registry.secondary(), &SearchQuery::isbn(digits), CallKind::Search)
            .await;
        diagnostics.push(diag);

        let mut merged = merge(found, &self.local_language);
        if let Some(top) = merged.first_mut() {
            *top = enrich(top.clone(), &donors, &self.local_language);
        }

        Resolution {
            books: assemble(Vec::new(), merged, known_keys, &self.local_language),
            diagnostics,
        }
    }

    async fn resolve_text(&self, query: &SearchQuery, known_keys: &HashSet<String>) -> Resolution {
        let ((primary, primary_diag), (secondary, secondary_diag)) = tokio::join!(
            self.search(self.registry.primary(), query, CallKind::Search),
            self.search(self.registry.secondary(), query, CallKind::Search),
        );
        let primary_failed = primary_diag.is_failure();
        let mut diagnostics = vec![primary_diag, secondary_diag];

        if !primary.is_empty() {
            return Resolution {
                books: assemble(primary, secondary, known_keys, &self.local_language),
                diagnostics,
            };
        }

        // Only a primary that answered empty is re-queried; a failed call is not
        // retried. The secondary's first round stands as is.
        let broadened = query.broadened();
        if !primary_failed && !broadened.text.is_empty() {
            tracing::info!("Primary returned nothing, broadening to \"{}\"", broadened.text);
            let (more, diag) = self
                .search(self.registry.primary(), &broadened, CallKind::Broadened)
                .await;
            diagnostics.push(diag);
            if !more.is_empty() {
                return Resolution {
                    books: assemble(more, secondary, known_keys, &self.local_language),
                    diagnostics,
                };
            }
        }

        Resolution {
            books: assemble(Vec::new(), secondary, known_keys, &self.local_language),
            diagnostics,
        }
    }

    async fn search(
        &self,
        source: &Arc<dyn Source>,
        query: &SearchQuery,
        call: CallKind,
    ) -> (Vec<BookCandidate>, ProviderDiagnostic) {
        let (books, diag) = self
            .guarded(source, call, source.search(query), Vec::len)
            .await;
        (books.unwrap_or_default(), diag)
    }

    async fn lookup(
        &self,
        source: &Arc<dyn Source>,
        isbn: &str,
    ) -> (Option<BookCandidate>, ProviderDiagnostic) {
        let (book, diag) = self
            .guarded(
                source,
                CallKind::IsbnLookup,
                source.lookup_by_isbn(isbn),
                |b: &Option<BookCandidate>| usize::from(b.is_some()),
            )
            .await;
        (book.flatten(), diag)
    }

    /// Run one provider call with the timeout applied and its error contained
    async fn guarded<T, F>(
        &self,
        source: &Arc<dyn Source>,
        call: CallKind,
        fut: F,
        count: impl Fn(&T) -> usize,
    ) -> (Option<T>, ProviderDiagnostic)
    where
        F: Future<Output = Result<T, SourceError>>,
    {
        let result = match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout),
        };

        let (value, outcome) = match result {
            Ok(value) => {
                let count = count(&value);
                tracing::debug!("{} {} returned {} result(s)", source.id(), call, count);
                (Some(value), CallOutcome::Ok { count })
            }
            Err(e) => {
                tracing::warn!("{} {} failed: {}", source.id(), call, e);
                (None, CallOutcome::Failed { error: e.to_string() })
            }
        };

        let diagnostic = ProviderDiagnostic {
            source: source.id().to_string(),
            call,
            outcome,
        };
        (value, diagnostic)
    }
}
