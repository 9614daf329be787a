//! Registry holding the providers in fixed priority order.

use std::sync::Arc;

use super::{AladinSource, GoogleBooksSource, OpenLibrarySource, Source, SourceError};
use crate::config::{ApiKeyProvider, Config};
use crate::utils::{get_user_agent, HttpClient};

bitflags::bitflags! {
    /// Capabilities that a source can support
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SourceCapabilities: u32 {
        const SEARCH = 1 << 0;
        const ISBN_LOOKUP = 1 << 1;
        const ENRICHMENT = 1 << 2;
    }
}

/// Role a source plays during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceRole {
    /// Ranked first; ISBN lookups go here first
    Primary,
    /// Broad full-text search and fallback path
    Secondary,
    /// ISBN backfill only
    Enrichment,
}

impl SourceRole {
    /// Capabilities a source must declare to fill this role
    pub fn required_capabilities(&self) -> SourceCapabilities {
        match self {
            SourceRole::Primary => SourceCapabilities::SEARCH | SourceCapabilities::ISBN_LOOKUP,
            SourceRole::Secondary => SourceCapabilities::SEARCH,
            SourceRole::Enrichment => SourceCapabilities::ISBN_LOOKUP,
        }
    }
}

impl std::fmt::Display for SourceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceRole::Primary => f.write_str("primary"),
            SourceRole::Secondary => f.write_str("secondary"),
            SourceRole::Enrichment => f.write_str("enrichment"),
        }
    }
}

/// Registry for the three provider roles.
///
/// Unlike a lookup table, the registry is an ordered, fixed set: the
/// resolver always consults primary, then secondary, then enrichment.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    primary: Arc<dyn Source>,
    secondary: Arc<dyn Source>,
    enrichment: Arc<dyn Source>,
}

impl SourceRegistry {
    /// Build a registry, checking each source can serve its role
    pub fn new(
        primary: Arc<dyn Source>,
        secondary: Arc<dyn Source>,
        enrichment: Arc<dyn Source>,
    ) -> Result<Self, SourceError> {
        for (role, source) in [
            (SourceRole::Primary, &primary),
            (SourceRole::Secondary, &secondary),
            (SourceRole::Enrichment, &enrichment),
        ] {
            let required = role.required_capabilities();
            if !source.capabilities().contains(required) {
                return Err(SourceError::Unsupported(format!(
                    "source '{}' cannot act as {} (requires {:?})",
                    source.id(),
                    role,
                    required
                )));
            }
        }

        Ok(Self {
            primary,
            secondary,
            enrichment,
        })
    }

    /// Build the default Aladin / Google Books / Open Library registry
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let client = HttpClient::with_timeout(get_user_agent(), config.search.timeout_seconds)?;
        let search = &config.search;
        let endpoints = &config.endpoints;

        let mut aladin = AladinSource::new(client.clone(), config.api_key("aladin"))
            .max_results(search.primary_max_results);
        if let Some(base) = &endpoints.aladin {
            aladin = aladin.with_base_url(base);
        }

        let mut google = GoogleBooksSource::new(client.clone(), config.api_key("google_books"))
            .max_results(search.secondary_max_results)
            .isbn_max_results(search.isbn_max_results)
            .locale(&search.country, &search.local_language);
        if let Some(base) = &endpoints.google_books {
            google = google.with_base_url(base);
        }

        let mut open_library = OpenLibrarySource::new(client);
        if let Some(base) = &endpoints.open_library {
            open_library = open_library.with_base_url(base);
        }

        Self::new(Arc::new(aladin), Arc::new(google), Arc::new(open_library))
    }

    /// Primary source
    pub fn primary(&self) -> &Arc<dyn Source> {
        &self.primary
    }

    /// Secondary source
    pub fn secondary(&self) -> &Arc<dyn Source> {
        &self.secondary
    }

    /// Enrichment-only source
    pub fn enrichment(&self) -> &Arc<dyn Source> {
        &self.enrichment
    }

    /// All sources in priority order
    pub fn all(&self) -> impl Iterator<Item = (SourceRole, &Arc<dyn Source>)> {
        [
            (SourceRole::Primary, &self.primary),
            (SourceRole::Secondary, &self.secondary),
            (SourceRole::Enrichment, &self.enrichment),
        ]
        .into_iter()
    }

    /// Get a source by ID
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Source>> {
        self.all().map(|(_, s)| s).find(|s| s.id() == id)
    }

    /// Get all source IDs in priority order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.all().map(|(_, s)| s.id())
    }
}
