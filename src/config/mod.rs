//! Configuration management.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `BOOK_SCOUT_*` environment variables (`__` separates sections).
//!
//! # Configuration File Format
//!
//! ```toml
//! [api_keys]
//! aladin = "ttb-key"
//! google_books = "google-key"
//!
//! [search]
//! timeout_seconds = 10
//! primary_max_results = 20
//! secondary_max_results = 20
//! isbn_max_results = 5
//! country = "KR"
//! local_language = "ko"
//!
//! [endpoints]
//! # aladin = "http://localhost:8080/ttb/api"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "book-scout.toml";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "BOOK_SCOUT";

const REDACTED: &str = "********";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API keys for the providers
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Search limits and locale
    #[serde(default)]
    pub search: SearchSettings,

    /// Provider base URL overrides
    #[serde(default)]
    pub endpoints: Endpoints,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Aladin TTB key
    #[serde(default)]
    pub aladin: Option<String>,

    /// Google Books API key (optional, raises quota)
    #[serde(default)]
    pub google_books: Option<String>,
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self {
            aladin: std::env::var("ALADIN_TTB_KEY").ok(),
            google_books: std::env::var("GOOGLE_BOOKS_KEY").ok(),
        }
    }
}

/// Search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Per-call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_max_results")]
    pub primary_max_results: usize,

    #[serde(default = "default_max_results")]
    pub secondary_max_results: usize,

    /// Cap for ISBN-filtered searches
    #[serde(default = "default_isbn_max_results")]
    pub isbn_max_results: usize,

    /// Country sent to providers that localise results
    #[serde(default = "default_country")]
    pub country: String,

    /// Language code preferred when merging and used for language filters
    #[serde(default = "default_local_language")]
    pub local_language: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            primary_max_results: default_max_results(),
            secondary_max_results: default_max_results(),
            isbn_max_results: default_isbn_max_results(),
            country: default_country(),
            local_language: default_local_language(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_max_results() -> usize {
    20
}

fn default_isbn_max_results() -> usize {
    5
}

fn default_country() -> String {
    "KR".to_string()
}

fn default_local_language() -> String {
    "ko".to_string()
}

/// Base URL overrides, mostly for proxies and tests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default)]
    pub aladin: Option<String>,

    #[serde(default)]
    pub google_books: Option<String>,

    #[serde(default)]
    pub open_library: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `"json"` for structured output, plain text otherwise
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

impl LoggingConfig {
    /// Whether JSON log lines were requested
    pub fn is_json(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Supplies API keys to providers
pub trait ApiKeyProvider {
    /// Key for a provider id, empty when none is configured
    fn api_key(&self, provider: &str) -> String;
}

impl ApiKeyProvider for Config {
    fn api_key(&self, provider: &str) -> String {
        let key = match provider {
            "aladin" => self.api_keys.aladin.as_ref(),
            "google_books" => self.api_keys.google_books.as_ref(),
            _ => None,
        };
        key.cloned().unwrap_or_default()
    }
}

impl Config {
    /// Render as TOML with API keys masked
    pub fn to_toml_redacted(&self) -> Result<String, toml::ser::Error> {
        let mut shown = self.clone();
        for key in [&mut shown.api_keys.aladin, &mut shown.api_keys.google_books] {
            if key.is_some() {
                *key = Some(REDACTED.to_string());
            }
        }
        toml::to_string_pretty(&shown)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(environment())
        .build()?;

    settings.try_deserialize()
}

/// Get the configuration from environment variables and defaults only
pub fn get_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(environment())
        .build()?
        .try_deserialize()
}

/// Find a configuration file in the default locations
///
/// Checks `./book-scout.toml`, then `<config dir>/book-scout/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("book-scout").join("config.toml"))
        .filter(|path| path.is_file())
}
