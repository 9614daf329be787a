use anyhow::{Context, Result};
use book_scout::config::{find_config_file, get_config, load_config, Config};
use book_scout::models::{CallOutcome, Resolution};
use book_scout::sources::{SourceCapabilities, SourceRegistry};
use book_scout::utils::{book_table, is_terminal, terminal_width};
use book_scout::{classify, JsonLibrary, LibraryStore, Resolver};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// book-scout - Find books across Aladin, Google Books and Open Library
#[derive(Parser, Debug)]
#[command(name = "book-scout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve a title, author or ISBN into deduplicated book records", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Per-provider timeout in seconds (overrides the config file)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search by title, "title / author", or free text
    #[command(alias = "s")]
    Search {
        /// Search query
        query: String,

        /// JSON file of saved books; matching results are flagged
        #[arg(long, short)]
        library: Option<PathBuf>,

        /// Show per-provider call outcomes
        #[arg(long)]
        diagnostics: bool,
    },

    /// Look up a single ISBN (10 or 13 digits, hyphens allowed)
    #[command(alias = "i")]
    Isbn {
        /// ISBN to look up
        isbn: String,

        /// JSON file of saved books; matching results are flagged
        #[arg(long, short)]
        library: Option<PathBuf>,

        /// Show per-provider call outcomes
        #[arg(long)]
        diagnostics: bool,
    },

    /// Show how a query would be interpreted
    Classify {
        /// Query to classify
        query: String,
    },

    /// List providers and their roles
    #[command(alias = "ls")]
    Providers,

    /// Print the effective configuration (API keys masked)
    Config,
}

/// Print all available environment variables
fn print_env_vars() {
    println!("book-scout - Environment Variables");
    println!();
    println!("API Keys:");
    println!("  ALADIN_TTB_KEY              Aladin TTB Open API key");
    println!("  GOOGLE_BOOKS_KEY            Google Books API key (optional, raises quota)");
    println!();
    println!("Overrides (any config key, sections separated by __):");
    println!("  BOOK_SCOUT_SEARCH__TIMEOUT_SECONDS     Per-provider timeout (default: 10)");
    println!("  BOOK_SCOUT_SEARCH__COUNTRY             Country sent to Google Books (default: KR)");
    println!("  BOOK_SCOUT_SEARCH__LOCAL_LANGUAGE      Preferred language code (default: ko)");
    println!("  BOOK_SCOUT_ENDPOINTS__ALADIN           Aladin base URL override");
    println!("  BOOK_SCOUT_LOGGING__FORMAT             Set to \"json\" for JSON log lines");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export ALADIN_TTB_KEY=\"ttbyourkey0001\"");
    println!("  book-scout search \"채식주의자 / 한강\"");
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("book_scout={}", level)));
    let json = config.logging.is_json();

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn resolve_config(cli: &Cli) -> Result<(Config, Option<PathBuf>)> {
    let path = cli.config.clone().or_else(find_config_file);
    let mut config = match &path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => get_config().context("Failed to read configuration from environment")?,
    };

    if let Some(timeout) = cli.timeout {
        config.search.timeout_seconds = timeout;
    }
    Ok((config, path))
}

fn load_library(path: Option<&PathBuf>) -> Result<HashSet<String>> {
    match path {
        Some(path) => Ok(JsonLibrary::load(path)
            .with_context(|| format!("Failed to read library {}", path.display()))?
            .existing_merge_keys()),
        None => Ok(HashSet::new()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show environment variables and exit if requested
    if cli.env {
        print_env_vars();
        return Ok(());
    }

    let (config, config_path) = resolve_config(&cli)?;
    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let format = cli.output.resolve();

    match cli.command {
        Some(Commands::Search {
            query,
            library,
            diagnostics,
        }) => {
            let resolver = Resolver::from_config(&config)?;
            let known = load_library(library.as_ref())?;
            let resolution = resolver.resolve(&query, &known).await;
            output_resolution(&resolution, format, diagnostics)?;
        }
        Some(Commands::Isbn {
            isbn,
            library,
            diagnostics,
        }) => {
            let intent = classify(&isbn);
            if !intent.is_isbn() {
                anyhow::bail!("'{}' is not a 10 or 13 digit ISBN", isbn.trim());
            }
            let resolver = Resolver::from_config(&config)?;
            let known = load_library(library.as_ref())?;
            let resolution = resolver.resolve_intent(&intent, &known).await;
            output_resolution(&resolution, format, diagnostics)?;
        }
        Some(Commands::Classify { query }) => {
            let intent = classify(&query);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&intent)?),
                _ => println!("{}", intent),
            }
        }
        Some(Commands::Providers) => {
            let registry = SourceRegistry::from_config(&config)?;
            output_providers(&registry, format)?;
        }
        Some(Commands::Config) => {
            print!("{}", config.to_toml_redacted()?);
        }
        None => {
            println!("book-scout v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Use --help for usage information");
            println!();
            println!("Commands:");
            println!("  search <query>   - Search by title, \"title / author\" or free text");
            println!("  isbn <isbn>      - Look up one ISBN");
            println!("  classify <query> - Show how a query is interpreted");
            println!("  providers        - List providers and roles");
            println!("  config           - Print the effective configuration");
        }
    }

    Ok(())
}

fn output_resolution(
    resolution: &Resolution,
    format: OutputFormat,
    show_diagnostics: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json if show_diagnostics => {
            println!("{}", serde_json::to_string_pretty(resolution)?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&resolution.books)?);
        }
        _ if resolution.is_empty() => {
            println!("No results");
        }
        OutputFormat::Plain => {
            for resolved in &resolution.books {
                let book = &resolved.book;
                println!("{} - {}", book.title, book.authors.join(", "));
                if let Some(pages) = book.page_count {
                    println!("  Pages: {}", pages);
                }
                if let Some(ref cover) = book.cover_url {
                    println!("  Cover: {}", cover);
                }
                println!("  Origin: {}", resolved.origin);
                if resolved.in_library {
                    println!("  Already in library");
                }
                println!();
            }
        }
        _ => {
            println!("{}", book_table(&resolution.books, terminal_width()));
        }
    }

    if format != OutputFormat::Json {
        if show_diagnostics {
            for diag in &resolution.diagnostics {
                match &diag.outcome {
                    CallOutcome::Ok { count } => {
                        eprintln!("  {} {}: {} result(s)", diag.source, diag.call, count)
                    }
                    CallOutcome::Failed { error } => {
                        eprintln!("  {} {}: failed ({})", diag.source, diag.call, error)
                    }
                }
            }
        } else if resolution.all_failed() {
            eprintln!("All providers failed; rerun with --diagnostics for details");
        }
    }

    Ok(())
}

fn capability_names(caps: SourceCapabilities) -> String {
    let mut names = Vec::new();
    if caps.contains(SourceCapabilities::SEARCH) {
        names.push("search");
    }
    if caps.contains(SourceCapabilities::ISBN_LOOKUP) {
        names.push("isbn");
    }
    if caps.contains(SourceCapabilities::ENRICHMENT) {
        names.push("enrichment");
    }
    names.join(", ")
}

fn output_providers(registry: &SourceRegistry, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let providers: Vec<serde_json::Value> = registry
                .all()
                .map(|(role, source)| {
                    serde_json::json!({
                        "id": source.id(),
                        "name": source.name(),
                        "role": role.to_string(),
                        "capabilities": capability_names(source.capabilities()),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&providers)?);
        }
        OutputFormat::Plain => {
            for (role, source) in registry.all() {
                println!(
                    "{} ({}) - {} [{}]",
                    source.name(),
                    source.id(),
                    role,
                    capability_names(source.capabilities())
                );
            }
        }
        _ => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["ID", "Name", "Role", "Capabilities"]);
            for (role, source) in registry.all() {
                table.add_row(vec![
                    Cell::new(source.id()).add_attribute(Attribute::Bold),
                    Cell::new(source.name()),
                    Cell::new(role),
                    Cell::new(capability_names(source.capabilities())),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
