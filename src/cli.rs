//! Command-line interface for the pypic application

use crate::client::PypiClient;
use crate::config::{AppConfig, EnvironmentConfig, LoggingConfig};
use crate::error::{PypicError, Result};
use crate::types::{PackageCheck, SearchResult};
use crate::utils::{
    create_example_batch_inputs, format_result_line, normalize, parse_batch_file,
    parse_batch_input, parse_timeout, truncate_text,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tabled::{Table, Tabled};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// pypic - check and search packages on the Python package index
#[derive(Parser)]
#[command(
    name = "pypic",
    version,
    about = "Check whether packages exist on the Python package index and search it",
    long_about = "Query the Python package index from the command line.
Checks whether a package or a specific release exists, searches the index
and prints the hits, and checks whole lists of packages in one batch."
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode (only errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Timeout for requests (e.g. 30s, 2m, 1h)
    #[arg(long, global = true)]
    pub timeout: Option<String>,

    /// Custom package index base URL
    #[arg(long, global = true, env = "PYPIC_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Check if a package exists
    Exists {
        /// Name of the package to check
        name: String,

        /// Specific version to check (optional)
        #[arg(short, long)]
        version: Option<String>,
    },

    /// Search the index by keywords
    Search {
        /// Keywords to search for
        #[arg(default_value = "pypi")]
        keywords: Vec<String>,

        /// Maximum number of results to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Check many packages at once
    Batch {
        /// JSON string with batch input
        #[arg(long, conflicts_with = "file")]
        json: Option<String>,

        /// JSON file with batch input
        #[arg(long, conflicts_with = "json")]
        file: Option<PathBuf>,

        /// Exit with error code if any package doesn't exist
        #[arg(long)]
        fail_on_missing: bool,
    },

    /// Generate sample configuration file
    Config {
        /// Output file (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show examples of JSON batch input formats
    Examples,
}

/// Output format options
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Aligned plain-text rows
    Compact,
}

/// Tabled display for search results
#[derive(Tabled)]
struct SearchResultDisplay {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// Tabled display for existence checks
#[derive(Tabled)]
struct PackageCheckDisplay {
    #[tabled(rename = "Package")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&PackageCheck> for PackageCheckDisplay {
    fn from(check: &PackageCheck) -> Self {
        let status = match (&check.error, check.exists) {
            (Some(_), _) => "ERROR",
            (None, true) => "EXISTS",
            (None, false) => "MISSING",
        };
        Self {
            name: check.normalized_name.clone(),
            version: check.version.clone().unwrap_or_else(|| "any".to_string()),
            status: status.to_string(),
        }
    }
}

/// Summary for batch results
#[derive(Serialize)]
struct BatchSummary {
    total_checked: usize,
    existing: usize,
    missing: usize,
    failed: usize,
}

/// Run the CLI application
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = if let Some(config_path) = &cli.config {
        AppConfig::load_from_file(Some(config_path))?
    } else {
        AppConfig::load()?
    };

    let env_config = EnvironmentConfig::detect();
    let mut final_config = config;
    env_config.apply_overrides(&mut final_config);
    final_config.validate().map_err(PypicError::validation)?;

    init_logging(cli.verbose, cli.quiet, &cli.format, &final_config.logging);

    let mut client_builder = PypiClient::builder()
        .user_agent(&final_config.index.user_agent)
        .base_url(cli.base_url.as_deref().unwrap_or(&final_config.index.base_url));

    if let Some(timeout_str) = &cli.timeout {
        client_builder = client_builder.timeout(parse_timeout(timeout_str)?);
    } else {
        client_builder = client_builder.timeout(std::time::Duration::from_secs(
            final_config.index.timeout_seconds,
        ));
    }

    let client = client_builder.build()?;

    match cli.command {
        Commands::Exists { name, version } => {
            handle_exists(client, &name, version.as_deref(), &cli.format).await?;
        }
        Commands::Search { keywords, limit } => {
            handle_search(client, &keywords, limit, &cli.format).await?;
        }
        Commands::Batch {
            json,
            file,
            fail_on_missing,
        } => {
            handle_batch(
                client,
                json.as_deref(),
                file.as_deref(),
                fail_on_missing,
                &cli.format,
            )
            .await?;
        }
        Commands::Config { output } => {
            handle_config(output.as_deref())?;
        }
        Commands::Examples => {
            handle_examples();
        }
    }

    Ok(())
}

/// Handle the exists command
async fn handle_exists(
    client: PypiClient,
    name: &str,
    version: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let exists = client.exists(name, version).await?;
    let check = PackageCheck {
        name: name.to_string(),
        normalized_name: normalize(name),
        version: version.map(str::to_string),
        exists,
        error: None,
    };

    match format {
        OutputFormat::Table => {
            println!("{}", Table::new([PackageCheckDisplay::from(&check)]));
        }
        OutputFormat::Compact => {
            println!(
                "{} {} {}",
                check.normalized_name,
                check.version.as_deref().unwrap_or("any"),
                if exists { "exists" } else { "missing" }
            );
        }
        _ => output_result(&serde_json::to_value(&check)?, format)?,
    }

    if !exists {
        std::process::exit(1);
    }

    Ok(())
}

/// Handle the search command
async fn handle_search(
    client: PypiClient,
    keywords: &[String],
    limit: Option<usize>,
    format: &OutputFormat,
) -> Result<()> {
    let mut results = client.search(keywords).await?;

    if let Some(limit) = limit {
        results.truncate(limit);
    }

    match format {
        OutputFormat::Table => {
            let displays: Vec<SearchResultDisplay> = results.iter().map(display_result).collect();
            println!("{}", Table::new(displays));
        }
        OutputFormat::Compact => {
            for result in &results {
                println!("{}", format_result_line(result));
            }
        }
        _ => output_result(&serde_json::to_value(&results)?, format)?,
    }

    Ok(())
}

fn display_result(result: &SearchResult) -> SearchResultDisplay {
    SearchResultDisplay {
        name: result.name.clone().unwrap_or_default(),
        version: result.version.clone().unwrap_or_default(),
        weight: result.weight.map(|w| w.to_string()).unwrap_or_default(),
        description: truncate_text(result.desc.as_deref().unwrap_or("N/A"), 60),
    }
}

/// Handle the batch command
async fn handle_batch(
    client: PypiClient,
    json: Option<&str>,
    file: Option<&std::path::Path>,
    fail_on_missing: bool,
    format: &OutputFormat,
) -> Result<()> {
    let input = if let Some(json_str) = json {
        parse_batch_input(json_str)?
    } else if let Some(file_path) = file {
        parse_batch_file(file_path)?
    } else {
        return Err(PypicError::validation(
            "Either --json or --file must be provided",
        ));
    };

    let results = client.check_batch(&input).await;
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let existing = results.iter().filter(|r| r.exists).count();
    let summary = BatchSummary {
        total_checked: results.len(),
        existing,
        missing: results.len() - existing - failed,
        failed,
    };
    info!(
        "Batch finished: {} existing, {} missing, {} failed",
        summary.existing, summary.missing, summary.failed
    );

    match format {
        OutputFormat::Table => {
            let displays: Vec<PackageCheckDisplay> =
                results.iter().map(PackageCheckDisplay::from).collect();
            println!("{}", Table::new(displays));
            println!();
            println!("=== SUMMARY ===");
            println!("Total checked: {}", summary.total_checked);
            println!("Existing: {}", summary.existing);
            println!("Missing: {}", summary.missing);
            if summary.failed > 0 {
                println!("Failed: {}", summary.failed);
            }
        }
        OutputFormat::Compact => {
            for result in &results {
                println!(
                    "{} {}",
                    result.normalized_name,
                    PackageCheckDisplay::from(result).status.to_lowercase()
                );
            }
        }
        _ => {
            let output = serde_json::json!({
                "results": results,
                "summary": summary,
            });
            output_result(&output, format)?;
        }
    }

    if fail_on_missing && summary.existing < summary.total_checked {
        std::process::exit(1);
    }

    Ok(())
}

/// Handle the config command
fn handle_config(output: Option<&std::path::Path>) -> Result<()> {
    let sample_config = AppConfig::create_sample_config();

    if let Some(path) = output {
        std::fs::write(path, sample_config)?;
        println!("Configuration written to: {}", path.display());
    } else {
        println!("{}", sample_config);
    }

    Ok(())
}

/// Handle the examples command
fn handle_examples() {
    println!("JSON Batch Input Examples:\n");

    for (title, example) in create_example_batch_inputs() {
        println!("{}:", title);
        println!("{}\n", example);
    }

    println!("Usage:");
    println!("  pypic batch --json '<json_string>'");
    println!("  pypic batch --file input.json");
}

/// Output a result in a serialized format
fn output_result(value: &serde_json::Value, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(value)?);
        }
        OutputFormat::Compact => {
            println!("{}", serde_json::to_string(value)?);
        }
        OutputFormat::Json | OutputFormat::Table => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }

    Ok(())
}

/// Initialize logging based on CLI flags and the logging configuration
fn init_logging(verbose: bool, quiet: bool, format: &OutputFormat, logging: &LoggingConfig) {
    // keep stdout parseable for machine-readable formats
    let should_suppress = !matches!(format, OutputFormat::Table);

    let level = if quiet || should_suppress {
        "error"
    } else if verbose {
        "debug"
    } else {
        logging.level.as_str()
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_target(false)
        .with_writer(std::io::stderr);

    match logging.format.as_str() {
        "json" => subscriber.json().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.init(),
    }
}
