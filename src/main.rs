//! csfd-harvest main entry point
//!
//! This is the command-line interface for the two-stage film harvester.

use clap::{Parser, Subcommand};
use csfd_harvest::config::{load_config_with_hash, Config};
use csfd_harvest::crawler::{discover, extract};
use csfd_harvest::output::{load_statistics, print_statistics};
use csfd_harvest::url::CatalogUrls;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// csfd-harvest: discover film pages and extract their details
///
/// Discovery probes random film identifiers and checkpoints every valid page
/// it finds. Extraction walks the discovered list and appends one record per
/// film, resuming where the previous run stopped.
#[derive(Parser, Debug)]
#[command(name = "csfd-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Discover film pages and extract their details", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    stage: Stage,
}

#[derive(Subcommand, Debug)]
enum Stage {
    /// Probe random identifiers and checkpoint valid film URLs
    Discover {
        /// Ignore the existing checkpoint instead of extending it
        #[arg(long)]
        fresh: bool,
    },

    /// Extract records for discovered URLs, resuming after the last record
    Extract,

    /// Show progress and field coverage from the output files and exit
    Stats,

    /// Validate config and show the effective settings without any requests
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            setup_logging(cli.verbose, cli.quiet, None)?;
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    setup_logging(cli.verbose, cli.quiet, config.logging.file.as_deref())?;
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    match cli.stage {
        Stage::Check => handle_check(&config),
        Stage::Stats => handle_stats(&config),
        Stage::Discover { fresh } => handle_discover(&config, fresh).await,
        Stage::Extract => handle_extract(&config).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Log lines always go to stderr; when `log_file` is set they are also
/// appended to that file without colors.
fn setup_logging(
    verbose: u8,
    quiet: bool,
    log_file: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("csfd_harvest=info,warn"),
            1 => EnvFilter::new("csfd_harvest=debug,info"),
            2 => EnvFilter::new("csfd_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Cancels the returned token on Ctrl+C
///
/// The engines only look at the token between iterations, so files are never
/// left half-written.
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let watcher = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted (Ctrl+C), stopping after the current step");
            watcher.cancel();
        }
    });
    token
}

/// Handles the `check` mode: validates config and shows what would run
fn handle_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== csfd-harvest Configuration ===\n");

    println!("HTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Accept-Language: {}", config.http.accept_language);
    println!("  Timeout: {}s", config.http.timeout_secs);

    println!("\nCatalog:");
    let urls = CatalogUrls::from_config(&config.catalog)?;
    println!("  Detail pages: {}<id>/", urls.prefix());
    println!(
        "  Not-found markers: {}",
        config.catalog.not_found_markers.join(" | ")
    );

    println!("\nDiscovery:");
    println!("  Target count: {}", config.discovery.target_count);
    println!("  Max attempts: {}", config.discovery.max_attempts);
    println!("  Identifier space: 1..={}", config.discovery.id_space);
    println!(
        "  Checkpoint every: {} attempts",
        config.discovery.checkpoint_every
    );
    println!("  Checkpoint file: {}", config.discovery.output_path);

    println!("\nExtraction:");
    println!("  Input: {}", config.extraction.input_path);
    println!("  Output: {}", config.extraction.output_path);
    println!("  Delay: {}ms", config.extraction.delay_ms);

    println!("\nVocabulary:");
    println!("  Countries: {}", config.vocabulary.countries.len());
    println!("  Genres: {}", config.vocabulary.genres.len());

    if let Some(file) = &config.logging.file {
        println!("\nLog file: {}", file);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the `stats` mode
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let stats = load_statistics(config)?;
    print_statistics(&stats);
    Ok(())
}

/// Handles the discovery stage
async fn handle_discover(config: &Config, fresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    match discover(config, fresh, interrupt_token()).await {
        Ok(output) => {
            println!(
                "Discovered {} films ({} new) in {} attempts",
                output.report.found,
                output.report.newly_found(),
                output.report.attempts
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Discovery failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the extraction stage
async fn handle_extract(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match extract(config, interrupt_token()).await {
        Ok(report) => {
            println!(
                "Extracted {} records this run, {} total, {} remaining",
                report.written,
                report.total(),
                report.remaining()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Extraction failed: {}", e);
            Err(e.into())
        }
    }
}
