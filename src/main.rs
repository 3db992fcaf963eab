//! FourBot main entry point
//!
//! This is the command-line interface for the FourBot URL fetcher.

use anyhow::Context;
use clap::Parser;
use fourbot::config::{load_config_with_hash, validate, Config};
use fourbot::crawler::{crawl, Coordinator, ShutdownCoordinator};
use fourbot::input::prompt_for_urls;
use fourbot::output::print_statistics;
use fourbot::url::validate_urls;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

/// FourBot: a polite concurrent URL fetcher
///
/// Fetches every URL in a comma-separated list with a fixed pool of workers,
/// a global rate limit and per-host robots.txt checks, printing one line per
/// URL. Ctrl+C stops dispatch and waits for in-flight fetches to finish.
#[derive(Parser, Debug)]
#[command(name = "fourbot")]
#[command(version = "1.0.0")]
#[command(about = "A polite concurrent URL fetcher", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Comma-separated URLs to fetch (prompted for when omitted)
    #[arg(short, long, value_name = "LIST")]
    urls: Option<String>,

    /// Number of fetch workers
    #[arg(short, long)]
    workers: Option<u32>,

    /// Minimum milliseconds between two fetch starts
    #[arg(long)]
    rate_limit_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print only "Fetched URL" lines, without bodies
    #[arg(long)]
    no_body: bool,

    /// Print run statistics after all results
    #[arg(long)]
    summary: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_effective_config(&cli)?;

    let urls = match &cli.urls {
        Some(list) => validate_urls(list)?,
        None => tokio::task::spawn_blocking(|| {
            prompt_for_urls(std::io::stdin().lock(), std::io::stdout())
        })
        .await??,
    };
    tracing::info!("Total target URLs: {}", urls.len());

    let summary = config.output.summary;
    let coordinator = Coordinator::new(config)?;
    watch_for_shutdown(coordinator.shutdown());

    let mut stdout = std::io::stdout();
    let outcome = match crawl(coordinator, urls, &mut stdout).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if summary {
        print_statistics(&mut stdout, &outcome.statistics, &outcome.dispatch)?;
    }

    tracing::info!("Crawler shutdown successfully");
    Ok(())
}

/// Loads the config file (if any) and applies command-line overrides
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(rate_limit_ms) = cli.rate_limit_ms {
        config.crawler.rate_limit_ms = rate_limit_ms;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.http.timeout_secs = timeout_secs;
    }
    if cli.no_body {
        config.output.show_body = false;
    }
    if cli.summary {
        config.output.summary = true;
    }

    validate(&config)?;
    Ok(config)
}

/// Moves the run to Draining on the first interrupt or terminate signal
fn watch_for_shutdown(shutdown: Arc<ShutdownCoordinator>) {
    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(()) => {
                if shutdown.request_stop() {
                    tracing::info!("Waiting for ongoing tasks to complete");
                }
            }
            Err(e) => tracing::warn!("Failed to install signal handler: {}", e),
        }
    });
}

async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Log lines carry a local timestamp with microseconds and the source
/// location, and go to stderr so that results on stdout stay clean.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("fourbot=info,warn"),
            1 => EnvFilter::new("fourbot=debug,info"),
            2 => EnvFilter::new("fourbot=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new("%Y/%m/%d %H:%M:%S%.6f".to_string()))
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}
