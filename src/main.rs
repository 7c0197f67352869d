//! Mock-Traffic main entry point
//!
//! This is the command-line front end: it loads the configuration, starts
//! an engine, logs stats as they arrive, and stops the engine on Ctrl-C.

use anyhow::Context;
use clap::Parser;
use mock_traffic::config::{load_config_with_hash, Config};
use mock_traffic::crawler::Engine;
use mock_traffic::output::{print_summary, LoggingObserver};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Mock-Traffic: a synthetic web traffic generator
///
/// Mock-Traffic visits pages at random from a growing pool of links,
/// pausing a random interval between requests, until it is stopped or runs
/// out of links.
#[derive(Parser, Debug)]
#[command(name = "mock-traffic")]
#[command(version)]
#[command(about = "A synthetic web traffic generator", long_about = None)]
struct Cli {
    /// Path to JSON (or .toml) configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be visited without sending traffic
    #[arg(long)]
    dry_run: bool,

    /// Stop after this many seconds instead of running until Ctrl-C
    #[arg(long, value_name = "SECS")]
    duration: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).with_context(|| format!("loading {}", cli.config.display()));
        }
    };
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_traffic(config, cli.duration.map(Duration::from_secs)).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("mock_traffic=info,warn"),
            1 => EnvFilter::new("mock_traffic=debug,info"),
            2 => EnvFilter::new("mock_traffic=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the parsed configuration
fn handle_dry_run(config: &Config) {
    println!("=== Mock-Traffic Dry Run ===\n");

    println!("Traffic Configuration:");
    println!(
        "  Delay between requests: {}ms - {}ms",
        config.min_delay_ms, config.max_delay_ms
    );
    println!("  Request timeout: {}ms", config.request_timeout_ms);
    println!("  Max depth: {} (not enforced)", config.max_depth);

    println!("\nRoot URLs ({}):", config.seed_urls.len());
    for url in &config.seed_urls {
        println!("  - {}", url);
    }

    println!("\nBlacklisted Substrings ({}):", config.blacklist.len());
    for entry in &config.blacklist {
        println!("  - {:?}", entry);
    }

    println!("\n✓ Configuration is valid");
    if config.seed_urls.is_empty() {
        println!("✗ No root URLs: traffic generation would stop immediately");
    } else {
        println!(
            "✓ Would start generating traffic from {} root URLs",
            config.seed_urls.len()
        );
    }
}

/// Runs the engine until Ctrl-C, the optional deadline, or frontier exhaustion
async fn handle_traffic(config: Config, duration: Option<Duration>) -> anyhow::Result<()> {
    let mut engine =
        Engine::new(config, Arc::new(LoggingObserver)).context("creating traffic engine")?;

    if !engine.start().is_running() {
        anyhow::bail!("no URLs to visit; check root_urls in the configuration");
    }

    let interrupted = tokio::select! {
        reason = engine.wait() => {
            if let Some(reason) = reason {
                tracing::info!("Traffic generation finished: {}", reason);
            }
            false
        }
        _ = shutdown_signal(duration) => true,
    };

    if interrupted {
        tracing::info!("Stopping traffic generation");
        engine.stop().await;
    }

    print_summary(&engine.summary());
    Ok(())
}

/// Resolves on Ctrl-C or when the optional deadline passes
async fn shutdown_signal(duration: Option<Duration>) {
    let deadline = async {
        match duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending::<()>().await,
        }
    };

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C"),
        _ = deadline => tracing::info!("Run duration elapsed"),
    }
}
