//! CLI entry point for the crash monitor.
//!
//! Scores the current market once, keeps a scheduled refresh running, or
//! prints the scoring methodology.

use anyhow::Result;
use clap::{Parser, Subcommand};
use crash_monitor_lib::analysis::methodology;
use crash_monitor_lib::config::{Config, LogFormat};
use crash_monitor_lib::core::orchestrator::{Orchestrator, RefreshReport};
use crash_monitor_lib::core::scheduler;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "crash-monitor")]
#[command(about = "Market crash index from macro and market indicators", long_about = None)]
struct Cli {
    /// Log output format, overrides LOG_FORMAT
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every indicator once and print the crash index
    Score {
        /// Print the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Refresh on a schedule and print each new score
    Watch {
        /// Six-field cron expression, overrides CRASH_MONITOR_CRON
        #[arg(long)]
        cron: Option<String>,
    },
    /// Print how the index is computed
    Methodology,
    /// Fetch once and print the health of each indicator
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(format) = cli.log_format.as_deref() {
        config.log_format = format.parse().unwrap_or_default();
    }
    init_tracing(config.log_format);

    match cli.command {
        Commands::Score { json } => {
            let orchestrator = Orchestrator::from_config(&config)?;
            let report = orchestrator.refresh().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_score(&report);
            }
        }
        Commands::Watch { cron } => {
            let cron = cron.unwrap_or_else(|| config.cron.clone());
            let orchestrator = Arc::new(Orchestrator::from_config(&config)?);
            let (mut sched, mut rx) = scheduler::init(orchestrator, &cron).await?;

            loop {
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            warn!("Report channel closed");
                            break;
                        }
                        let latest = rx.borrow_and_update().clone();
                        if let Some(report) = latest {
                            print_score(&report);
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Shutting down");
                        break;
                    }
                }
            }
            sched.shutdown().await?;
        }
        Commands::Methodology => {
            print!("{}", methodology::render());
        }
        Commands::Status => {
            let orchestrator = Orchestrator::from_config(&config)?;
            let report = orchestrator.refresh().await;
            print_status(&report);
        }
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output, logs go to stderr
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_ansi(true).with_writer(std::io::stderr))
            .init(),
    }
}

fn print_score(report: &RefreshReport) {
    match (&report.crash_index, &report.unavailable) {
        (Some(result), _) => {
            println!("Crash Index: {}/100 ({})", result.score, result.risk);
            println!("  {}", result.risk.description());
            println!(
                "  Leading {:.1}/40  Concurrent {:.1}/35  Lagging {:.1}/25",
                result.breakdown.leading, result.breakdown.concurrent, result.breakdown.lagging
            );
            for factor in &result.factors {
                println!("  - {}", factor);
            }
            println!("  as of {}", result.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        (None, Some(reason)) => println!("Crash Index unavailable: {}", reason),
        (None, None) => println!("Crash Index unavailable"),
    }
    if !report.failures.is_empty() {
        println!("  ({} indicators failed to load)", report.failures.len());
    }
}

fn print_status(report: &RefreshReport) {
    for reading in &report.readings {
        let marker = if reading.is_fallback { " (default)" } else { "" };
        println!(
            "{:<22} {:>14}{:<10} {:?}",
            reading.name, reading.formatted, marker, reading.status
        );
    }
    for failure in &report.failures {
        println!("failed: {} ({})", failure.kind, failure.error);
    }
}
