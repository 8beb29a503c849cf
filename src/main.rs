//! CLI entry point for the ESG scorer.
//!
//! Provides subcommands for building score reports from a local store or
//! the data API, exporting normalized entries, and re-scoring on an interval.

use anyhow::Result;
use clap::{Parser, Subcommand};
use esg_scorer::{
    config::Settings,
    normalize::Normalizer,
    output::{append_record, log_years, print_json, print_pretty, write_csv, write_json},
    report::{Snapshot, build_company_report, build_report},
    source::{SubmissionSource, open_source},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "esg_scorer")]
#[command(about = "Aggregate ESG submissions into per-category scores", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a score report from a store file or the data API
    Report {
        /// Path to a store file or URL of the data API
        #[arg(short, long, value_name = "FILE_OR_URL")]
        source: String,

        /// Only score submissions from this company (case-insensitive)
        #[arg(short, long, conflicts_with = "by_company")]
        company: Option<String>,

        /// Break the report down per company
        #[arg(long, default_value_t = false)]
        by_company: bool,

        /// Write the full report as JSON
        #[arg(long)]
        json: Option<String>,

        /// Write the year summaries as CSV
        #[arg(long, conflicts_with = "by_company")]
        csv: Option<String>,
    },
    /// Export normalized entries as CSV
    Entries {
        /// Path to a store file or URL of the data API
        #[arg(short, long, value_name = "FILE_OR_URL")]
        source: String,

        /// CSV file to write entries to
        #[arg(short, long, default_value = "entries.csv")]
        output: String,
    },
    /// Re-score the source on a fixed interval
    Watch {
        /// Path to a store file or URL of the data API
        #[arg(short, long, value_name = "FILE_OR_URL")]
        source: String,

        /// Seconds between runs
        #[arg(short, long, default_value_t = 60)]
        interval: u64,

        /// Number of runs (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 0)]
        runs: usize,

        /// Optional CSV file to append one snapshot row to per run
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = Settings::from_env()?;

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = Path::new(&settings.log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&settings.log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("esg_scorer.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let normalizer = Normalizer::new();

    match cli.command {
        Commands::Report {
            source,
            company,
            by_company,
            json,
            csv,
        } => {
            let source = open_source(&source, &settings)?;

            if by_company {
                let report = build_company_report(source.as_ref(), &normalizer).await?;
                for company in &report.companies {
                    info!(
                        company = %company.company_name,
                        years = company.years.len(),
                        environmental = %company.overall.environmental,
                        social = %company.overall.social,
                        governance = %company.overall.governance,
                        overall = %company.overall.overall,
                        "Company scores"
                    );
                }
                if let Some(path) = json {
                    write_json(&path, &report)?;
                    info!(path = %path, "Company report written");
                }
            } else {
                let report = build_report(source.as_ref(), &normalizer, company.as_deref()).await?;
                print_pretty(&report);
                log_years(&report.years);
                print_json(&report.overall)?;

                if let Some(path) = json {
                    write_json(&path, &report)?;
                    info!(path = %path, "Report written");
                }
                if let Some(path) = csv {
                    write_csv(&path, &report.years)?;
                    info!(path = %path, rows = report.years.len(), "Year summaries written");
                }
            }
        }
        Commands::Entries { source, output } => {
            let source = open_source(&source, &settings)?;
            let submissions = source.list_submissions().await?;
            let entries = normalizer.normalize_all(&submissions);

            write_csv(&output, &entries)?;
            info!(
                path = %output,
                submissions = submissions.len(),
                entries = entries.len(),
                "Normalized entries written"
            );
        }
        Commands::Watch {
            source,
            interval,
            runs,
            output,
        } => {
            let source = open_source(&source, &settings)?;
            watch(source.as_ref(), interval, runs, output.as_deref()).await?;
        }
    }

    Ok(())
}

/// Rebuilds the report from a fresh snapshot every `interval` seconds.
///
/// Each run is independent; a failed run is logged and the loop carries on.
#[tracing::instrument(skip(source), fields(source = %source.describe()))]
async fn watch(
    source: &dyn SubmissionSource,
    interval: u64,
    runs: usize,
    output: Option<&str>,
) -> Result<()> {
    if runs == 0 {
        info!(interval, "Watching indefinitely. Press Ctrl+C to stop.");
    } else {
        info!(runs, interval, "Starting watch");
    }

    let mut run_count = 0;

    loop {
        // 0 = infinite
        if runs > 0 && run_count >= runs {
            break;
        }

        run_count += 1;

        // The fallback year can roll over between runs.
        let normalizer = Normalizer::new();

        match build_report(source, &normalizer, None).await {
            Ok(report) => {
                let snapshot = Snapshot::from_report(&report);
                info!(
                    run = run_count,
                    environmental = %snapshot.environmental,
                    social = %snapshot.social,
                    governance = %snapshot.governance,
                    overall = %snapshot.overall,
                    "Scores refreshed"
                );
                if let Some(path) = output {
                    if let Err(e) = append_record(path, &snapshot) {
                        error!(error = %e, path, "Failed to append snapshot");
                    }
                }
            }
            Err(e) => {
                error!(run = run_count, error = %e, "Refresh failed");
            }
        }

        if runs == 0 || run_count < runs {
            tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
        }
    }

    info!(run_count, "Watch finished");
    Ok(())
}
