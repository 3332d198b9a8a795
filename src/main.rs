//! # Ruit CLI
//!
//! Command-line interface for the resolver library (`ruit_core`).
//! This binary parses arguments, sets up configuration, wires the runner to the
//! lookup bridge and processes either a CSV of names or a single address.

use ruit_core::{
    initialize_runner, load_names, AppError, AuthenticationError, BatchRunner, ConfigBuilder,
    Investigation, ProbeOutcome, Result,
};

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Resolves person names into account email addresses.",
    long_about = "Ruit generates likely addresses for every name of a CSV file, checks them one at a time against the lookup service and reports the public profile of every account it finds."
)]
struct AppArgs {
    /// CSV file with a column of display names (required unless --email is given).
    #[arg(env = "RUIT_INPUT", required_unless_present = "email")]
    input: Option<PathBuf>,

    /// Investigate a single address instead of processing a CSV file.
    #[arg(long, env = "RUIT_EMAIL", conflicts_with = "input")]
    email: Option<String>,

    /// Write the single-address report as JSON to this file.
    #[arg(long, env = "RUIT_JSON", requires = "email")]
    json: Option<PathBuf>,

    /// Path to a configuration file (TOML format). CLI args override file settings.
    #[arg(long, env = "RUIT_CONFIG")]
    config_file: Option<String>,

    /// Base URL of the lookup bridge.
    #[arg(long, env = "RUIT_SERVICE_URL")]
    service_url: Option<String>,

    /// File holding the stored session token.
    #[arg(long, env = "RUIT_CREDENTIALS")]
    credentials: Option<String>,

    /// Seconds to wait after every probe attempt.
    #[arg(long, env = "RUIT_PACING_INTERVAL")]
    pacing_interval: Option<u64>,

    /// HTTP request timeout in seconds.
    #[arg(long, env = "RUIT_REQUEST_TIMEOUT")]
    request_timeout: Option<u64>,

    /// User agent sent to the lookup bridge.
    #[arg(long, env = "RUIT_USER_AGENT")]
    user_agent: Option<String>,

    /// Domain appended to generated candidates.
    #[arg(long, env = "RUIT_DOMAIN")]
    domain: Option<String>,

    /// Name of the CSV column holding display names.
    #[arg(long, env = "RUIT_NAME_COLUMN")]
    name_column: Option<String>,

    /// Directory receiving one file of resolved addresses per name.
    #[arg(long, env = "RUIT_OUTPUT_DIR")]
    output_dir: Option<String>,

    /// Directory receiving one JSON report per resolved address.
    #[arg(long, env = "RUIT_REPORT_DIR")]
    report_dir: Option<String>,

    /// Skip the gaming, maps and calendar lookups for resolved addresses.
    #[arg(long, action = clap::ArgAction::SetTrue, env = "RUIT_NO_ENRICH")]
    no_enrich: bool,
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Setting up tracing subscriber failed")
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!("Ruit CLI v{} starting...", env!("CARGO_PKG_VERSION"));

    let args = AppArgs::parse();
    tracing::debug!("Parsed CLI arguments: {:?}", args);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_fatal(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(args: AppArgs) -> Result<()> {
    let mut config_builder = ConfigBuilder::new();

    if let Some(ref path) = args.config_file {
        config_builder = config_builder.config_file(path);
    }
    if let Some(ref url) = args.service_url {
        config_builder = config_builder.service_url(url);
    }
    if let Some(ref path) = args.credentials {
        config_builder = config_builder.credentials_path(path);
    }
    if let Some(secs) = args.pacing_interval {
        config_builder = config_builder.pacing_interval(Duration::from_secs(secs));
    }
    if let Some(secs) = args.request_timeout {
        config_builder = config_builder.request_timeout(Duration::from_secs(secs));
    }
    if let Some(ref ua) = args.user_agent {
        config_builder = config_builder.user_agent(ua);
    }
    if let Some(ref domain) = args.domain {
        config_builder = config_builder.email_domain(domain);
    }
    if let Some(ref column) = args.name_column {
        config_builder = config_builder.name_column(column);
    }
    if let Some(ref dir) = args.output_dir {
        config_builder = config_builder.output_dir(dir);
    }
    if let Some(ref dir) = args.report_dir {
        config_builder = config_builder.report_dir(dir);
    }
    if args.no_enrich {
        config_builder = config_builder.enrich(false);
    }

    let config = Arc::new(config_builder.build()?);
    tracing::debug!("Effective configuration loaded: {:?}", *config);

    let mut runner = initialize_runner(config.clone())?;

    match (&args.email, &args.input) {
        (Some(address), _) => process_single_mode(&mut runner, address, args.json.as_deref()).await,
        (None, Some(input)) => {
            let rows = load_names(input, &config.name_column)?;
            process_file_mode(&mut runner, input, rows).await
        }
        (None, None) => Err(AppError::Config(
            "either an input file or --email is required".to_string(),
        )),
    }
}

async fn process_file_mode(
    runner: &mut BatchRunner,
    input: &Path,
    rows: Vec<ruit_core::NameRow>,
) -> Result<()> {
    tracing::info!("Running in File Processing mode. Input: '{}'", input.display());
    if rows.is_empty() {
        tracing::warn!("Input file '{}' contains no names. Nothing to do.", input.display());
        return Ok(());
    }
    tracing::info!("Loaded {} names from input file.", rows.len());

    let pb = ProgressBar::new(rows.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} | {msg}",
            )
            .map_err(|e| AppError::Config(format!("Failed to set progress bar template: {}", e)))?
            .progress_chars("=> "),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    runner.set_progress(pb);

    let result = tokio::select! {
        result = runner.run(&rows) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupt received, stopping...");
            Err(AppError::Interrupted)
        }
    };
    runner.shutdown().await;

    let summary = result?;
    if summary.names_with_matches == 0 {
        tracing::info!("No addresses resolved for any name.");
    }
    Ok(())
}

async fn process_single_mode(
    runner: &mut BatchRunner,
    address: &str,
    json: Option<&Path>,
) -> Result<()> {
    tracing::info!("Running in Single Address mode for '{}'.", address);
    let start_time = Instant::now();

    let result = tokio::select! {
        result = runner.investigate(address, json) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupt received, stopping...");
            Err(AppError::Interrupted)
        }
    };
    runner.shutdown().await;

    print_investigation(address, &result?);
    tracing::info!("Single address mode finished. Duration: {:.2?}", start_time.elapsed());
    Ok(())
}

/// Prints the outcome for a single address to standard output.
fn print_investigation(address: &str, investigation: &Investigation) {
    const BLUE: &str = "\x1b[34m";
    const GREEN: &str = "\x1b[32m";
    const YELLOW: &str = "\x1b[33m";
    const RED: &str = "\x1b[31m";
    const RESET: &str = "\x1b[0m";

    println!("\n{BLUE}===== Ruit Results ====={RESET}");
    println!("Address: {}", address);

    match &investigation.outcome {
        ProbeOutcome::Resolved(record) => {
            println!("\n{GREEN}Status: FOUND{RESET}");
            println!("Account ID: {}", record.account_id);
            let containers: Vec<&str> = record.containers.keys().map(|c| c.as_str()).collect();
            println!("Containers: {}", containers.join(", "));
        }
        ProbeOutcome::NoPublicProfile => {
            println!("\n{YELLOW}Status: NO PUBLIC PROFILE{RESET}");
        }
        ProbeOutcome::NotFound => {
            println!("\n{YELLOW}Status: NOT FOUND{RESET}");
        }
        ProbeOutcome::TransientError(e) => {
            println!("\n{RED}Status: ERROR{RESET}");
            println!("Error: {}", e);
        }
    }

    if let Some(ref enrichment) = investigation.enrichment {
        let report = &enrichment.report;
        println!("\n{BLUE}Sections:{RESET}");
        println!(
            "- play_games: {}",
            report.play_games.as_ref().map_or("none".to_string(), |p| p.name.clone())
        );
        println!(
            "- maps:       {}",
            if report.maps.is_empty() { "none" } else { "present" }
        );
        println!(
            "- calendar:   {}",
            if report.calendar.is_some() { "public" } else { "none" }
        );
        for failure in &enrichment.failures {
            println!("{YELLOW}! {} unavailable: {}{RESET}", failure.section, failure.error);
        }
    }
    println!("{BLUE}========================{RESET}\n");
}

/// Logs a distinct message for every kind of fatal error.
fn report_fatal(error: &AppError) {
    match error {
        AppError::InputNotFound(path) => {
            tracing::error!("Input file not found: {}", path.display())
        }
        AppError::MalformedInput(reason) => {
            tracing::error!("Input file is malformed: {}", reason)
        }
        AppError::Csv(e) => tracing::error!("Input file is malformed: {}", e),
        AppError::Authentication(AuthenticationError::MissingCredentials(path)) => {
            tracing::error!(
                "No stored session found at '{}'. Log in with the lookup bridge first.",
                path.display()
            )
        }
        AppError::Authentication(e) => tracing::error!("Authentication failed: {}", e),
        AppError::Interrupted => tracing::warn!("Run interrupted; session released."),
        AppError::Config(reason) => tracing::error!("Configuration error: {}", reason),
        other => tracing::error!("Execution failed: {}", other),
    }
}
