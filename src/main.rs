//! entra-role-report - directory role assignment report.
//!
//! Lists a user's Entra ID directory role assignments, resolves each scope
//! (tenant-wide or administrative unit) and enumerates AU members.

#![deny(clippy::all)]

mod auth;
mod config;
mod directory;
mod error;
mod output;
mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use directory::GraphDirectory;
use error::AppError;
use output::OutputFormat;
use report::Subject;

/// Report Entra ID directory role assignments and administrative unit membership.
#[derive(Parser, Debug)]
#[command(name = "entra-role-report")]
#[command(version)]
struct Cli {
    /// User to report on (object ID or UPN). Defaults to the signed-in user.
    #[arg(short, long)]
    user: Option<String>,

    /// Output format. Inferred from the --output extension when omitted.
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pre-issued Graph access token; skips interactive sign-in.
    #[arg(long, env = "GRAPH_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    // Load .env file (if present) before anything else
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(2);
        }
    };

    init_logging(&config, cli.verbose);
    info!("Starting {} v{}", config.app.name, env!("CARGO_PKG_VERSION"));

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli, config)) {
        error!("{:#}", e);
        let (message, code) = match e.downcast_ref::<AppError>() {
            Some(app_error) => (app_error.user_message().to_string(), app_error.exit_code()),
            None => ("An error occurred.".to_string(), 1),
        };
        eprintln!("Error: {:#}\n{}", e, message);
        std::process::exit(code);
    }
}

/// Initialize tracing/logging. Logs go to stderr so stdout carries only the report.
fn init_logging(config: &Config, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

/// Establish the session, build the report, write it, close the session.
async fn run(cli: Cli, config: Config) -> Result<()> {
    let format = OutputFormat::resolve(cli.format, cli.output.as_deref());

    if cli.access_token.is_none() {
        config
            .validate_for_sign_in()
            .map_err(|e| AppError::Config(e.to_string()))?;
    }

    let session = auth::establish_session(&config, cli.access_token)
        .await
        .map_err(AppError::from)
        .context("Failed to establish Graph session")?;

    let directory = GraphDirectory::new(&config, session).map_err(AppError::from)?;

    let subject = match cli.user {
        Some(user) => Subject::Explicit(user),
        None => Subject::CurrentUser,
    };

    let result = report_to(&directory, &subject, format, cli.output.as_deref()).await;
    directory.close();
    result
}

async fn report_to(
    directory: &GraphDirectory,
    subject: &Subject,
    format: OutputFormat,
    output_path: Option<&Path>,
) -> Result<()> {
    let entries = report::build_report(directory, subject)
        .await
        .map_err(AppError::from)?;

    if entries.is_empty() {
        info!("No directory role assignments found");
    }

    output::write_report(&entries, format, output_path).context("Failed to write report")?;
    Ok(())
}
