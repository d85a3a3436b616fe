//! # fbdeploy CLI entry point
//!
//! Parses command-line arguments, resolves the deploy configuration,
//! connects to S3, and dispatches to the subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fbdeploy_cli::activate::{run_activate, ActivateArgs};
use fbdeploy_cli::list::{run_list, ListArgs};
use fbdeploy_cli::settings::{base_context, TargetArgs};
use fbdeploy_cli::upload::{run_upload, UploadArgs};
use fbdeploy_core::DeployPlugin;
use fbdeploy_s3::{S3Config, S3Store};

/// Manage FastBoot app-server deployments in S3.
///
/// Uploads build archives, lists revisions with the active one marked, and
/// activates a revision by rewriting the pointer manifest.
#[derive(Parser, Debug)]
#[command(name = "fbdeploy", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(flatten)]
    target: TargetArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload a built archive.
    Upload(UploadArgs),

    /// List revisions, newest first, marking the active one.
    List(ListArgs),

    /// Point the manifest at a revision.
    Activate(ActivateArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = cli.target.load_config(&cwd)?;

    let store = S3Store::connect(S3Config::from(&config))
        .await
        .context("failed to create S3 client")?;
    let plugin = DeployPlugin::new(store, config);
    let ctx = base_context();
    let mut out = std::io::stdout().lock();

    match &cli.command {
        Commands::Upload(args) => run_upload(&plugin, &ctx, args, &mut out).await,
        Commands::List(args) => run_list(&plugin, &ctx, args, &mut out).await,
        Commands::Activate(args) => run_activate(&plugin, &ctx, args, &mut out).await,
    }
}
