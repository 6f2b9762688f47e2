// src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use dacskip::{CancelToken, KeyMode, Skipper, TargetDb};
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "dacskip")]
#[command(
    author,
    version,
    about = "Deployment guard for dacpac packages: skip deployments already applied to the target database",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a package has already been deployed (exit 0 yes, 1 no)
    Check {
        /// Path to the .dacpac package
        package: String,
        /// Path to the target SQLite database file
        target: String,
        /// Derive the identity key from the package file name instead of a path digest
        #[arg(long)]
        namekey: bool,
    },
    /// Record the package fingerprint in the target database
    Mark {
        /// Path to the .dacpac package
        package: String,
        /// Path to the target SQLite database file
        target: String,
        /// Derive the identity key from the package file name instead of a path digest
        #[arg(long)]
        namekey: bool,
    },
}

fn key_mode(namekey: bool) -> KeyMode {
    if namekey {
        KeyMode::FileName
    } else {
        KeyMode::PathDigest
    }
}

/// Run a check; true means the package is already deployed
fn cmd_check(package: &str, target: &str, namekey: bool, cancel: &CancelToken) -> Result<bool> {
    info!("Checking package: {}", package);
    let target = TargetDb::new(target);
    let deployed = Skipper::new().check(package, &target, key_mode(namekey), cancel)?;

    if deployed {
        println!(
            "Already deployed: {} (database {})",
            package,
            target.database_name()
        );
    } else {
        println!(
            "Not deployed: {} (database {})",
            package,
            target.database_name()
        );
    }
    Ok(deployed)
}

fn cmd_mark(package: &str, target: &str, namekey: bool, cancel: &CancelToken) -> Result<()> {
    info!("Marking package: {}", package);
    let target = TargetDb::new(target);
    Skipper::new().mark(package, &target, key_mode(namekey), cancel)?;

    println!(
        "Registered: {} (database {})",
        package,
        target.database_name()
    );
    Ok(())
}

fn main() -> ExitCode {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    match cli.command {
        Commands::Check {
            package,
            target,
            namekey,
        } => match cmd_check(&package, &target, namekey, &cancel) {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                eprintln!("error: {:#}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Mark {
            package,
            target,
            namekey,
        } => match cmd_mark(&package, &target, namekey, &cancel) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}
