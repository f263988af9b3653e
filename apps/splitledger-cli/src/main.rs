//! # splitledger CLI
//!
//! Command-line front end for `splitledger-core`.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          splitledger CLI                                │
//! │                                                                         │
//! │  args ──► CliConfig ──► Scenario (TOML) ──► Ledger ──► report / JSON    │
//! │   │          │                                             │            │
//! │   │          └── file + SPLITLEDGER_* env                  ▼            │
//! │   └── clap derive                                       stdout          │
//! │                                                                         │
//! │  logs ──► tracing-subscriber (EnvFilter) ──► stderr                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Commands
//! - `splitledger demo` - the hostel walkthrough
//! - `splitledger replay <FILE>` - replay a scenario file
//! - `splitledger config` - print the effective configuration

mod config;
mod error;
mod scenario;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use splitledger_core::{report, GroupBalances};
use tracing::{error, info, warn, Subscriber};
use tracing_subscriber::EnvFilter;

use crate::config::{CliConfig, OutputFormat};
use crate::error::CliResult;
use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "splitledger")]
#[command(about = "Split group expenses and track who owes whom", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the four-friend hostel walkthrough
    Demo {
        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Replay a TOML scenario file and print the balances
    Replay {
        /// Scenario file
        file: PathBuf,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // The configured filter is not known yet, so loading logs through a
    // provisional subscriber built from the default one
    let loaded = load_config(
        provisional_subscriber(&CliConfig::default().log.filter),
        cli.config.as_deref(),
    );
    let config = loaded.as_ref().cloned().unwrap_or_default();
    init_tracing(&config.log.filter);

    if let Err(e) = &loaded {
        if cli.config.is_some() {
            error!("Failed to load config: {}", e);
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
        warn!("Failed to load config: {}. Using defaults.", e);
    }

    match execute(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Commands, config: &CliConfig) -> CliResult<()> {
    match command {
        Commands::Demo { format } => {
            info!("Running demo scenario");
            let snapshots = scenario::run(&Scenario::demo()?, config.split.rounding)?;
            print_balances(&snapshots, format.unwrap_or(config.display.format), config)
        }
        Commands::Replay { file, format } => {
            let scenario = Scenario::from_file(&file)?;
            let snapshots = scenario::run(&scenario, config.split.rounding)?;
            print_balances(&snapshots, format.unwrap_or(config.display.format), config)
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn print_balances(
    snapshots: &[GroupBalances],
    format: OutputFormat,
    config: &CliConfig,
) -> CliResult<()> {
    match format {
        OutputFormat::Text => {
            for (i, balances) in snapshots.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print!("{}", report::render(balances, &config.display.currency_symbol));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(snapshots)?),
    }
    Ok(())
}

/// Loads the configuration with `subscriber` as the thread's default.
fn load_config<S>(subscriber: S, path: Option<&Path>) -> CliResult<CliConfig>
where
    S: Subscriber + Send + Sync + 'static,
{
    tracing::subscriber::with_default(subscriber, || CliConfig::load(path))
}

fn provisional_subscriber(filter: &str) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(filter))
        .with_writer(std::io::stderr)
        .finish()
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured filter.
fn init_tracing(configured: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured))
        .with_writer(std::io::stderr)
        .init();
}

fn env_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
