//! fubber: local code search.
//!
//! Thin dispatcher over the engine. Exit codes: 0 success, 1 resolution
//! or query parse failure, 2 I/O or store error, 3 invalid arguments.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fubber_core::errors::ConfigError;
use fubber_core::Settings;
use fubber_engine::EngineError;

#[derive(Parser)]
#[command(name = "fubber")]
#[command(about = "Local code search", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a project root
    Init {
        /// Project directory to register
        path: PathBuf,
    },

    /// Fully (re)index the project containing the current directory
    Index,

    /// Incrementally refresh the current project's index
    Update,

    /// Search the current project
    Search {
        /// Query string
        query: String,

        /// Maximum results to return
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Emit one JSON object per hit
        #[arg(long)]
        json: bool,
    },

    /// List registered projects
    Projects,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code: u8 = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 3,
            };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("fubber: {err}");
            return ExitCode::from(2);
        }
    };

    match run(cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fubber: {err}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn run(cli: Cli, settings: &Settings) -> Result<(), EngineError> {
    match cli.command {
        Commands::Init { path } => commands::init(settings, &path),
        Commands::Index => commands::index(settings),
        Commands::Update => commands::update(settings),
        Commands::Search { query, limit, json } => {
            commands::search(settings, &query, limit, json)
        }
        Commands::Projects => commands::projects(settings),
    }
}

fn exit_code_for(err: &EngineError) -> u8 {
    match err {
        EngineError::Query(_) => 1,
        EngineError::Config(ConfigError::HomeNotSet) => 2,
        EngineError::Config(_) => 1,
        EngineError::Scan(_) | EngineError::Extraction(_) | EngineError::Storage(_) => 2,
    }
}
