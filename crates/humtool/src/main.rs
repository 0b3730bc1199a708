//! humtool - inspect the spine structure of Humdrum files
//!
//! Subcommands:
//! - `humtool spines <files>` - Print every line as sub-spine path labels
//! - `humtool tracks <files>` - Print the track table
//! - `humtool nulls <files>` - Show where each null token points
//! - `humtool measures <files>` - Measure table and rhythm findings
//! - `humtool check <files>` - Validate spine structure
//! - `humtool config` - Show the effective configuration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use humconf::{HumConfig, OutputFormat};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "humtool")]
#[command(about = "Inspect the spine structure of Humdrum files")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ./humdrum.toml
    #[arg(long, global = true)]
    config: Option<String>,

    /// Output format: text or json
    #[arg(long, global = true)]
    format: Option<OutputFormat>,

    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print each line with its fields replaced by path labels
    Spines {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the track table
    Tracks {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print every null token and the token it continues
    Nulls {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Only list nulls with no antecedent
        #[arg(long)]
        unresolved: bool,
    },

    /// Print measures, durations and rhythm findings
    Measures {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Validate spine structure; exits with status 1 if any file fails
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the effective configuration and where it came from
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_level: &str, verbose: u8) {
    let directive = match verbose {
        0 => log_level,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Returns false when at least one input failed.
fn run(cli: Cli) -> Result<bool> {
    let config_path = cli.config.as_deref().map(humconf::expand_path);
    let (mut config, sources) = HumConfig::load_with_sources_from(config_path.as_deref())
        .context("Failed to load configuration")?;
    if let Some(format) = cli.format {
        config.output.format = format;
    }

    init_tracing(&config.logging.log_level, cli.verbose);
    tracing::debug!(files = ?sources.files, env = ?sources.env_overrides, "configuration loaded");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let ok = match cli.command {
        Commands::Spines { files } => commands::spines(&files, &config, &mut out)?,
        Commands::Tracks { files } => commands::tracks(&files, &config, &mut out)?,
        Commands::Nulls { files, unresolved } => {
            if unresolved {
                config.analysis.null_report = humconf::NullReport::Unresolved;
            }
            commands::nulls(&files, &config, &mut out)?
        }
        Commands::Measures { files } => commands::measures(&files, &config, &mut out)?,
        Commands::Check { files } => commands::check(&files, &config, &mut out)?,
        Commands::Config => {
            commands::show_config(&config, &sources, &mut out)?;
            true
        }
    };

    out.flush().context("Failed to flush output")?;
    Ok(ok)
}
