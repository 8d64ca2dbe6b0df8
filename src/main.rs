//! `timeseek` binary entrypoint.
//!
//! Prints the records of a log directory written in the last N minutes.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use timeseek_rs::{LogReader, ScanConfig};

/// Print the access log records of the last N minutes, oldest first.
#[derive(Parser, Debug)]
#[command(name = "timeseek")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory where the rotated log files are stored.
    #[arg(short, long, env = "TIMESEEK_DIRECTORY")]
    directory: Option<PathBuf>,

    /// Last n minutes worth of logs to read.
    #[arg(short = 't', long = "minutes", env = "TIMESEEK_MINUTES")]
    minutes: Option<u32>,

    /// JSON config file; flags take precedence over its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a scan report to stderr when done.
    #[arg(long)]
    stats: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(hint) = e
                .downcast_ref::<timeseek_rs::Error>()
                .and_then(|e| e.suggestion())
            {
                eprintln!("Hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::from_json_file(path).context("could not load config")?,
        None => ScanConfig::new(),
    };
    if let Some(directory) = &cli.directory {
        config = config.with_directory(directory);
    }
    if let Some(minutes) = cli.minutes {
        config = config.with_lookback_minutes(minutes);
    }

    let reader = LogReader::new(config).context("could not create logs")?;
    let mut stdout = io::stdout().lock();
    let result = reader.print(&mut stdout).context("could not print logs");

    if cli.stats {
        eprint!("{}", reader.metrics().get_report());
    }

    result
}
