//! symarc binary entry point.
//!
//! Parses arguments, installs logging on stderr and runs the job. Failures
//! print to stdout as `Command line error: ...` (exit 1) or `Error: ...`
//! (exit 2).

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use std::process::ExitCode;
use symarc_cli::{CliError, Config, EXIT_COMMAND_LINE, EXIT_FAILURE, commands};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let config = match Config::try_parse() {
        Ok(config) => config,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            println!("Command line error: {}", clap_message(&err));
            return ExitCode::from(EXIT_COMMAND_LINE);
        }
    };

    init_tracing(config.verbose);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<CliError>() {
            Some(CliError::CommandLine(message)) => {
                println!("Command line error: {message}");
                ExitCode::from(EXIT_COMMAND_LINE)
            }
            Some(cli) => {
                println!("Error: {cli}");
                ExitCode::from(cli.exit_code())
            }
            None => {
                println!("Error: {err:#}");
                ExitCode::from(EXIT_FAILURE)
            }
        },
    }
}

fn run(config: &Config) -> Result<()> {
    let job = config.resolve()?;
    tracing::debug!("Resolved job: {:?}", job);

    let summary = commands::run(&job)?;
    tracing::debug!(
        "{} symbols, {} skipped, {} duplicates",
        summary.symbols,
        summary.load.skipped,
        summary.load.duplicates
    );
    Ok(())
}

/// Logging goes to stderr so reports on stdout stay clean
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// First line of a clap error without its `error: ` prefix
fn clap_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}
