//! symarc command-line tool.
//!
//! Builds `.sym` symbol archives from linker maps and `nm` dumps, and prints
//! existing archives as a text report. The binary is a thin wrapper:
//!
//! - `config`: command-line surface and resolution into a [`Job`]
//! - `commands`: runs a job against the `symarc-formats` codec
//! - `output`: text report for archive contents
//! - `error`: error kinds and exit codes
//!
//! # Example
//!
//! ```no_run
//! use symarc_cli::{Config, commands};
//!
//! let job = Config::from_args().resolve()?;
//! let summary = commands::run(&job)?;
//! println!("{} symbols", summary.symbols);
//! # Ok::<(), symarc_cli::CliError>(())
//! ```

#![warn(missing_docs)]

pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use commands::Summary;
pub use config::{Config, Job, Mode, OutputTarget};
pub use error::{CliError, EXIT_COMMAND_LINE, EXIT_FAILURE};
