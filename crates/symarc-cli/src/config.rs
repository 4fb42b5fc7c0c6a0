//! Command-line configuration.
//!
//! [`Config`] is the raw clap surface. [`Config::resolve`] applies the
//! defaults and checks that turn it into a [`Job`] before any input is read:
//!
//! - the input format is inferred from the extension when `--format` is
//!   omitted (`.map` is an MSVC map on Windows hosts, a GNU map elsewhere)
//! - archive inputs are extracted to a text report, everything else is
//!   built into an archive
//! - the output defaults to the input path with a `.sym` extension when
//!   building and to standard output when extracting
//! - PDB inputs need a PE companion, given with `--exe` or found next to
//!   the input as `<stem>.exe` or `<stem>.dll`
//!
//! # Example
//!
//! ```
//! use clap::Parser;
//! use symarc_cli::{Config, Mode};
//!
//! let config = Config::try_parse_from(["symarc", "app.nm"])?;
//! let job = config.resolve()?;
//! assert_eq!(job.mode, Mode::Build);
//! assert_eq!(job.output.to_string(), "app.sym");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::CliError;
use clap::{ArgAction, Parser};
use std::fmt;
use std::path::{Path, PathBuf};
use symarc_formats::input::{AdapterOptions, InputError, InputFormat};
use tracing::warn;

/// Extensions searched for a PDB's PE companion, in order
const COMPANION_EXTENSIONS: [&str; 2] = ["exe", "dll"];

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "symarc",
    about = "Build compact .sym symbol archives from linker maps and nm dumps",
    long_about = "Build compact .sym symbol archives from linker maps and nm dumps.\n\n\
                  Given a .sym archive, print its contents as a text report instead.",
    version,
    disable_help_flag = true
)]
pub struct Config {
    /// Input file: linker map, nm dump, PDB or .sym archive
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output path [default: INPUT with a .sym extension, or stdout when extracting]
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Input format: Symbol, MSMap, GNUMap, PDB or GNUNm [default: from the extension]
    #[arg(short, long, value_name = "FMT")]
    pub format: Option<InputFormat>,

    /// PE binary accompanying a PDB input
    #[arg(long, value_name = "PATH")]
    pub exe: Option<PathBuf>,

    /// Do not append "()" to names without a parameter list
    #[arg(long)]
    pub no_parens: bool,

    /// Log debug details to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Print help
    #[arg(short = 'h', long = "help", short_alias = '?', action = ArgAction::Help)]
    #[allow(dead_code)]
    help: Option<bool>,
}

/// What a job does with its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Load symbols through an adapter and write an archive
    Build,
    /// Read an archive and write a text report
    Extract,
}

/// Where a job writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output
    Stdout,
    /// A file, created or truncated
    File(PathBuf),
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("<stdout>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fully resolved, validated work item
#[derive(Debug, Clone)]
pub struct Job {
    /// Input path
    pub input: PathBuf,
    /// Input format, given or inferred
    pub format: InputFormat,
    /// Build or extract
    pub mode: Mode,
    /// Output destination
    pub output: OutputTarget,
    /// PE companion of a PDB input
    pub exe: Option<PathBuf>,
    /// Name normalisation for the text adapters
    pub options: AdapterOptions,
}

impl Config {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Apply defaults and validate.
    ///
    /// # Errors
    ///
    /// Returns `CliError::CommandLine` if:
    /// - no format is given and the extension is not recognised
    /// - a PDB input has no PE companion
    /// - the format is not supported by this build
    pub fn resolve(&self) -> Result<Job, CliError> {
        let format = match self.format {
            Some(format) => format,
            None => InputFormat::infer(&self.input).ok_or_else(|| {
                CliError::CommandLine(format!(
                    "Cannot infer the format of {}, use --format",
                    self.input.display()
                ))
            })?,
        };

        let exe = if format == InputFormat::Pdb {
            Some(self.companion()?)
        } else {
            if let Some(exe) = &self.exe {
                warn!("Ignoring --exe {} for {} input", exe.display(), format);
            }
            None
        };

        if !format.is_supported() {
            return Err(InputError::Unsupported { format }.into());
        }

        let mode = if format == InputFormat::Symbol {
            Mode::Extract
        } else {
            Mode::Build
        };

        let output = match &self.output {
            Some(path) if path.as_os_str() == "-" => OutputTarget::Stdout,
            Some(path) => OutputTarget::File(path.clone()),
            None => match mode {
                Mode::Build => OutputTarget::File(self.input.with_extension("sym")),
                Mode::Extract => OutputTarget::Stdout,
            },
        };

        Ok(Job {
            input: self.input.clone(),
            format,
            mode,
            output,
            exe,
            options: AdapterOptions {
                append_parens: !self.no_parens,
            },
        })
    }

    /// PE binary for a PDB input
    fn companion(&self) -> Result<PathBuf, CliError> {
        if let Some(exe) = &self.exe {
            return if exe.is_file() {
                Ok(exe.clone())
            } else {
                Err(CliError::CommandLine(format!(
                    "PE binary not found: {}",
                    exe.display()
                )))
            };
        }

        find_companion(&self.input).ok_or_else(|| {
            CliError::CommandLine(format!(
                "PDB input {} needs --exe, no .exe or .dll found next to it",
                self.input.display()
            ))
        })
    }
}

/// First existing `<stem>.exe` or `<stem>.dll` beside `input`
fn find_companion(input: &Path) -> Option<PathBuf> {
    COMPANION_EXTENSIONS
        .iter()
        .map(|ext| input.with_extension(ext))
        .find(|candidate| candidate.is_file())
}
