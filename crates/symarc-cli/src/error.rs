//! Error types for the symarc tool.
//!
//! Every failure is reported as one of five kinds. The kind decides the
//! message prefix and the process exit code.

use symarc_formats::input::InputError;
use symarc_formats::symbol::SymbolError;
use thiserror::Error;

/// Exit code for malformed or contradictory arguments
pub const EXIT_COMMAND_LINE: u8 = 1;

/// Exit code for every failure after the arguments were accepted
pub const EXIT_FAILURE: u8 = 2;

/// Errors reported by the symarc tool.
#[derive(Debug, Error)]
pub enum CliError {
    /// Malformed or contradictory arguments, unknown format or missing
    /// companion file
    #[error("{0}")]
    CommandLine(String),

    /// Input could not be opened or read
    #[error(transparent)]
    InputOpen(InputError),

    /// Input opened but its contents are not what the format promises
    #[error(transparent)]
    InputFormat(InputError),

    /// Output could not be created or written
    #[error("Cannot write {target}: {source}")]
    Output {
        /// Output path, or `<stdout>`
        target: String,
        /// Underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Archive parsed but failed a consistency check
    #[error(transparent)]
    Corruption(InputError),
}

impl CliError {
    /// Process exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::CommandLine(_) => EXIT_COMMAND_LINE,
            _ => EXIT_FAILURE,
        }
    }

    /// Wrap a failure on the write path
    pub fn output(
        target: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Output {
            target: target.into(),
            source: source.into(),
        }
    }
}

impl From<InputError> for CliError {
    fn from(err: InputError) -> Self {
        match err {
            InputError::UnknownFormat(_) | InputError::Unsupported { .. } => {
                Self::CommandLine(err.to_string())
            }
            InputError::Open { .. }
            | InputError::Io(_)
            | InputError::Archive(SymbolError::Io(_)) => Self::InputOpen(err),
            _ if matches!(&err, InputError::Archive(inner) if inner.is_corruption()) => {
                Self::Corruption(err)
            }
            _ => Self::InputFormat(err),
        }
    }
}
