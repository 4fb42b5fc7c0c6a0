//! Error types for symbol input adapters

use crate::input::InputFormat;
use crate::symbol::SymbolError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading symbols from an input
#[derive(Debug, Error)]
pub enum InputError {
    /// Input could not be opened
    #[error("Cannot open {}: {source}", path.display())]
    Open {
        /// Input path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Read failure after the input was opened
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed line in a text input
    #[error("Line {line}: {message}")]
    Parse {
        /// One-based line number
        line: usize,
        /// What was wrong with it
        message: String,
    },

    /// Format name not recognised
    #[error("Unknown input format '{0}', expected one of Symbol, MSMap, GNUMap, PDB, GNUNm")]
    UnknownFormat(String),

    /// Format recognised but not available in this build
    #[error("{format} input is not supported on this host")]
    Unsupported {
        /// Requested format
        format: InputFormat,
    },

    /// Existing archive could not be decoded
    #[error(transparent)]
    Archive(#[from] SymbolError),
}

/// Result type alias for input adapter operations
pub type Result<T> = std::result::Result<T, InputError>;
