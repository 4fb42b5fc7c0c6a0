//! Error types for packed field schemas

use thiserror::Error;

/// Errors that can occur when constructing a packed field
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackedError {
    /// A sub-field is wider than the 64-bit value it must round-trip through
    #[error("Sub-field {index} is {bits} bits wide, maximum is 64")]
    WidthTooLarge {
        /// Position of the sub-field in the schema
        index: usize,
        /// Declared width in bits
        bits: u8,
    },
}

/// Result type alias for packed field operations
pub type Result<T> = std::result::Result<T, PackedError>;
