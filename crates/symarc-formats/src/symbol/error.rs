//! Error types for the symbol archive format

use crate::packed::PackedError;
use thiserror::Error;

/// Errors that can occur when reading or writing symbol archives
#[derive(Debug, Error)]
pub enum SymbolError {
    /// Invalid signature (expected "Symbolic")
    #[error("Invalid signature: expected 'Symbolic', got {0:?}")]
    InvalidSignature([u8; 8]),

    /// Version other than 1.0.0.0
    #[error("Unsupported version: {}.{}.{}.{}", .0[0], .0[1], .0[2], .0[3])]
    UnsupportedVersion([u8; 4]),

    /// Source ended before a section was complete
    #[error("Truncated archive: short read in {section}")]
    TruncatedData {
        /// Section being read when the source ran out
        section: &'static str,
    },

    /// Header declares a field wider than 64 bits
    #[error("Invalid {field} bit count {bits}, maximum is 64")]
    InvalidFieldWidth {
        /// Header field name
        field: &'static str,
        /// Declared width
        bits: u8,
    },

    /// Symbol row refers to a string that does not exist
    #[error("Symbol {row} refers to name {name_id}, string table has {string_count} entries")]
    InvalidNameId {
        /// Symbol table row
        row: usize,
        /// Name ID stored in the row
        name_id: u64,
        /// Number of strings in the archive
        string_count: usize,
    },

    /// Running offset sum left the 64-bit range
    #[error("Symbol {row} offset overflows 64 bits")]
    OffsetOverflow {
        /// Symbol table row
        row: usize,
    },

    /// String row shares more bytes than its predecessor has
    #[error("String {row} shares {prefix} bytes with a {previous_len}-byte predecessor")]
    InvalidPrefix {
        /// String table row
        row: usize,
        /// Declared prefix length
        prefix: u64,
        /// Length of the previous string
        previous_len: usize,
    },

    /// Reconstructed name is longer than the header allows
    #[error("String {row} is {length} bytes long, header maximum is {max}")]
    NameTooLong {
        /// String table row
        row: usize,
        /// Reconstructed length
        length: u64,
        /// `max_string_length` from the header
        max: u32,
    },

    /// Header declares symbols but a width that cannot encode them
    #[error("Zero-width {field} field in an archive of {count} symbols")]
    MissingFieldWidth {
        /// Header field name
        field: &'static str,
        /// Declared symbol count
        count: u32,
    },

    /// String row reconstructs an empty name
    #[error("String {row} is empty")]
    EmptyName {
        /// String table row
        row: usize,
    },

    /// Non-empty database written before `compile()`
    #[error("Symbol database must be compiled before it is written")]
    NotCompiled,

    /// Symbol count does not fit the 32-bit header field
    #[error("Too many symbols: {0} exceeds the 32-bit symbol count")]
    TooManySymbols(usize),

    /// Name length does not fit the 32-bit header field
    #[error("Symbol name of {0} bytes exceeds the 32-bit length field")]
    NameLengthOverflow(usize),

    /// Packed row schema error
    #[error("Packed field error: {0}")]
    Packed(#[from] PackedError),

    /// Binary read/write error
    #[error("Binary parsing error: {0}")]
    BinRead(String),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SymbolError {
    /// Whether the archive parsed but failed an internal consistency check
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::InvalidPrefix { .. }
                | Self::NameTooLong { .. }
                | Self::EmptyName { .. }
                | Self::OffsetOverflow { .. }
        )
    }
}

impl From<binrw::Error> for SymbolError {
    fn from(e: binrw::Error) -> Self {
        Self::BinRead(e.to_string())
    }
}

/// Result type alias for symbol archive operations
pub type Result<T> = std::result::Result<T, SymbolError>;
