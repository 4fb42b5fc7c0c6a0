//! Fixed 32-byte symbol archive header
//!
//! Layout (little-endian):
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 8 | signature `Symbolic` |
//! | 8 | 4 | version `[major, minor, revision, patch]` |
//! | 12 | 1 | symbol offset bit count |
//! | 13 | 1 | symbol ordinal bit count |
//! | 14 | 1 | string prefix bit count |
//! | 15 | 1 | string suffix bit count |
//! | 16 | 8 | initial offset |
//! | 24 | 4 | symbol count |
//! | 28 | 4 | maximum string length |

use crate::packed::MAX_FIELD_BITS;
use crate::symbol::error::{Result, SymbolError};
use binrw::{BinRead, BinWrite};
use std::io::Cursor;

/// Archive signature
pub const SYMBOL_SIGNATURE: [u8; 8] = *b"Symbolic";

/// Current archive version
pub const SYMBOL_VERSION: [u8; 4] = [1, 0, 0, 0];

/// Encoded header size in bytes
pub const HEADER_SIZE: usize = 32;

/// Bit widths of the packed symbol and string table rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldWidths {
    /// Width of the per-row offset delta
    pub offset_bits: u8,
    /// Width of the per-row name ID
    pub ordinal_bits: u8,
    /// Width of the shared prefix length
    pub prefix_bits: u8,
    /// Width of the suffix length
    pub suffix_bits: u8,
}

impl FieldWidths {
    /// Schema of one symbol table row
    pub fn symbol_schema(&self) -> [u8; 2] {
        [self.offset_bits, self.ordinal_bits]
    }

    /// Schema of the packed part of one string table row
    pub fn string_schema(&self) -> [u8; 2] {
        [self.prefix_bits, self.suffix_bits]
    }
}

/// Symbol archive header
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[br(little)]
#[bw(little)]
pub struct SymbolHeader {
    /// File signature, must be `SYMBOL_SIGNATURE`
    pub signature: [u8; 8],
    /// Format version, must be `SYMBOL_VERSION`
    pub version: [u8; 4],
    /// Bits per symbol offset delta
    pub offset_bits: u8,
    /// Bits per symbol name ID
    pub ordinal_bits: u8,
    /// Bits per string prefix length
    pub prefix_bits: u8,
    /// Bits per string suffix length
    pub suffix_bits: u8,
    /// Offset of the first symbol, zero for an empty archive
    pub initial_offset: u64,
    /// Number of symbols (and strings)
    pub symbol_count: u32,
    /// Length of the longest name
    pub max_string_length: u32,
}

impl SymbolHeader {
    /// Create a current-version header
    pub fn new(
        widths: FieldWidths,
        initial_offset: u64,
        symbol_count: u32,
        max_string_length: u32,
    ) -> Self {
        Self {
            signature: SYMBOL_SIGNATURE,
            version: SYMBOL_VERSION,
            offset_bits: widths.offset_bits,
            ordinal_bits: widths.ordinal_bits,
            prefix_bits: widths.prefix_bits,
            suffix_bits: widths.suffix_bits,
            initial_offset,
            symbol_count,
            max_string_length,
        }
    }

    /// Decode and validate a header
    pub fn from_bytes(data: &[u8; HEADER_SIZE]) -> Result<Self> {
        let header = Self::read_le(&mut Cursor::new(&data[..]))?;
        header.validate()?;
        Ok(header)
    }

    /// Encode the header
    pub fn to_bytes(&self) -> Result<[u8; HEADER_SIZE]> {
        let mut out = [0u8; HEADER_SIZE];
        self.write_le(&mut Cursor::new(&mut out[..]))?;
        Ok(out)
    }

    /// Check signature, version and field widths
    pub fn validate(&self) -> Result<()> {
        if self.signature != SYMBOL_SIGNATURE {
            return Err(SymbolError::InvalidSignature(self.signature));
        }

        if self.version != SYMBOL_VERSION {
            return Err(SymbolError::UnsupportedVersion(self.version));
        }

        for (field, bits) in [
            ("symbol offset", self.offset_bits),
            ("symbol ordinal", self.ordinal_bits),
            ("string prefix", self.prefix_bits),
            ("string suffix", self.suffix_bits),
        ] {
            if bits > MAX_FIELD_BITS {
                return Err(SymbolError::InvalidFieldWidth { field, bits });
            }
        }

        // Every name ID of a non-empty archive needs at least one bit, and so
        // does the first name's suffix length
        if self.symbol_count > 0 {
            for (field, bits) in [
                ("symbol ordinal", self.ordinal_bits),
                ("string suffix", self.suffix_bits),
            ] {
                if bits == 0 {
                    return Err(SymbolError::MissingFieldWidth {
                        field,
                        count: self.symbol_count,
                    });
                }
            }
        }

        Ok(())
    }

    /// Row widths carried by this header
    pub fn widths(&self) -> FieldWidths {
        FieldWidths {
            offset_bits: self.offset_bits,
            ordinal_bits: self.ordinal_bits,
            prefix_bits: self.prefix_bits,
            suffix_bits: self.suffix_bits,
        }
    }
}
