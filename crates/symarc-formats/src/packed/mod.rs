//! Variable-bit-width packed fields
//!
//! A packed field is a row of unsigned sub-fields laid out back to back in a
//! little-endian bit stream. The row is described by a schema: an ordered
//! list of bit widths `[w0, w1, ... wk]`. The whole row occupies
//! `ceil(sum(wi) / 8)` bytes and every row written with the same schema has
//! the same size.
//!
//! # Bit Layout
//!
//! - Bit 0 of a byte is its least significant bit
//! - Sub-field `i` starts at bit `w0 + ... + w(i-1)`
//! - Values are laid down LSB first and spill into the following bytes
//! - A zero-width sub-field always reads as zero and consumes no bits
//!
//! # Usage
//!
//! ```rust
//! use symarc_formats::packed::PackedField;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut row = PackedField::new(&[5, 0, 3])?;
//! row.set_field(0, 0x10);
//! row.set_field(2, 6);
//! assert_eq!(row.byte_len(), 1);
//! assert_eq!(row.get_field(0), 0x10);
//! assert_eq!(row.get_field(1), 0);
//! assert_eq!(row.get_field(2), 6);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod field;

pub use error::{PackedError, Result};
pub use field::{MAX_FIELD_BITS, PackedField, bits_required};
