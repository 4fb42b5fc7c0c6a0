//! Packed field buffer and bit-level accessors

use crate::packed::error::{PackedError, Result};
use std::io::{Read, Write};

/// Widest sub-field a schema may declare
pub const MAX_FIELD_BITS: u8 = 64;

/// Number of significant bits in `value`
///
/// This is the smallest width that can hold `value` losslessly.
/// `bits_required(0)` is zero.
pub const fn bits_required(value: u64) -> u8 {
    (u64::BITS - value.leading_zeros()) as u8
}

/// A row of unsigned sub-fields packed into a contiguous byte buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedField {
    widths: Vec<u8>,
    /// Starting bit of each sub-field
    offsets: Vec<usize>,
    bytes: Vec<u8>,
}

impl PackedField {
    /// Create a zeroed packed field for the given schema
    pub fn new(widths: &[u8]) -> Result<Self> {
        let mut offsets = Vec::with_capacity(widths.len());
        let mut total_bits = 0usize;

        for (index, &bits) in widths.iter().enumerate() {
            if bits > MAX_FIELD_BITS {
                return Err(PackedError::WidthTooLarge { index, bits });
            }
            offsets.push(total_bits);
            total_bits += usize::from(bits);
        }

        Ok(Self {
            widths: widths.to_vec(),
            offsets,
            bytes: vec![0u8; total_bits.div_ceil(8)],
        })
    }

    /// Schema this field was created with
    pub fn widths(&self) -> &[u8] {
        &self.widths
    }

    /// Sum of all sub-field widths
    pub fn total_bits(&self) -> usize {
        self.widths.iter().map(|&w| usize::from(w)).sum()
    }

    /// Size of the packed row in bytes
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Raw packed bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Zero every byte of the row
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Overwrite sub-field `index` with `value`
    ///
    /// Bits of `value` beyond the sub-field width are discarded. Writing to
    /// an index outside the schema, or to a zero-width sub-field, does nothing.
    pub fn set_field(&mut self, index: usize, value: u64) {
        let Some(&bits) = self.widths.get(index) else {
            return;
        };

        let mut value = mask_to_width(value, bits);
        let mut position = self.offsets[index];
        let mut remaining = usize::from(bits);

        while remaining > 0 {
            let byte = position / 8;
            let shift = position % 8;
            let take = (8 - shift).min(remaining);
            let mask = low_mask(take);

            self.bytes[byte] &= !(mask << shift);
            self.bytes[byte] |= (value as u8 & mask) << shift;

            value >>= take;
            position += take;
            remaining -= take;
        }
    }

    /// Read sub-field `index`, zero-extended
    ///
    /// Indices outside the schema read as zero.
    pub fn get_field(&self, index: usize) -> u64 {
        let Some(&bits) = self.widths.get(index) else {
            return 0;
        };

        let mut value = 0u64;
        let mut position = self.offsets[index];
        let mut consumed = 0usize;
        let width = usize::from(bits);

        while consumed < width {
            let byte = position / 8;
            let shift = position % 8;
            let take = (8 - shift).min(width - consumed);
            let chunk = (self.bytes[byte] >> shift) & low_mask(take);

            value |= u64::from(chunk) << consumed;
            position += take;
            consumed += take;
        }

        value
    }

    /// Write exactly the packed bytes to `writer`
    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.bytes)
    }

    /// Fill the packed bytes from `reader`
    ///
    /// Fails with `UnexpectedEof` if the source ends before the row is complete.
    pub fn read<R: Read + ?Sized>(&mut self, reader: &mut R) -> std::io::Result<()> {
        reader.read_exact(&mut self.bytes)
    }
}

fn mask_to_width(value: u64, bits: u8) -> u64 {
    if bits >= MAX_FIELD_BITS {
        value
    } else {
        value & ((1u64 << bits) - 1)
    }
}

/// Mask with the low `bits` bits set, for `bits` in `0..=8`
fn low_mask(bits: usize) -> u8 {
    (0xFFu16 >> (8 - bits)) as u8
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn test_bits_required() {
        assert_eq!(bits_required(0), 0);
        assert_eq!(bits_required(1), 1);
        assert_eq!(bits_required(2), 2);
        assert_eq!(bits_required(6), 3);
        assert_eq!(bits_required(8), 4);
        assert_eq!(bits_required(0x10), 5);
        assert_eq!(bits_required(u64::MAX), 64);
    }

    #[test]
    fn test_buffer_size_rounds_up() {
        assert_eq!(PackedField::new(&[]).unwrap().byte_len(), 0);
        assert_eq!(PackedField::new(&[0, 0]).unwrap().byte_len(), 0);
        assert_eq!(PackedField::new(&[0, 1]).unwrap().byte_len(), 1);
        assert_eq!(PackedField::new(&[3, 3]).unwrap().byte_len(), 1);
        assert_eq!(PackedField::new(&[5, 2]).unwrap().byte_len(), 1);
        assert_eq!(PackedField::new(&[5, 4]).unwrap().byte_len(), 2);
        assert_eq!(PackedField::new(&[64, 64]).unwrap().byte_len(), 16);
    }

    #[test]
    fn test_rejects_width_above_64() {
        assert_eq!(
            PackedField::new(&[8, 65]),
            Err(PackedError::WidthTooLarge { index: 1, bits: 65 })
        );
    }

    #[test]
    fn test_layout_is_lsb_first() {
        // prefix=4 in 3 bits, suffix=3 in 4 bits
        let mut row = PackedField::new(&[3, 4]).unwrap();
        row.set_field(0, 4);
        row.set_field(1, 3);
        assert_eq!(row.as_bytes(), &[0b0001_1100]);
    }

    #[test]
    fn test_value_spills_into_next_byte() {
        let mut row = PackedField::new(&[5, 7]).unwrap();
        row.set_field(0, 0x10);
        row.set_field(1, 0x7F);
        // bits 0..5 = 10000, bits 5..12 = 1111111
        assert_eq!(row.as_bytes(), &[0b1111_0000, 0b0000_1111]);
        assert_eq!(row.get_field(0), 0x10);
        assert_eq!(row.get_field(1), 0x7F);
    }

    #[test]
    fn test_full_width_fields() {
        let mut row = PackedField::new(&[1, 64, 63]).unwrap();
        row.set_field(0, 1);
        row.set_field(1, 0xDEAD_BEEF_0123_4567);
        row.set_field(2, u64::MAX);
        assert_eq!(row.get_field(0), 1);
        assert_eq!(row.get_field(1), 0xDEAD_BEEF_0123_4567);
        assert_eq!(row.get_field(2), u64::MAX >> 1);
        assert_eq!(row.byte_len(), 16);
    }

    #[test]
    fn test_zero_width_field_reads_zero() {
        let mut row = PackedField::new(&[0, 1]).unwrap();
        row.set_field(0, 0xFFFF);
        row.set_field(1, 1);
        assert_eq!(row.get_field(0), 0);
        assert_eq!(row.get_field(1), 1);
        assert_eq!(row.as_bytes(), &[0b0000_0001]);
    }

    #[test]
    fn test_excess_bits_are_masked() {
        let mut row = PackedField::new(&[3, 3]).unwrap();
        row.set_field(0, 0b1111_1101);
        assert_eq!(row.get_field(0), 0b101);
        assert_eq!(row.get_field(1), 0);
    }

    #[test]
    fn test_set_field_overwrites() {
        let mut row = PackedField::new(&[4, 4]).unwrap();
        row.set_field(0, 0xF);
        row.set_field(1, 0xF);
        row.set_field(0, 0x2);
        assert_eq!(row.get_field(0), 0x2);
        assert_eq!(row.get_field(1), 0xF);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut row = PackedField::new(&[8]).unwrap();
        row.set_field(3, 0xFF);
        assert_eq!(row.get_field(3), 0);
        assert_eq!(row.as_bytes(), &[0]);
    }

    #[test]
    fn test_clear() {
        let mut row = PackedField::new(&[12, 12]).unwrap();
        row.set_field(0, 0xABC);
        row.set_field(1, 0x123);
        row.clear();
        assert_eq!(row.as_bytes(), &[0, 0, 0]);
    }

    #[test]
    fn test_write_then_read() {
        let mut row = PackedField::new(&[5, 2]).unwrap();
        row.set_field(0, 0x10);
        row.set_field(1, 1);

        let mut buf = Vec::new();
        row.write(&mut buf).unwrap();
        assert_eq!(buf.len(), 1);

        let mut parsed = PackedField::new(&[5, 2]).unwrap();
        parsed.read(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(parsed, row);
        assert_eq!(parsed.get_field(0), 0x10);
        assert_eq!(parsed.get_field(1), 1);
    }

    #[test]
    fn test_read_short_source() {
        let mut row = PackedField::new(&[16]).unwrap();
        let err = row.read(&mut Cursor::new([0xAAu8])).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_zero_byte_row_io() {
        let row = PackedField::new(&[0, 0]).unwrap();
        let mut buf = Vec::new();
        row.write(&mut buf).unwrap();
        assert!(buf.is_empty());

        let mut parsed = PackedField::new(&[0, 0]).unwrap();
        parsed.read(&mut Cursor::new(Vec::<u8>::new())).unwrap();
        assert_eq!(parsed.get_field(0), 0);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        /// Schema plus a value that fits each declared width
        fn schema_and_values() -> impl Strategy<Value = (Vec<u8>, Vec<u64>)> {
            prop::collection::vec(0u8..=64, 0..12).prop_flat_map(|widths| {
                let values: Vec<_> = widths
                    .iter()
                    .map(|&w| any::<u64>().prop_map(move |v| mask_to_width(v, w)))
                    .collect();
                (Just(widths), values)
            })
        }

        proptest! {
            #[test]
            fn packed_field_round_trip((widths, values) in schema_and_values()) {
                let mut row = PackedField::new(&widths).unwrap();
                for (i, &v) in values.iter().enumerate() {
                    row.set_field(i, v);
                }
                for (i, &v) in values.iter().enumerate() {
                    prop_assert_eq!(row.get_field(i), v);
                }

                let total: usize = widths.iter().map(|&w| usize::from(w)).sum();
                prop_assert_eq!(row.byte_len(), total.div_ceil(8));

                let mut buf = Vec::new();
                row.write(&mut buf).unwrap();
                let mut parsed = PackedField::new(&widths).unwrap();
                parsed.read(&mut Cursor::new(&buf)).unwrap();
                for (i, &v) in values.iter().enumerate() {
                    prop_assert_eq!(parsed.get_field(i), v);
                }
            }
        }
    }
}
