//! Symbol archive format (`Symbolic` signature, `.sym` extension)
//!
//! A symbol archive maps module-relative code offsets to function names so a
//! stack-trace formatter can symbolise addresses without the original
//! debug information.
//!
//! # Format Overview
//!
//! - Header: 32 bytes, little-endian, signature `Symbolic`, version 1.0.0.0
//! - Symbol table: one packed row per symbol in offset order, holding the
//!   delta from the previous offset and the name ID
//! - String table: one row per name in lexical order, holding the length of
//!   the prefix shared with the previous name, the suffix length, and then
//!   the raw suffix bytes
//!
//! Row field widths are the minimum needed for the archive's own data and
//! are recorded in the header. A width of zero is legal.
//!
//! # Usage
//!
//! ```rust
//! use symarc_formats::symbol::SymbolDatabase;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut db = SymbolDatabase::new();
//! db.append(0x8010, "foo_run()");
//! db.append(0x8000, "foo_init()");
//! db.compile();
//!
//! let data = db.build()?;
//! let parsed = SymbolDatabase::parse(&data)?;
//! assert_eq!(parsed.lookup(0x8014).map(|e| e.name.as_slice()), Some(&b"foo_run()"[..]));
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod entry;
pub mod error;
pub mod header;
pub mod reader;
pub mod sink;
pub mod writer;

// Re-export main types
pub use database::{CompileStats, SymbolDatabase};
pub use entry::SymbolEntry;
pub use error::{Result, SymbolError};
pub use header::{FieldWidths, HEADER_SIZE, SYMBOL_SIGNATURE, SYMBOL_VERSION, SymbolHeader};
pub use reader::read_archive;
pub use sink::SymbolSink;
pub use writer::write_archive;

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::SymarcFormat;

    #[test]
    fn test_basic_workflow() {
        let mut db = SymbolDatabase::new();
        db.append(0x1230, "render_frame()");
        db.append(0x1000, "main()");
        db.append(0x1100, "render_init()");
        db.compile();

        let data = db.build().expect("Should serialize");
        let parsed = SymbolDatabase::parse(&data).expect("Should parse");
        assert_eq!(db, parsed);
    }

    #[test]
    fn test_format_trait_round_trip() {
        let mut db = SymbolDatabase::new();
        db.append(0x40, "a()");
        db.append(0x80, "ab()");
        db.compile();

        let data = SymarcFormat::build(&db).expect("SymarcFormat build");
        let parsed = <SymbolDatabase as SymarcFormat>::parse(&data).expect("SymarcFormat parse");
        assert_eq!(parsed, db);
        SymbolDatabase::verify_round_trip(&data).expect("Round trip should hold");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        /// Names drawn from a small alphabet so prefixes are shared often
        fn symbol_name() -> impl Strategy<Value = Vec<u8>> {
            prop::collection::vec(prop::sample::select(b"ab_()".to_vec()), 1..12)
        }

        fn symbol_offset() -> impl Strategy<Value = u64> {
            prop_oneof![0u64..0x100, 0x40_0000u64..0x40_1000, any::<u64>()]
        }

        proptest! {
            /// Compile, write and read back reproduces the offset-sorted input
            #[test]
            fn database_round_trip(
                entries in prop::collection::vec((symbol_offset(), symbol_name()), 1..40)
            ) {
                let mut db = SymbolDatabase::new();
                for (offset, name) in &entries {
                    db.append(*offset, name.clone());
                }
                db.compile();

                let data = db.build().unwrap();
                let parsed = SymbolDatabase::parse(&data).unwrap();

                let mut expected = entries.clone();
                expected.sort_by_key(|(offset, _)| *offset);
                let actual: Vec<(u64, Vec<u8>)> = parsed
                    .iter()
                    .map(|e| (e.offset, e.name.clone()))
                    .collect();
                prop_assert_eq!(actual, expected);
                prop_assert_eq!(parsed, db);
            }

            /// Every derived width is the tightest one for the data
            #[test]
            fn widths_are_minimal(
                entries in prop::collection::vec((symbol_offset(), symbol_name()), 1..40)
            ) {
                let mut db = SymbolDatabase::new();
                for (offset, name) in &entries {
                    db.append(*offset, name.clone());
                }
                db.compile();

                let stats = *db.stats().unwrap();
                let fits = |value: u64, bits: u8| bits >= 64 || value < (1u64 << bits);
                let tight = |value: u64, bits: u8| bits == 0 || value >= (1u64 << (bits - 1));

                prop_assert!(fits(stats.max_delta, stats.widths.offset_bits));
                prop_assert!(tight(stats.max_delta, stats.widths.offset_bits));
                prop_assert!(fits(db.len() as u64, stats.widths.ordinal_bits));
                prop_assert!(tight(db.len() as u64, stats.widths.ordinal_bits));
                prop_assert!(fits(stats.max_prefix as u64, stats.widths.prefix_bits));
                prop_assert!(tight(stats.max_prefix as u64, stats.widths.prefix_bits));
                prop_assert!(fits(stats.max_suffix as u64, stats.widths.suffix_bits));
                prop_assert!(tight(stats.max_suffix as u64, stats.widths.suffix_bits));
            }
        }
    }
}
