//! Compact symbol archive (`.sym`) codec
//!
#![allow(clippy::cast_possible_truncation)] // Field values are masked to their width
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Linker and debugger terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::redundant_closure_for_method_calls)] // Iterator chains
//! A `.sym` archive maps module-relative code offsets to symbol names. It is
//! built once from linker or debugger output and consulted when a crash
//! report needs its raw addresses turned into names.
//!
//! # Modules
//!
//! - **packed**: little-endian bit-packed records of variable-width fields
//! - **symbol**: the in-memory symbol database, its compile pass and the
//!   archive writer and reader
//! - **input**: adapters that feed symbols from `nm` dumps, GNU and MSVC
//!   linker maps and existing archives into a database
//!
//! # Archive layout
//!
//! ```text
//! +----------------------+ 32-byte little-endian header
//! | "Symbolic" 1.0.0.0   |
//! | field widths         |
//! | initial offset/count |
//! +----------------------+
//! | symbol rows          | [offset delta, name id] sorted by offset
//! +----------------------+
//! | string rows          | [prefix, suffix] + suffix bytes, sorted by name
//! +----------------------+
//! ```
//!
//! # Example
//!
//! ```
//! use symarc_formats::SymarcFormat;
//! use symarc_formats::symbol::SymbolDatabase;
//!
//! let mut db = SymbolDatabase::new();
//! db.append(0x1000, "main()");
//! db.append(0x1040, "main_loop()");
//! db.compile();
//!
//! let bytes = db.build()?;
//! SymbolDatabase::verify_round_trip(&bytes)?;
//!
//! let parsed = SymbolDatabase::parse(&bytes)?;
//! assert_eq!(parsed.lookup(0x1050).map(|e| e.name.as_slice()), Some(&b"main_loop()"[..]));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

/// Symbol input adapters for linker maps, `nm` dumps and archives
pub mod input;
/// Variable-bit-width packed fields
pub mod packed;
/// Symbol database and `.sym` archive codec
///
/// See the [`symbol`] module for the archive layout and width rules.
pub mod symbol;

/// Common format trait for whole-archive parse and build
pub trait SymarcFormat: Sized {
    /// Parse from bytes
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>>;

    /// Build to bytes
    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>>;

    /// Verify round-trip correctness
    fn verify_round_trip(data: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        let parsed = Self::parse(data)?;
        let rebuilt = parsed.build()?;
        if data != rebuilt.as_slice() {
            return Err("Round-trip verification failed".into());
        }
        Ok(())
    }
}
