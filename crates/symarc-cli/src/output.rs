//! Text report for archive contents
//!
//! ```text
//! # source: app.sym
//! # symbols: 2
//! # initial offset: 0x0000000000008000
//! # widths: offset 5, ordinal 2, prefix 3, suffix 4
//! # max name length: 8
//! 0000000000008000 foo_init
//! 0000000000008010 foo_run
//! ```
//!
//! Diagnostic output only. Names that are not UTF-8 print lossily.

use std::io::{self, Write};
use std::path::Path;
use symarc_formats::symbol::SymbolDatabase;

/// Write the report for a compiled database
pub fn write_report<W: Write + ?Sized>(
    db: &SymbolDatabase,
    source: &Path,
    out: &mut W,
) -> io::Result<()> {
    let widths = db.widths();
    writeln!(out, "# source: {}", source.display())?;
    writeln!(out, "# symbols: {}", db.len())?;
    writeln!(out, "# initial offset: {:#018x}", db.initial_offset())?;
    writeln!(
        out,
        "# widths: offset {}, ordinal {}, prefix {}, suffix {}",
        widths.offset_bits, widths.ordinal_bits, widths.prefix_bits, widths.suffix_bits
    )?;
    writeln!(out, "# max name length: {}", db.max_name_len())?;

    for entry in db {
        writeln!(out, "{:016X} {}", entry.offset, entry.name_lossy())?;
    }
    Ok(())
}
