//! Archive writer: header, then symbol table, then string table

use crate::packed::PackedField;
use crate::symbol::database::SymbolDatabase;
use crate::symbol::entry::common_prefix_len;
use crate::symbol::error::{Result, SymbolError};
use crate::symbol::header::SymbolHeader;
use std::io::Write;
use tracing::debug;

/// Encode a compiled (or empty) database into `writer`
///
/// Fails with `NotCompiled` for a non-empty database that has not been
/// compiled since its last mutation, and with `EmptyName` when any symbol
/// has an empty name. A failed write may leave a partial archive in the sink.
pub fn write_archive<W: Write + ?Sized>(db: &SymbolDatabase, writer: &mut W) -> Result<()> {
    if !db.is_compiled() && !db.is_empty() {
        return Err(SymbolError::NotCompiled);
    }
    // Lexical order puts an empty name first
    if db.iter_by_name().next().is_some_and(|e| e.name.is_empty()) {
        return Err(SymbolError::EmptyName { row: 0 });
    }

    let widths = db.widths();
    let symbol_count =
        u32::try_from(db.len()).map_err(|_| SymbolError::TooManySymbols(db.len()))?;
    let max_string_length = u32::try_from(db.max_name_len())
        .map_err(|_| SymbolError::NameLengthOverflow(db.max_name_len()))?;

    let header = SymbolHeader::new(widths, db.initial_offset(), symbol_count, max_string_length);
    writer.write_all(&header.to_bytes()?)?;

    debug!(
        "Writing {} symbols from {:#x} with widths {:?}",
        symbol_count, header.initial_offset, widths
    );

    let mut row = PackedField::new(&widths.symbol_schema())?;
    let mut previous_offset = db.initial_offset();
    for entry in db {
        row.clear();
        row.set_field(0, entry.offset - previous_offset);
        row.set_field(1, u64::from(entry.name_id));
        row.write(writer)?;
        previous_offset = entry.offset;
    }

    let mut row = PackedField::new(&widths.string_schema())?;
    let mut previous: &[u8] = &[];
    for entry in db.iter_by_name() {
        let prefix = common_prefix_len(previous, &entry.name);
        let suffix = &entry.name[prefix..];

        row.clear();
        row.set_field(0, prefix as u64);
        row.set_field(1, suffix.len() as u64);
        row.write(writer)?;
        writer.write_all(suffix)?;

        previous = &entry.name;
    }

    Ok(())
}
