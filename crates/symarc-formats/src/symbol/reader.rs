//! Archive reader: validates the header and inverts the writer's encoding

use crate::packed::PackedField;
use crate::symbol::database::SymbolDatabase;
use crate::symbol::error::{Result, SymbolError};
use crate::symbol::header::{HEADER_SIZE, SymbolHeader};
use std::io::{ErrorKind, Read};
use tracing::debug;

/// Upper bound on up-front allocation driven by the header's symbol count
const PREALLOCATE_LIMIT: usize = 1 << 16;

/// Decode an archive from `reader` into a compiled database
///
/// The source is consumed up to the end of the string table. Any short
/// read, bad signature, unsupported version, out-of-range width or name ID
/// aborts the read.
pub fn read_archive<R: Read + ?Sized>(reader: &mut R) -> Result<SymbolDatabase> {
    let mut raw = [0u8; HEADER_SIZE];
    read_section(reader, &mut raw, "header")?;
    let header = SymbolHeader::from_bytes(&raw)?;
    let widths = header.widths();
    let count = header.symbol_count as usize;

    debug!(
        "Reading {} symbols from {:#x} with widths {:?}",
        count, header.initial_offset, widths
    );

    let mut db = SymbolDatabase::with_capacity(count.min(PREALLOCATE_LIMIT));
    if count == 0 {
        db.compile();
        return Ok(db);
    }

    let mut row = PackedField::new(&widths.symbol_schema())?;
    let mut symbols = Vec::with_capacity(count.min(PREALLOCATE_LIMIT));
    let mut offset = header.initial_offset;
    for index in 0..count {
        read_row(reader, &mut row, "symbol table")?;
        offset = offset
            .checked_add(row.get_field(0))
            .ok_or(SymbolError::OffsetOverflow { row: index })?;
        symbols.push((offset, row.get_field(1)));
    }

    let strings = read_strings(reader, &header)?;

    for (index, (offset, name_id)) in symbols.into_iter().enumerate() {
        let name = usize::try_from(name_id)
            .ok()
            .and_then(|id| strings.get(id))
            .ok_or(SymbolError::InvalidNameId {
                row: index,
                name_id,
                string_count: strings.len(),
            })?;
        db.append(offset, name.clone());
    }

    db.compile();
    Ok(db)
}

/// Rebuild the prefix-shared string table in lexical order
fn read_strings<R: Read + ?Sized>(
    reader: &mut R,
    header: &SymbolHeader,
) -> Result<Vec<Vec<u8>>> {
    let count = header.symbol_count as usize;
    let max = header.max_string_length;

    let mut row = PackedField::new(&header.widths().string_schema())?;
    let mut strings: Vec<Vec<u8>> = Vec::with_capacity(count.min(PREALLOCATE_LIMIT));

    for index in 0..count {
        read_row(reader, &mut row, "string table")?;
        let prefix = row.get_field(0);
        let suffix = row.get_field(1);
        let previous = strings.last().map_or(&[][..], Vec::as_slice);

        if prefix > previous.len() as u64 {
            return Err(SymbolError::InvalidPrefix {
                row: index,
                prefix,
                previous_len: previous.len(),
            });
        }

        let length = prefix.saturating_add(suffix);
        if length > u64::from(max) {
            return Err(SymbolError::NameTooLong { row: index, length, max });
        }
        if length == 0 {
            return Err(SymbolError::EmptyName { row: index });
        }

        // Grows with the bytes actually present, not the declared length
        let mut name = previous[..prefix as usize].to_vec();
        let read = (&mut *reader)
            .take(suffix)
            .read_to_end(&mut name)
            .map_err(|e| map_short_read(e, "string suffix"))?;
        if read as u64 != suffix {
            return Err(SymbolError::TruncatedData {
                section: "string suffix",
            });
        }

        strings.push(name);
    }

    Ok(strings)
}

fn read_row<R: Read + ?Sized>(
    reader: &mut R,
    row: &mut PackedField,
    section: &'static str,
) -> Result<()> {
    row.read(reader).map_err(|e| map_short_read(e, section))
}

fn read_section<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    section: &'static str,
) -> Result<()> {
    reader
        .read_exact(buf)
        .map_err(|e| map_short_read(e, section))
}

fn map_short_read(e: std::io::Error, section: &'static str) -> SymbolError {
    if e.kind() == ErrorKind::UnexpectedEof {
        SymbolError::TruncatedData { section }
    } else {
        SymbolError::Io(e)
    }
}
