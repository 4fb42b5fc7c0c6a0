//! GNU `ld -Map` adapter
//!
//! Symbol lines inside the memory map carry an address and a name and
//! nothing else:
//!
//! ```text
//! .text           0x0000000000401000      0x1a5
//!  .text          0x0000000000401020       0x3c /tmp/ccX.o
//!                 0x0000000000401020                main
//! ```
//!
//! Only symbols inside `.text` output sections are kept. The load base comes
//! from the `__executable_start` (ELF) or `__image_base__` (PE) assignment.

use crate::input::dedup::DedupSink;
use crate::input::error::Result;
use crate::input::gnu_nm::BASE_SYMBOLS;
use crate::input::{AdapterOptions, LoadStats, for_each_line, names, parse_hex};
use crate::symbol::SymbolSink;
use std::io::BufRead;
use tracing::debug;

/// Classification of one map line
#[derive(Debug, Clone, PartialEq, Eq)]
enum MapLine<'a> {
    /// Start of an output section
    Section(&'a str),
    /// Column-zero line that is not a section
    Heading,
    /// Address / name pair
    Symbol { address: u64, name: &'a str },
    /// Assignment defining the load base
    Base(u64),
    /// Anything else
    Other,
}

/// Load code symbols from a GNU linker map
pub fn load<R: BufRead, S: SymbolSink + ?Sized>(
    reader: R,
    sink: &mut S,
    options: &AdapterOptions,
) -> Result<LoadStats> {
    let mut base = None;
    let mut in_text = false;
    let mut code = Vec::new();
    let mut skipped = 0;

    for_each_line(reader, |_, line| {
        match classify(line) {
            MapLine::Section(name) => in_text = is_text_section(name),
            MapLine::Heading => in_text = false,
            MapLine::Base(address) => {
                base.get_or_insert(address);
            }
            MapLine::Symbol { address, name } if in_text => {
                code.push((address, names::normalize(name, options)));
            }
            MapLine::Symbol { .. } => skipped += 1,
            MapLine::Other => {}
        }
        Ok(())
    })?;

    let base = base.unwrap_or(0);
    debug!("GNU map load base {:#x}, {} code symbols", base, code.len());

    let mut sink = DedupSink::new(sink);
    for (address, name) in code {
        match address.checked_sub(base) {
            Some(offset) => sink.append(offset, name),
            None => skipped += 1,
        }
    }

    Ok(LoadStats {
        appended: sink.appended(),
        skipped,
        duplicates: sink.duplicates(),
    })
}

fn classify(line: &str) -> MapLine<'_> {
    if line.trim().is_empty() {
        return MapLine::Other;
    }

    if !line.starts_with(char::is_whitespace) {
        return match line.split_whitespace().next() {
            Some(name) if name.starts_with('.') => MapLine::Section(name),
            _ => MapLine::Heading,
        };
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(address) = tokens
        .first()
        .filter(|t| t.starts_with("0x"))
        .and_then(|t| parse_hex(t))
    else {
        return MapLine::Other;
    };

    if line.contains('=') {
        let defines_base = tokens
            .iter()
            .any(|t| BASE_SYMBOLS.iter().any(|b| t.trim_start_matches('(') == *b));
        return if defines_base {
            MapLine::Base(address)
        } else {
            MapLine::Other
        };
    }

    match tokens.as_slice() {
        [_, name] if !name.starts_with("0x") => MapLine::Symbol { address, name },
        _ => MapLine::Other,
    }
}

fn is_text_section(name: &str) -> bool {
    name == ".text" || name.starts_with(".text.")
}
