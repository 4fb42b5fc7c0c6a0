//! MSVC `link /MAP` adapter
//!
//! ```text
//!  Preferred load address is 00400000
//!
//!  Start         Length     Name                   Class
//!  0001:00000000 00001234H .text                   CODE
//!  0002:00000000 00000100H .rdata                  DATA
//!
//!   Address         Publics by Value              Rva+Base       Lib:Object
//!
//!  0000:00000000       ___safe_se_handler_count   00000000     <absolute>
//!  0001:00000000       _main                      00401000 f   main.obj
//! ```
//!
//! Publics and static symbols in CODE segments, or flagged `f`, are kept.
//! Absolute symbols and segment `0000` are dropped. Addresses are made
//! relative to the preferred load address. On 32-bit images the C
//! decoration (`_name`, `_name@8`, `@name@8`) is stripped. C++ names are undecorated.

use crate::input::dedup::DedupSink;
use crate::input::error::{InputError, Result};
use crate::input::{AdapterOptions, LoadStats, for_each_line, names, parse_hex};
use crate::symbol::SymbolSink;
use std::collections::HashSet;
use std::io::BufRead;
use tracing::debug;

const PREFERRED_LOAD_ADDRESS: &str = "Preferred load address is";

/// A `SSSS:OOOOOOOO` segment address
fn parse_segment(token: &str) -> Option<u16> {
    let (segment, offset) = token.split_once(':')?;
    parse_hex(offset)?;
    u16::from_str_radix(segment, 16).ok()
}

/// One row of the publics or static symbol tables
#[derive(Debug, Clone, PartialEq, Eq)]
struct PublicLine<'a> {
    segment: u16,
    name: &'a str,
    address: u64,
    /// `Rva+Base` printed with 8 digits
    image_32bit: bool,
    function: bool,
    absolute: bool,
}

fn parse_public<'a>(tokens: &[&'a str]) -> Option<PublicLine<'a>> {
    let [segment, name, address, rest @ ..] = tokens else {
        return None;
    };

    Some(PublicLine {
        segment: parse_segment(segment)?,
        name,
        address: parse_hex(address)?,
        image_32bit: address.len() <= 8,
        function: rest.contains(&"f"),
        absolute: rest.contains(&"<absolute>"),
    })
}

/// Segment number of a CODE row in the segment table
fn parse_code_segment(tokens: &[&str]) -> Option<u16> {
    let [start, length, _name, class, ..] = tokens else {
        return None;
    };
    let length = length.strip_suffix('H')?;
    parse_hex(length)?;
    let segment = parse_segment(start)?;
    (*class == "CODE").then_some(segment)
}

/// Load code symbols from an MSVC linker map
pub fn load<R: BufRead, S: SymbolSink + ?Sized>(
    reader: R,
    sink: &mut S,
    options: &AdapterOptions,
) -> Result<LoadStats> {
    let mut base = None;
    let mut code_segments = HashSet::new();
    let mut in_publics = false;
    let mut code = Vec::new();
    let mut skipped = 0;

    for_each_line(reader, |line_no, line| {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix(PREFERRED_LOAD_ADDRESS) {
            let address = parse_hex(rest.trim()).ok_or_else(|| InputError::Parse {
                line: line_no,
                message: format!("invalid preferred load address '{}'", rest.trim()),
            })?;
            base = Some(address);
            return Ok(());
        }

        if trimmed.contains("Publics by Value") {
            in_publics = true;
            return Ok(());
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if !in_publics {
            if let Some(segment) = parse_code_segment(&tokens) {
                code_segments.insert(segment);
            }
            return Ok(());
        }

        let Some(public) = parse_public(&tokens) else {
            return Ok(());
        };

        let is_code = public.function || code_segments.contains(&public.segment);
        if public.absolute || public.segment == 0 || !is_code {
            skipped += 1;
            return Ok(());
        }

        let name = if public.image_32bit {
            names::strip_c_decoration(public.name)
        } else {
            public.name
        };
        code.push((public.address, names::normalize(name, options)));
        Ok(())
    })?;

    let base = base.unwrap_or(0);
    debug!(
        "MSVC map load base {:#x}, {} code segments, {} code symbols",
        base,
        code_segments.len(),
        code.len()
    );

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
