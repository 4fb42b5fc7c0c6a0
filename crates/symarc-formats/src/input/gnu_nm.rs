//! GNU `nm` dump adapter
//!
//! Reads the default BSD output format, with or without `-S` sizes:
//!
//! ```text
//! 0000000000401136 T main
//! 0000000000401136 000000000000001f T main
//!                  U puts
//! ```
//!
//! Text symbols (`T`, `t`) and weak code symbols (`W`, `w`) are kept. An
//! undefined weak symbol carries no address and is ignored. The load base is the address of
//! `__executable_start` (ELF) or `__image_base__` / `__ImageBase` (PE) when
//! the dump lists one.

use crate::input::dedup::DedupSink;
use crate::input::error::Result;
use crate::input::{AdapterOptions, LoadStats, for_each_line, names, parse_hex};
use crate::symbol::SymbolSink;
use std::io::BufRead;
use tracing::debug;

/// Symbols whose address is the module's preferred load base
pub(crate) const BASE_SYMBOLS: [&str; 3] = ["__executable_start", "__image_base__", "__ImageBase"];

/// One parsed `nm` line
#[derive(Debug, Clone, PartialEq, Eq)]
struct NmLine<'a> {
    address: u64,
    kind: char,
    name: &'a str,
}

/// Load code symbols from an `nm` dump
pub fn load<R: BufRead, S: SymbolSink + ?Sized>(
    reader: R,
    sink: &mut S,
    options: &AdapterOptions,
) -> Result<LoadStats> {
    let mut base = None;
    let mut code = Vec::new();
    let mut skipped = 0;

    // nm sorts by name, so the base symbol may follow the code symbols
    for_each_line(reader, |_, line| {
        let Some(parsed) = parse_line(line) else {
            return Ok(());
        };

        if base.is_none() && BASE_SYMBOLS.contains(&parsed.name) {
            base = Some(parsed.address);
        }

        if matches!(parsed.kind, 'T' | 't' | 'W' | 'w') {
            code.push((parsed.address, names::normalize(parsed.name, options)));
        } else {
            skipped += 1;
        }
        Ok(())
    })?;

    let base = base.unwrap_or(0);
    debug!("nm load base {:#x}, {} code symbols", base, code.len());

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

fn parse_line(line: &str) -> Option<NmLine<'_>> {
    let (address, rest) = line.split_once(' ')?;
    let address = parse_hex(address)?;

    let (field, rest) = rest.split_once(' ')?;
    let (kind, name) = if field.len() == 1 {
        (field, rest)
    } else {
        // -S inserts a size column before the type
        parse_hex(field)?;
        rest.split_once(' ')?
    };

    let mut chars = kind.chars();
    let kind = chars.next()?;
    if chars.next().is_some() || name.is_empty() {
        return None;
    }

    Some(NmLine {
        address,
        kind,
        name,
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn load_pairs(dump: &str) -> (Vec<(u64, String)>, LoadStats) {
        let mut pairs = Vec::new();
        let stats = load(dump.as_bytes(), &mut pairs, &AdapterOptions::default()).unwrap();
        let pairs = pairs
            .into_iter()
            .map(|(o, n)| (o, String::from_utf8(n).unwrap()))
            .collect();
        (pairs, stats)
    }

    #[test]
    fn test_parse_line_variants() {
        assert_eq!(
            parse_line("0000000000401136 T main"),
            Some(NmLine {
                address: 0x40_1136,
                kind: 'T',
                name: "main"
            })
        );
        assert_eq!(
            parse_line("0000000000401136 000000000000001f t helper(int, char)"),
            Some(NmLine {
                address: 0x40_1136,
                kind: 't',
                name: "helper(int, char)"
            })
        );
        assert_eq!(parse_line("                 U puts"), None);
        assert_eq!(parse_line("main.o:"), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn test_keeps_text_symbols_relative_to_base() {
        let dump = "\
0000000000401136 T main
0000000000401150 t helper
0000000000404028 D counter
0000000000404030 B buffer
                 U puts
0000000000400000 R __executable_start
";
        let (pairs, stats) = load_pairs(dump);
        assert_eq!(
            pairs,
            vec![(0x1136, "main()".to_string()), (0x1150, "helper()".to_string())]
        );
        assert_eq!(stats.appended, 2);
        assert_eq!(stats.skipped, 3);
    }

    #[test]
    fn test_no_base_symbol_keeps_absolute_addresses() {
        let (pairs, _) = load_pairs("0000000000001040 T _start\n");
        assert_eq!(pairs, vec![(0x1040, "_start()".to_string())]);
    }

    #[test]
    fn test_pe_image_base() {
        let dump = "\
0000000140000000 A __ImageBase
0000000140001000 T WinMain
";
        let (pairs, _) = load_pairs(dump);
        assert_eq!(pairs, vec![(0x1000, "WinMain()".to_string())]);
    }

    #[test]
    fn test_symbols_below_base_are_skipped() {
        let dump = "\
0000000000000100 T early
0000000000400000 R __executable_start
0000000000400200 T late
";
        let (pairs, stats) = load_pairs(dump);
        assert_eq!(pairs, vec![(0x200, "late()".to_string())]);
        // __executable_start is not text, "early" precedes the base
        assert_eq!(stats.skipped, 2);
    }

    #[test]
    fn test_rust_names_are_demangled() {
        let (pairs, _) = load_pairs("0000000000001000 T _ZN4core3fmt5write17h0123456789abcdefE\n");
        assert_eq!(pairs, vec![(0x1000, "core::fmt::write()".to_string())]);
    }

    #[test]
    fn test_weak_code_symbols_are_kept() {
        let dump = "\
0000000000001000 W _ZN3App3runEv
0000000000001100 T _Z3foov
0000000000001200 w weak_hook
                 w __gmon_start__
0000000000004000 V _ZTV3App
";
        let (pairs, stats) = load_pairs(dump);
        assert_eq!(
            pairs,
            vec![
                (0x1000, "App::run()".to_string()),
                (0x1100, "foo()".to_string()),
                (0x1200, "weak_hook()".to_string()),
            ]
        );
        // the weak vtable object
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_exact_duplicates_dropped() {
        let dump = "\
0000000000001000 T alias_a
0000000000001000 T alias_a
0000000000001000 T alias_b
";
        let (pairs, stats) = load_pairs(dump);
        assert_eq!(pairs.len(), 2);
        assert_eq!(stats.duplicates, 1);
    }
}
