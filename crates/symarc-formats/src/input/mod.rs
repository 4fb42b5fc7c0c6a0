//! Input adapters that feed linker and debugger symbols into a database
//!
//! Each adapter is an independent function that reads one input flavour and
//! calls [`SymbolSink::append`] for every code symbol it finds. Adapters
//! translate absolute addresses to offsets from the module's preferred load
//! base, drop non-code symbols, normalise names and drop exact duplicates.
//!
//! # Supported Inputs
//!
//! - **Symbol**: an existing `.sym` archive
//! - **MSMap**: MSVC `link /MAP` output
//! - **GNUMap**: GNU `ld -Map` output
//! - **GNUNm**: GNU `nm` dump
//! - **PDB**: recognised, but needs the platform debug library and is
//!   reported as unsupported by this build
//!
//! # Usage
//!
//! ```rust
//! use symarc_formats::input::{self, AdapterOptions};
//! use symarc_formats::symbol::SymbolDatabase;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dump = "0000000000401136 T main\n0000000000401150 t helper\n0000000000404028 D counter\n";
//! let mut db = SymbolDatabase::new();
//! let stats = input::gnu_nm::load(dump.as_bytes(), &mut db, &AdapterOptions::default())?;
//! assert_eq!(stats.appended, 2);
//! # Ok(())
//! # }
//! ```

pub mod dedup;
pub mod error;
pub mod gnu_map;
pub mod gnu_nm;
pub mod ms_map;
pub mod names;
pub mod symbol;

pub use dedup::DedupSink;
pub use error::{InputError, Result};

use crate::symbol::SymbolSink;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Input flavours the tool understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFormat {
    /// Existing symbol archive
    Symbol,
    /// MSVC linker map
    MsMap,
    /// GNU ld map
    GnuMap,
    /// Microsoft program database
    Pdb,
    /// GNU nm dump
    GnuNm,
}

impl InputFormat {
    /// All formats in presentation order
    pub const ALL: [Self; 5] = [Self::Symbol, Self::MsMap, Self::GnuMap, Self::Pdb, Self::GnuNm];

    /// Canonical name, as accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            Self::Symbol => "Symbol",
            Self::MsMap => "MSMap",
            Self::GnuMap => "GNUMap",
            Self::Pdb => "PDB",
            Self::GnuNm => "GNUNm",
        }
    }

    /// Infer the format from the file extension for the current host
    pub fn infer(path: &Path) -> Option<Self> {
        Self::infer_for_host(path, cfg!(windows))
    }

    /// Infer the format from the file extension
    ///
    /// `.map` files are MSVC maps on Windows hosts and GNU maps elsewhere.
    pub fn infer_for_host(path: &Path, windows_host: bool) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "map" if windows_host => Some(Self::MsMap),
            "map" => Some(Self::GnuMap),
            "nm" => Some(Self::GnuNm),
            "pdb" => Some(Self::Pdb),
            "sym" => Some(Self::Symbol),
            _ => None,
        }
    }

    /// Whether an adapter for this format is available in this build
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Pdb)
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InputFormat {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| InputError::UnknownFormat(s.to_string()))
    }
}

/// Name normalisation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterOptions {
    /// Append `()` to names that carry no parameter list
    pub append_parens: bool,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            append_parens: true,
        }
    }
}

/// What an adapter did with its input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Symbols passed to the sink
    pub appended: usize,
    /// Symbols rejected as non-code or outside the module
    pub skipped: usize,
    /// Exact `(offset, name)` repeats dropped
    pub duplicates: usize,
}

/// Load every symbol from the file at `path` into `sink`
pub fn load_file<S: SymbolSink + ?Sized>(
    format: InputFormat,
    path: &Path,
    sink: &mut S,
    options: &AdapterOptions,
) -> Result<LoadStats> {
    if !format.is_supported() {
        return Err(InputError::Unsupported { format });
    }

    let file = File::open(path).map_err(|source| InputError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let stats = match format {
        InputFormat::Symbol => symbol::load(reader, sink)?,
        InputFormat::MsMap => ms_map::load(reader, sink, options)?,
        InputFormat::GnuMap => gnu_map::load(reader, sink, options)?,
        InputFormat::GnuNm => gnu_nm::load(reader, sink, options)?,
        InputFormat::Pdb => return Err(InputError::Unsupported { format }),
    };

    debug!(
        "Loaded {} from {}: {} appended, {} skipped, {} duplicates",
        format,
        path.display(),
        stats.appended,
        stats.skipped,
        stats.duplicates
    );

    Ok(stats)
}

/// Visit each line of a text input, decoding lossily
fn for_each_line<R, F>(mut reader: R, mut visit: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(usize, &str) -> Result<()>,
{
    let mut buf = Vec::new();
    let mut line_no = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        line_no += 1;
        let line = String::from_utf8_lossy(&buf);
        visit(line_no, line.trim_end_matches(['\r', '\n']))?;
    }
}

/// Parse a hex number with or without a `0x` prefix
fn parse_hex(token: &str) -> Option<u64> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}
