//! In-memory symbol database and the compile pass
//!
//! Entries are appended in any order. `compile()` sorts them by offset,
//! ranks names lexically and derives the minimum bit widths needed to
//! encode the archive. Any later `append` drops the compiled state.

use crate::packed::bits_required;
use crate::symbol::entry::{SymbolEntry, common_prefix_len};
use crate::symbol::error::Result;
use crate::symbol::header::FieldWidths;
use crate::symbol::{reader, writer};
use std::io::{Cursor, Read, Write};
use tracing::debug;

/// Maxima observed by the last `compile()`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    /// Largest difference between consecutive sorted offsets
    pub max_delta: u64,
    /// Longest name in bytes
    pub max_name_len: usize,
    /// Longest prefix shared between lexical neighbours
    pub max_prefix: usize,
    /// Longest suffix left after removing the shared prefix
    pub max_suffix: usize,
    /// Widths derived from the maxima above
    pub widths: FieldWidths,
}

/// Append-only collection of symbols with a derived compiled state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolDatabase {
    entries: Vec<SymbolEntry>,
    /// Indices into `entries` in lexical name order
    name_index: Vec<usize>,
    stats: Option<CompileStats>,
}

impl SymbolDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty database with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Append a symbol and invalidate the compiled state
    pub fn append(&mut self, offset: u64, name: impl Into<Vec<u8>>) {
        self.entries.push(SymbolEntry::new(offset, name));
        self.invalidate();
    }

    /// Remove every entry and reset the compiled state
    pub fn clear(&mut self) {
        self.entries.clear();
        self.invalidate();
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the database has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `compile()` has run since the last mutation
    pub fn is_compiled(&self) -> bool {
        self.stats.is_some()
    }

    /// Entries in insertion order, or offset order once compiled
    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    /// Iterate entries in their current order
    pub fn iter(&self) -> std::slice::Iter<'_, SymbolEntry> {
        self.entries.iter()
    }

    /// Iterate entries in lexical name order
    ///
    /// Empty until the database is compiled.
    pub fn iter_by_name(&self) -> impl Iterator<Item = &SymbolEntry> + '_ {
        self.name_index.iter().map(|&i| &self.entries[i])
    }

    /// Statistics from the last compile, `None` when not compiled
    pub fn stats(&self) -> Option<&CompileStats> {
        self.stats.as_ref()
    }

    /// Derived row widths, all zero when not compiled
    pub fn widths(&self) -> FieldWidths {
        self.stats.map(|s| s.widths).unwrap_or_default()
    }

    /// Longest name in bytes, zero when not compiled
    pub fn max_name_len(&self) -> usize {
        self.stats.map_or(0, |s| s.max_name_len)
    }

    /// Offset of the first entry once compiled, zero when empty
    pub fn initial_offset(&self) -> u64 {
        self.entries.first().map_or(0, |e| e.offset)
    }

    /// Sort, rank and measure the entries
    ///
    /// Running it again without an intervening mutation changes nothing.
    pub fn compile(&mut self) {
        if self.stats.is_some() {
            return;
        }

        if self.entries.is_empty() {
            self.name_index.clear();
            self.stats = Some(CompileStats::default());
            return;
        }

        // Stable: entries sharing an offset keep their insertion order
        self.entries.sort_by_key(|e| e.offset);

        let max_delta = self
            .entries
            .windows(2)
            .map(|pair| pair[1].offset - pair[0].offset)
            .max()
            .unwrap_or(0);
        let max_name_len = self.entries.iter().map(|e| e.name.len()).max().unwrap_or(0);

        let entries = &self.entries;
        let mut name_index: Vec<usize> = (0..entries.len()).collect();
        name_index.sort_by(|&a, &b| entries[a].name.cmp(&entries[b].name));

        for (rank, &i) in name_index.iter().enumerate() {
            self.entries[i].name_id = rank as u32;
        }

        let mut max_prefix = 0;
        let mut max_suffix = 0;
        let mut previous: &[u8] = &[];
        for &i in &name_index {
            let name = self.entries[i].name.as_slice();
            let prefix = common_prefix_len(previous, name);
            max_prefix = max_prefix.max(prefix);
            max_suffix = max_suffix.max(name.len() - prefix);
            previous = name;
        }

        let widths = FieldWidths {
            offset_bits: bits_required(max_delta),
            ordinal_bits: bits_required(self.entries.len() as u64),
            prefix_bits: bits_required(max_prefix as u64),
            suffix_bits: bits_required(max_suffix as u64),
        };

        debug!(
            "Compiled {} symbols: max delta {:#x}, max name {} bytes, widths {:?}",
            self.entries.len(),
            max_delta,
            max_name_len,
            widths
        );

        self.name_index = name_index;
        self.stats = Some(CompileStats {
            max_delta,
            max_name_len,
            max_prefix,
            max_suffix,
            widths,
        });
    }

    /// Find the symbol covering `offset`
    ///
    /// Returns the entry with the greatest offset not above `offset`, or
    /// `None` when `offset` precedes every symbol or the database is not
    /// compiled.
    pub fn lookup(&self, offset: u64) -> Option<&SymbolEntry> {
        if !self.is_compiled() {
            return None;
        }

        let end = self.entries.partition_point(|e| e.offset <= offset);
        end.checked_sub(1).map(|i| &self.entries[i])
    }

    /// Encode the database as an archive into `writer`
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer::write_archive(self, writer)
    }

    /// Decode an archive from `reader` into a compiled database
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        reader::read_archive(reader)
    }

    /// Decode an archive held in memory
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::read_from(&mut Cursor::new(data))
    }

    /// Encode the database into a new buffer
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(buffer)
    }

    fn invalidate(&mut self) {
        self.name_index.clear();
        self.stats = None;
    }
}

impl<'a> IntoIterator for &'a SymbolDatabase {
    type Item = &'a SymbolEntry;
    type IntoIter = std::slice::Iter<'a, SymbolEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl crate::SymarcFormat for SymbolDatabase {
    fn parse(data: &[u8]) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        Self::parse(data).map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
    }

    fn build(&self) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error>> {
        self.build()
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
    }
}
