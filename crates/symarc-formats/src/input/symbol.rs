//! Existing `.sym` archives as input
//!
//! Entries are forwarded as stored, with no name normalisation.

use crate::input::LoadStats;
use crate::input::error::Result;
use crate::symbol::{SymbolSink, read_archive};
use std::io::Read;

/// Load every entry of a `.sym` archive into `sink`
pub fn load<R: Read, S: SymbolSink + ?Sized>(mut reader: R, sink: &mut S) -> Result<LoadStats> {
    let db = read_archive(&mut reader)?;
    let appended = db.len();
    for entry in db.entries() {
        sink.append(entry.offset, entry.name.clone());
    }
    Ok(LoadStats {
        appended,
        ..LoadStats::default()
    })
}
