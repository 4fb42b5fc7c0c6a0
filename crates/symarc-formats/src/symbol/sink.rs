//! The append-only interface input adapters feed symbols through

use crate::symbol::database::SymbolDatabase;

/// Destination for `(offset, name)` pairs produced by an input adapter
///
/// Adapters call `append` zero or more times. Offsets are already relative
/// to the module's preferred load base and names already normalised.
pub trait SymbolSink {
    /// Record one symbol
    fn append(&mut self, offset: u64, name: Vec<u8>);
}

impl SymbolSink for SymbolDatabase {
    fn append(&mut self, offset: u64, name: Vec<u8>) {
        Self::append(self, offset, name);
    }
}

impl SymbolSink for Vec<(u64, Vec<u8>)> {
    fn append(&mut self, offset: u64, name: Vec<u8>) {
        self.push((offset, name));
    }
}

impl<S: SymbolSink + ?Sized> SymbolSink for &mut S {
    fn append(&mut self, offset: u64, name: Vec<u8>) {
        (**self).append(offset, name);
    }
}
