//! Sink wrapper that drops exact `(offset, name)` repeats

use crate::symbol::SymbolSink;
use std::collections::HashSet;

/// Forwards each distinct `(offset, name)` pair once
///
/// Distinct names at the same offset are all forwarded.
pub struct DedupSink<'a, S: SymbolSink + ?Sized> {
    inner: &'a mut S,
    seen: HashSet<(u64, Vec<u8>)>,
    appended: usize,
    duplicates: usize,
}

impl<'a, S: SymbolSink + ?Sized> DedupSink<'a, S> {
    /// Wrap `inner`
    pub fn new(inner: &'a mut S) -> Self {
        Self {
            inner,
            seen: HashSet::new(),
            appended: 0,
            duplicates: 0,
        }
    }

    /// Pairs forwarded to the inner sink
    pub fn appended(&self) -> usize {
        self.appended
    }

    /// Pairs dropped as repeats
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

impl<S: SymbolSink + ?Sized> SymbolSink for DedupSink<'_, S> {
    fn append(&mut self, offset: u64, name: Vec<u8>) {
        if self.seen.insert((offset, name.clone())) {
            self.inner.append(offset, name);
            self.appended += 1;
        } else {
            self.duplicates += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_exact_repeats_only() {
        let mut pairs = Vec::new();
        let mut sink = DedupSink::new(&mut pairs);
        sink.append(0x10, b"a".to_vec());
        sink.append(0x10, b"a".to_vec());
        sink.append(0x10, b"b".to_vec());
        sink.append(0x20, b"a".to_vec());

        assert_eq!(sink.appended(), 3);
        assert_eq!(sink.duplicates(), 1);
        assert_eq!(
            pairs,
            vec![
                (0x10, b"a".to_vec()),
                (0x10, b"b".to_vec()),
                (0x20, b"a".to_vec())
            ]
        );
    }
}
