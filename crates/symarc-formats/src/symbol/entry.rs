//! Symbol entry: a module-relative offset and its name

use std::borrow::Cow;

/// A single `(offset, name)` pair in a symbol database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    /// Address relative to the module's preferred load base
    pub offset: u64,
    /// Symbol name as opaque bytes
    pub name: Vec<u8>,
    /// Rank of `name` in lexical order, assigned by `compile()`
    pub name_id: u32,
}

impl SymbolEntry {
    /// Create an entry with an unassigned name ID
    pub fn new(offset: u64, name: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            name: name.into(),
            name_id: 0,
        }
    }

    /// Name decoded as UTF-8, with invalid sequences replaced
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }
}

/// Length of the common byte prefix of `a` and `b`
pub(crate) fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
