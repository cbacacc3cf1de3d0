//! Static root table - the compile-time pool of pre-known strings.
//!
//! A table is an ordered `&'static [StaticEntry]`. Entry 0 is the empty null
//! entry that keeps handle 0 unused; the remaining entries are non-empty and
//! strictly ascending in plain lexicographic byte order, which is the order
//! the runtime binary search assumes.

use crate::error::StaticTableError;
use crate::hash::{djb2, HashWidth};

/// One pre-known string with its unmasked hash
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaticEntry {
    raw_hash: u32,
    bytes: &'static [u8],
}

impl StaticEntry {
    /// The reserved entry at index 0
    pub const NULL: StaticEntry = StaticEntry::new(b"");

    /// Entry for `bytes`, hashing in const context
    pub const fn new(bytes: &'static [u8]) -> Self {
        Self {
            raw_hash: djb2(bytes),
            bytes,
        }
    }

    /// Entry with a hash computed elsewhere, e.g. by an external generator
    ///
    /// The hash may be raw or already masked to the width the interner
    /// stores (8 or 16 bits).
    pub const fn from_parts(hash: u32, bytes: &'static [u8]) -> Self {
        Self {
            raw_hash: hash,
            bytes,
        }
    }

    /// Content bytes
    #[inline]
    pub const fn bytes(&self) -> &'static [u8] {
        self.bytes
    }

    /// Hash as supplied at construction
    #[inline]
    pub const fn raw_hash(&self) -> u32 {
        self.raw_hash
    }
}

/// Ordered set of static entries forming the root pool
#[derive(Clone, Copy, Debug)]
pub struct StaticTable {
    entries: &'static [StaticEntry],
}

impl StaticTable {
    /// A table holding only the null entry
    pub const EMPTY: StaticTable = StaticTable::new(&[StaticEntry::NULL]);

    /// Wrap an entry slice; call [`verify`](Self::verify) to check it
    pub const fn new(entries: &'static [StaticEntry]) -> Self {
        Self { entries }
    }

    /// All entries, null entry included
    #[inline]
    pub fn entries(&self) -> &'static [StaticEntry] {
        self.entries
    }

    /// Number of entries, null entry included
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no entries at all (not even the null entry)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the null entry, the ordering, and the hashes at `width`
    ///
    /// Ordering is checked with `<` on byte slices, the same total order the
    /// lookup's truncated comparison is consistent with. A supplied hash must
    /// agree with the content hash once both are masked to `width`, so a
    /// generator may emit hashes for the width the interner stores.
    /// `HashWidth::None` stores no hashes and skips the check.
    pub fn verify(&self, width: HashWidth) -> Result<(), StaticTableError> {
        match self.entries.first() {
            Some(first) if first.bytes.is_empty() => {}
            _ => return Err(StaticTableError::MissingNullEntry),
        }

        for (index, entry) in self.entries.iter().enumerate().skip(1) {
            if entry.bytes.is_empty() {
                return Err(StaticTableError::EmptyEntry { index });
            }
            if index > 1 && self.entries[index - 1].bytes >= entry.bytes {
                return Err(StaticTableError::Unsorted { index });
            }
            let stale = width.finish(entry.raw_hash) != width.finish(djb2(entry.bytes));
            if width.is_stored() && stale {
                return Err(StaticTableError::StaleHash { index });
            }
        }

        Ok(())
    }
}

impl Default for StaticTable {
    fn default() -> Self {
        Self::EMPTY
    }
}
