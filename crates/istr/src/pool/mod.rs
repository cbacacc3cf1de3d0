//! Pool module - fixed-capacity entry tables linked into a growing chain.
//!
//! # Overview
//!
//! A pool stores `(hash, length, string reference)` triples in three parallel
//! arrays. Pools form a singly linked chain from the newest (head) back to
//! the static root:
//!
//! ```text
//!   head                                       root
//! ┌──────────────┐   ┌──────────────┐   ┌───────────────────┐
//! │ cap 40       │──▶│ cap 20       │──▶│ static, sorted    │
//! │ prev_len 21  │   │ prev_len 1   │   │ prev_len 0        │
//! │ len 3        │   │ len 20 (full)│   │ len 1 ("" = null) │
//! └──────────────┘   └──────────────┘   └───────────────────┘
//! ```
//!
//! A handle is `total_prev_len + position`, so resolving one walks from the
//! head towards the root until `handle >= total_prev_len`. The root has
//! `total_prev_len == 0`, which bounds the walk.
//!
//! Only the head accepts entries, and only while it is dynamic and not full.
//! The root is immutable; the first dynamic entry always opens a new pool.
//!
//! # Storage
//!
//! Pools live in an arena (`Vec<Pool>`) owned by the [`PoolChain`]; `prev`
//! is an arena index. Entries reference string bytes either in the chunk
//! store or in `'static` memory.

pub mod static_table;


use std::cmp::Ordering;

use crate::alloc::Allocator;
use crate::chunk::{ChunkRef, ChunkStore};
use crate::config::InternerConfig;
use crate::error::{AllocError, AllocResult, AllocSite, ConfigError, ConfigResult};
use crate::hash::HashWidth;
use static_table::StaticTable;

/// Where an entry's bytes live
#[derive(Clone, Copy, Debug)]
pub(crate) enum StrRef {
    /// Copied into a chunk
    Chunk(ChunkRef),
    /// Guaranteed by the caller to outlive the interner
    Static(&'static [u8]),
}

/// A single node of the chain
#[derive(Debug)]
pub(crate) struct Pool {
    prev: Option<usize>,
    total_prev_len: usize,
    is_sorted: bool,
    capacity: usize,
    /// Empty when hashes are not stored
    hashes: Vec<u16>,
    lengths: Vec<u16>,
    strs: Vec<StrRef>,
}

impl Pool {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.lengths.len()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    pub(crate) fn total_prev_len(&self) -> usize {
        self.total_prev_len
    }

    #[inline]
    pub(crate) fn is_sorted(&self) -> bool {
        self.is_sorted
    }

    #[inline]
    fn accepts_entries(&self) -> bool {
        !self.is_sorted && self.len() < self.capacity
    }
}

/// Candidate window `[low, high]` of a sorted pool for `query`
///
/// Narrows to at most two entries with a comparison truncated to the
/// query's length: an entry that starts with `query` compares equal, so the
/// window settles on the first entry not below `query`, which is the exact
/// match if one exists.
pub(crate) fn search_window<'a, F>(len: usize, entry: F, query: &[u8]) -> (usize, usize)
where
    F: Fn(usize) -> &'a [u8],
{
    debug_assert!(len > 0);
    let mut low = 0;
    let mut high = len - 1;
    while high - low > 1 {
        let mid = (low + high) / 2;
        if compare_prefix(query, entry(mid)) != Ordering::Greater {
            high = mid;
        } else {
            low = mid;
        }
    }
    (low, high)
}

/// Lexicographic comparison of `query` against `entry` cut to `query.len()`
#[inline]
fn compare_prefix(query: &[u8], entry: &[u8]) -> Ordering {
    let cut = entry.len().min(query.len());
    query.cmp(&entry[..cut])
}

/// The chain of pools rooted at the static table
#[derive(Debug)]
pub(crate) struct PoolChain {
    pools: Vec<Pool>,
    hash_width: HashWidth,
}

impl PoolChain {
    /// Build the chain with its static root
    pub(crate) fn new<A: Allocator>(
        alloc: &A,
        table: StaticTable,
        config: &InternerConfig,
    ) -> ConfigResult<Self> {
        table.verify(config.hash_width)?;

        let max = config.max_len();
        let entries = table.entries();
        for (index, entry) in entries.iter().enumerate() {
            if entry.bytes().len() > max {
                return Err(ConfigError::StaticEntryTooLong {
                    index,
                    len: entry.bytes().len(),
                    max,
                });
            }
        }

        let mut root = Self::alloc_pool(alloc, config.hash_width, entries.len())?;
        root.is_sorted = true;
        root.capacity = config.initial_pool_entries;
        for entry in entries {
            if config.hash_width.is_stored() {
                root.hashes.push(config.hash_width.finish(entry.raw_hash()));
            }
            root.lengths.push(entry.bytes().len() as u16);
            root.strs.push(StrRef::Static(entry.bytes()));
        }

        let mut pools = Vec::new();
        alloc.try_reserve(AllocSite::NewPool, &mut pools, 1)?;
        pools.push(root);

        Ok(Self {
            pools,
            hash_width: config.hash_width,
        })
    }

    /// Empty pool with arrays reserved for `capacity` entries
    fn alloc_pool<A: Allocator>(
        alloc: &A,
        hash_width: HashWidth,
        capacity: usize,
    ) -> AllocResult<Pool> {
        let mut pool = Pool {
            prev: None,
            total_prev_len: 0,
            is_sorted: false,
            capacity,
            hashes: Vec::new(),
            lengths: Vec::new(),
            strs: Vec::new(),
        };
        if hash_width.is_stored() {
            alloc.try_reserve(AllocSite::NewPool, &mut pool.hashes, capacity)?;
        }
        alloc.try_reserve(AllocSite::NewPool, &mut pool.lengths, capacity)?;
        alloc.try_reserve(AllocSite::NewPool, &mut pool.strs, capacity)?;
        Ok(pool)
    }

    #[inline]
    fn head_id(&self) -> usize {
        self.pools.len() - 1
    }

    #[inline]
    pub(crate) fn head(&self) -> &Pool {
        &self.pools[self.head_id()]
    }

    /// Pools from head to root
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Pool> + '_ {
        let mut next = Some(self.head_id());
        std::iter::from_fn(move || {
            let id = next?;
            let pool = &self.pools[id];
            next = pool.prev;
            Some(pool)
        })
    }

    /// Number of entries across the chain, null entry included
    #[inline]
    pub(crate) fn total(&self) -> usize {
        let head = self.head();
        head.total_prev_len + head.len()
    }

    /// Owning pool and local position of a global index
    pub(crate) fn resolve(&self, index: usize) -> Option<(&Pool, usize)> {
        let mut pool = self.head();
        while index < pool.total_prev_len {
            pool = &self.pools[pool.prev?];
        }
        let local = index - pool.total_prev_len;
        if local < pool.len() {
            Some((pool, local))
        } else {
            None
        }
    }

    /// Bytes of entry `at` in `pool`
    #[inline]
    pub(crate) fn entry_bytes<'a>(&self, chunks: &'a ChunkStore, pool: &'a Pool, at: usize) -> &'a [u8] {
        let len = pool.lengths[at] as usize;
        match pool.strs[at] {
            StrRef::Chunk(chunk) => chunks.bytes(chunk, len),
            StrRef::Static(bytes) => bytes,
        }
    }

    /// Stored length of entry `at` in `pool`
    #[inline]
    pub(crate) fn entry_len(&self, pool: &Pool, at: usize) -> usize {
        pool.lengths[at] as usize
    }

    /// Stored hash of entry `at`, or `None` when hashes are not stored
    #[inline]
    pub(crate) fn entry_hash(&self, pool: &Pool, at: usize) -> Option<u16> {
        pool.hashes.get(at).copied()
    }

    /// Global index of the entry equal to `query`, newest pool first
    pub(crate) fn find(&self, chunks: &ChunkStore, query: &[u8], hash: u16) -> Option<usize> {
        let check_hash = self.hash_width.is_stored();

        for pool in self.iter() {
            if pool.len() == 0 {
                continue;
            }

            let (low, high) = if pool.is_sorted {
                search_window(pool.len(), |at| self.entry_bytes(chunks, pool, at), query)
            } else {
                (0, pool.len() - 1)
            };

            for at in low..=high {
                if check_hash && pool.hashes[at] != hash {
                    continue;
                }
                if pool.lengths[at] as usize == query.len()
                    && self.entry_bytes(chunks, pool, at) == query
                {
                    return Some(pool.total_prev_len + at);
                }
            }
        }

        None
    }

    /// Append an entry to the head, growing the chain when the head is full
    ///
    /// Returns the entry's global index. On error the chain is unchanged.
    pub(crate) fn push<A: Allocator>(
        &mut self,
        alloc: &A,
        hash: u16,
        len: usize,
        at: StrRef,
    ) -> AllocResult<usize> {
        if !self.head().accepts_entries() {
            self.grow(alloc)?;
        }

        let head_id = self.head_id();
        let head = &mut self.pools[head_id];
        let local = head.len();
        if self.hash_width.is_stored() {
            head.hashes.push(hash);
        }
        head.lengths.push(len as u16);
        head.strs.push(at);

        Ok(head.total_prev_len + local)
    }

    /// Link a new head of twice the current head's capacity
    fn grow<A: Allocator>(&mut self, alloc: &A) -> AllocResult<()> {
        let old_id = self.head_id();
        let old = &self.pools[old_id];
        let capacity = old
            .capacity
            .checked_mul(2)
            .filter(|cap| old.total_prev_len + old.len() + cap <= u32::MAX as usize)
            .ok_or(AllocError::CapacityOverflow {
                site: AllocSite::NewPool,
            })?;
        let total_prev_len = old.total_prev_len + old.len();

        alloc.try_reserve(AllocSite::NewPool, &mut self.pools, 1)?;
        let mut pool = Self::alloc_pool(alloc, self.hash_width, capacity)?;
        pool.prev = Some(old_id);
        pool.total_prev_len = total_prev_len;

        log::debug!(
            "istr: new pool of {} entries (total_prev_len {})",
            capacity,
            total_prev_len
        );
        self.pools.push(pool);
        Ok(())
    }
}
