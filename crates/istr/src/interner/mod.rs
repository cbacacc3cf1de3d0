//! Interner - the find-or-create engine over the pool chain.
//!
//! An [`Interner`] owns one interning space: a pool chain rooted at a static
//! table, the chunk store holding dynamically interned bytes, and the
//! allocator both grow through. Independent interners never share handles.
//!
//! # Performance Characteristics
//!
//! - **Lookup in the static root**: O(log n) binary search
//! - **Lookup in a dynamic pool**: O(k), k bounded by the pool's capacity
//! - **Handle resolution**: O(p), p the number of pools (logarithmic in the
//!   number of entries since capacities double)
//! - **Intern (miss)**: lookup plus one chunk copy and one pool append
//!
//! # Thread Safety
//!
//! `Interner` is `Send + Sync` but find-or-create needs `&mut self`. Wrap it
//! in a [`SharedInterner`] to intern from several threads.

pub mod shared;

pub use shared::SharedInterner;

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::alloc::{Allocator, SystemAllocator};
use crate::builtin;
use crate::chunk::ChunkStore;
use crate::config::InternerConfig;
use crate::error::{AllocError, AllocSite, ConfigResult, InternError, InternResult};
use crate::handle::Handle;
use crate::hash::{compute_hash, HashWidth};
use crate::pool::static_table::StaticTable;
use crate::pool::{PoolChain, StrRef};
use crate::stats::{InternerStats, PoolInfo};

/// A string interning space
///
/// # Examples
///
/// ```
/// use istr::Interner;
///
/// let mut interner = Interner::new();
/// let hello = interner.intern(b"hello").unwrap();
///
/// assert_eq!(interner.intern(b"hello").unwrap(), hello);
/// assert_eq!(interner.content(hello), b"hello");
/// assert_eq!(interner.find(b"world"), None);
/// ```
#[derive(Debug)]
pub struct Interner<A: Allocator = SystemAllocator> {
    chain: PoolChain,
    chunks: ChunkStore,
    config: InternerConfig,
    static_count: usize,
    alloc: A,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl Interner<SystemAllocator> {
    /// Create an interner over the [`builtin`] table with default settings
    ///
    /// # Panics
    ///
    /// Panics if the global allocator cannot hold the root pool.
    pub fn new() -> Self {
        Self::with_config(builtin::TABLE, InternerConfig::default())
            .unwrap_or_else(|err| panic!("istr: cannot build the builtin interner: {}", err))
    }

    /// Create an interner over `table` with the given settings
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](crate::ConfigError) if `config` is invalid,
    /// if `table` is malformed, or if an entry of `table` is longer than the
    /// configured length field allows.
    pub fn with_config(table: StaticTable, config: InternerConfig) -> ConfigResult<Self> {
        Self::from_parts(table, config, SystemAllocator)
    }
}

impl Default for Interner<SystemAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> Interner<A> {
    /// Create an interner over the [`builtin`] table that allocates through `alloc`
    pub fn with_allocator(config: InternerConfig, alloc: A) -> ConfigResult<Self> {
        Self::from_parts(builtin::TABLE, config, alloc)
    }

    /// Create an interner from a static table, settings and an allocator
    pub fn from_parts(table: StaticTable, config: InternerConfig, alloc: A) -> ConfigResult<Self> {
        config.validate()?;
        let chain = PoolChain::new(&alloc, table, &config)?;
        log::debug!(
            "istr: interner ready with {} static entries ({:?} hashes, max length {})",
            table.len(),
            config.hash_width,
            config.max_len()
        );

        Ok(Self {
            chain,
            chunks: ChunkStore::new(config.initial_chunk_bytes),
            static_count: table.len(),
            config,
            alloc,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        })
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    /// Handle of existing content equal to `bytes`
    ///
    /// Empty content never has a handle. Never allocates.
    pub fn find(&self, bytes: &[u8]) -> Option<Handle> {
        if bytes.is_empty() {
            return None;
        }
        let found = self.lookup(bytes, self.hash_of(bytes));
        self.record(found.is_some());
        found
    }

    /// Uncounted search of the chain
    pub(crate) fn lookup(&self, bytes: &[u8], hash: u16) -> Option<Handle> {
        let found = self
            .chain
            .find(&self.chunks, bytes, hash)
            .and_then(Handle::from_index);
        match found {
            Some(handle) => log::trace!("istr: hit {} (hash {})", handle, hash),
            None => log::trace!("istr: miss for {} bytes (hash {})", bytes.len(), hash),
        }
        found
    }

    #[inline]
    fn hash_of(&self, bytes: &[u8]) -> u16 {
        compute_hash(bytes, self.config.hash_width)
    }

    #[inline]
    fn record(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    // ========================================================================
    // INTERN
    // ========================================================================

    /// Find-or-create the handle for `bytes`, copying new content into a chunk
    ///
    /// Interning the same bytes again returns the same handle without
    /// allocating.
    ///
    /// # Errors
    ///
    /// - [`InternError::Empty`] for empty input
    /// - [`InternError::LengthExceeded`] when `bytes` does not fit the
    ///   configured length field
    /// - [`InternError::Allocation`] when a chunk or pool could not be
    ///   allocated; every previously returned handle stays valid
    pub fn intern(&mut self, bytes: &[u8]) -> InternResult<Handle> {
        self.find_or_create(bytes, None)
    }

    /// [`intern`](Self::intern) for UTF-8 text
    #[inline]
    pub fn intern_str(&mut self, text: &str) -> InternResult<Handle> {
        self.intern(text.as_bytes())
    }

    /// Find-or-create the handle for a 0-terminated string without copying it
    ///
    /// The entry references `bytes` directly; its content is everything
    /// before the terminator.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` does not end with a 0 byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use istr::Interner;
    ///
    /// let mut interner = Interner::new();
    /// let h = interner.intern_static(b"forever\0").unwrap();
    /// assert_eq!(interner.content(h), b"forever");
    /// assert_eq!(interner.intern(b"forever").unwrap(), h);
    /// ```
    pub fn intern_static(&mut self, bytes: &'static [u8]) -> InternResult<Handle> {
        let content = match bytes.split_last() {
            Some((&0, content)) => content,
            _ => panic!("istr: intern_static requires a 0-terminated string"),
        };
        self.find_or_create(content, Some(content))
    }

    fn find_or_create(
        &mut self,
        bytes: &[u8],
        persistent: Option<&'static [u8]>,
    ) -> InternResult<Handle> {
        if bytes.is_empty() {
            return Err(InternError::Empty);
        }
        if let Some(handle) = self.lookup(bytes, self.hash_of(bytes)) {
            self.record(true);
            return Ok(handle);
        }
        self.record(false);
        self.create(bytes, persistent)
    }

    /// Index `bytes` as a new entry; the caller has ruled out a match
    pub(crate) fn create(
        &mut self,
        bytes: &[u8],
        persistent: Option<&'static [u8]>,
    ) -> InternResult<Handle> {
        if bytes.is_empty() {
            return Err(InternError::Empty);
        }
        let max = self.config.max_len();
        if bytes.len() > max {
            return Err(InternError::LengthExceeded {
                len: bytes.len(),
                max,
            });
        }

        let hash = self.hash_of(bytes);
        let at = match persistent {
            Some(bytes) => StrRef::Static(bytes),
            None => StrRef::Chunk(self.chunks.store(&self.alloc, bytes)?),
        };

        let index = self
            .chain
            .push(&self.alloc, hash, bytes.len(), at)
            .map_err(|err| {
                log::warn!("istr: could not index {} bytes: {}", bytes.len(), err);
                err
            })?;
        let handle = Handle::from_index(index).ok_or(AllocError::CapacityOverflow {
            site: AllocSite::NewPool,
        })?;

        log::debug!(
            "istr: added {} (hash {}, len {}) {:?}",
            handle,
            hash,
            bytes.len(),
            String::from_utf8_lossy(bytes)
        );
        Ok(handle)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Content of `handle`, or `None` if this interner never issued it
    pub fn get(&self, handle: Handle) -> Option<&[u8]> {
        self.chain
            .resolve(handle.index())
            .map(|(pool, at)| self.chain.entry_bytes(&self.chunks, pool, at))
    }

    /// Content of `handle`
    ///
    /// # Panics
    ///
    /// Panics if this interner never issued `handle`.
    pub fn content(&self, handle: Handle) -> &[u8] {
        match self.get(handle) {
            Some(bytes) => bytes,
            None => panic!("istr: {} was not issued by this interner", handle),
        }
    }

    /// Content of `handle` as text, `None` if unknown or not UTF-8
    pub fn as_str(&self, handle: Handle) -> Option<&str> {
        self.get(handle).and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// Stored length of `handle`
    ///
    /// # Panics
    ///
    /// Panics if this interner never issued `handle`.
    pub fn len(&self, handle: Handle) -> usize {
        match self.chain.resolve(handle.index()) {
            Some((pool, at)) => self.chain.entry_len(pool, at),
            None => panic!("istr: {} was not issued by this interner", handle),
        }
    }

    /// Hash of `handle`
    ///
    /// The stored hash, or the 16-bit hash of the content when hashes are
    /// not stored.
    ///
    /// # Panics
    ///
    /// Panics if this interner never issued `handle`.
    pub fn hash(&self, handle: Handle) -> u16 {
        match self.chain.resolve(handle.index()) {
            Some((pool, at)) => match self.chain.entry_hash(pool, at) {
                Some(hash) => hash,
                None => compute_hash(self.chain.entry_bytes(&self.chunks, pool, at), HashWidth::None),
            },
            None => panic!("istr: {} was not issued by this interner", handle),
        }
    }

    /// Number of entries, static root and null entry included
    ///
    /// Every handle issued so far is below this value.
    #[inline]
    pub fn total(&self) -> usize {
        self.chain.total()
    }

    /// Settings this interner was built with
    #[inline]
    pub fn config(&self) -> &InternerConfig {
        &self.config
    }

    /// Allocator this interner grows through
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    // ========================================================================
    // DIAGNOSTICS
    // ========================================================================

    /// Counters for profiling
    pub fn stats(&self) -> InternerStats {
        InternerStats {
            count: self.total(),
            static_count: self.static_count,
            pools: self.chain.iter().count(),
            chunks: self.chunks.chunk_count(),
            chunk_bytes: self.chunks.used_bytes(),
            chunk_capacity: self.chunks.reserved_bytes(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Footprint of the dynamic pools
    pub fn pool_info(&self) -> PoolInfo {
        let mut info = PoolInfo::default();
        for pool in self.chain.iter().filter(|pool| !pool.is_sorted()) {
            info.pools += 1;
            info.strings += pool.len();
            info.string_bytes += (0..pool.len())
                .map(|at| self.chain.entry_len(pool, at) + 1)
                .sum::<usize>();
            info.total_bytes += std::mem::size_of_val(pool) + pool.capacity() * self.config.entry_bytes();
        }
        info.total_bytes += info.string_bytes;
        info
    }

    /// Write one `Q(<content>)` line per dynamic entry, newest pool first
    pub fn dump_data<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        for pool in self.chain.iter().filter(|pool| !pool.is_sorted()) {
            for at in 0..pool.len() {
                out.write_all(b"Q(")?;
                out.write_all(self.chain.entry_bytes(&self.chunks, pool, at))?;
                out.write_all(b")\n")?;
            }
        }
        Ok(())
    }
}

static_assertions::assert_impl_all!(Interner: Send, Sync);
