//! Chunk allocator for the bytes of dynamically interned strings.
//!
//! Each stored string takes `len + 1` bytes (content plus a 0 terminator for
//! C interop) inside a single chunk. Exactly one chunk is active at a time;
//! when it cannot grow to fit the next string it is retired, trimmed to its
//! used length and never written again. Retired chunks live as long as the
//! [`ChunkStore`], so every [`ChunkRef`] handed out stays valid.

use crate::alloc::Allocator;
use crate::error::{AllocResult, AllocSite};

/// Location of a stored string: chunk number and byte offset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRef {
    chunk: u32,
    offset: usize,
}

/// Owner of all dynamically interned string bytes
#[derive(Debug, Default)]
pub struct ChunkStore {
    chunks: Vec<Vec<u8>>,
    /// Index of the chunk receiving new strings
    active: Option<usize>,
    /// Minimum size of a fresh chunk
    initial_bytes: usize,
}

impl ChunkStore {
    pub fn new(initial_bytes: usize) -> Self {
        Self {
            chunks: Vec::new(),
            active: None,
            initial_bytes,
        }
    }

    /// Copy `bytes` plus a terminator into the active chunk
    ///
    /// On error no chunk content changed; the active chunk may have been
    /// retired after a failed grow.
    pub fn store<A: Allocator>(&mut self, alloc: &A, bytes: &[u8]) -> AllocResult<ChunkRef> {
        let n_bytes = bytes.len() + 1;

        if let Some(active) = self.active {
            let chunk = &mut self.chunks[active];
            let committed = chunk.capacity();
            if committed - chunk.len() < n_bytes {
                // Grow by exactly the shortfall.
                if let Err(err) = alloc.try_reserve(AllocSite::GrowChunk, chunk, n_bytes) {
                    log::warn!(
                        "istr: could not grow chunk {} past {} bytes ({}); retiring it",
                        active,
                        committed,
                        err
                    );
                    // Back to the size it had before the attempt.
                    alloc.shrink(chunk, committed);
                    self.active = None;
                }
            }
        }

        let active = match self.active {
            Some(active) => active,
            None => self.open_chunk(alloc, n_bytes)?,
        };
        let chunk = &mut self.chunks[active];
        debug_assert!(chunk.capacity() - chunk.len() >= n_bytes);

        let offset = chunk.len();
        chunk.extend_from_slice(bytes);
        chunk.push(0);

        Ok(ChunkRef {
            chunk: active as u32,
            offset,
        })
    }

    /// Allocate a fresh active chunk able to hold `n_bytes`, returning its index
    fn open_chunk<A: Allocator>(&mut self, alloc: &A, n_bytes: usize) -> AllocResult<usize> {
        alloc.try_reserve(AllocSite::NewChunk, &mut self.chunks, 1)?;

        let mut chunk = Vec::new();
        let size = n_bytes.max(self.initial_bytes);
        if let Err(err) = alloc.try_reserve(AllocSite::NewChunk, &mut chunk, size) {
            if size == n_bytes {
                return Err(err);
            }
            log::warn!(
                "istr: chunk of {} bytes failed ({}); retrying with {}",
                size,
                err,
                n_bytes
            );
            alloc.try_reserve(AllocSite::NewChunk, &mut chunk, n_bytes)?;
        }

        log::debug!("istr: new chunk of {} bytes", chunk.capacity());
        self.chunks.push(chunk);
        let active = self.chunks.len() - 1;
        self.active = Some(active);
        Ok(active)
    }

    /// Content of a stored string, without its terminator
    #[inline]
    pub fn bytes(&self, at: ChunkRef, len: usize) -> &[u8] {
        &self.chunks[at.chunk as usize][at.offset..at.offset + len]
    }

    /// Number of chunks ever allocated
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Bytes written into chunks, terminators included
    pub fn used_bytes(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Bytes reserved by chunks
    pub fn reserved_bytes(&self) -> usize {
        self.chunks.iter().map(Vec::capacity).sum()
    }

    /// Whether a chunk currently accepts new strings
    #[cfg(test)]
    pub(crate) fn has_active(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::{BudgetAllocator, FaultInjector, SystemAllocator};

    #[test]
    fn test_store_appends_terminator() {
        let mut store = ChunkStore::new(16);
        let at = store.store(&SystemAllocator, b"abc").unwrap();
        assert_eq!(store.bytes(at, 3), b"abc");
        assert_eq!(store.chunks[0], b"abc\0");
        assert_eq!(store.used_bytes(), 4);
    }

    #[test]
    fn test_strings_share_a_chunk() {
        let mut store = ChunkStore::new(64);
        let a = store.store(&SystemAllocator, b"first").unwrap();
        let b = store.store(&SystemAllocator, b"second").unwrap();
        assert_eq!(store.chunk_count(), 1);
        assert_eq!(store.bytes(a, 5), b"first");
        assert_eq!(store.bytes(b, 6), b"second");
    }

    #[test]
    fn test_fresh_chunk_sized_for_long_string() {
        let mut store = ChunkStore::new(8);
        let long = [b'z'; 40];
        let at = store.store(&SystemAllocator, &long).unwrap();
        assert!(store.reserved_bytes() >= 41);
        assert_eq!(store.bytes(at, 40), &long[..]);
    }

    #[test]
    fn test_active_chunk_grows_in_place() {
        let mut store = ChunkStore::new(4);
        let a = store.store(&SystemAllocator, b"abc").unwrap();
        let b = store.store(&SystemAllocator, b"defgh").unwrap();
        assert_eq!(store.chunk_count(), 1);
        assert_eq!(store.bytes(a, 3), b"abc");
        assert_eq!(store.bytes(b, 5), b"defgh");
    }

    #[test]
    fn test_failed_grow_retires_chunk() {
        let faults = FaultInjector::new();
        let mut store = ChunkStore::new(4);
        let a = store.store(&faults, b"abc").unwrap();

        faults.fail(AllocSite::GrowChunk);
        let b = store.store(&faults, b"defgh").unwrap();

        assert!(store.has_active());
        assert_eq!(store.chunk_count(), 2);
        assert_eq!(store.bytes(a, 3), b"abc");
        assert_eq!(store.bytes(b, 5), b"defgh");
    }

    #[test]
    fn test_retired_chunk_keeps_committed_size() {
        let faults = FaultInjector::new();
        let mut store = ChunkStore::new(16);
        let a = store.store(&faults, b"abc").unwrap();
        let committed = store.chunks[0].capacity();
        assert!(committed > store.chunks[0].len());

        faults.fail(AllocSite::GrowChunk);
        store.store(&faults, &[b'w'; 20]).unwrap();

        assert_eq!(store.chunks[0].capacity(), committed);
        assert_eq!(store.bytes(a, 3), b"abc");
    }

    #[test]
    fn test_exact_size_retry() {
        // Too small for a full chunk, enough for the string itself
        let budget = BudgetAllocator::new(128);
        let mut store = ChunkStore::new(1024);
        let at = store.store(&budget, b"abc").unwrap();
        assert_eq!(store.bytes(at, 3), b"abc");
        assert_eq!(store.reserved_bytes(), 4);
    }

    #[test]
    fn test_total_failure_leaves_store_empty() {
        let faults = FaultInjector::new();
        faults.fail_all();
        let mut store = ChunkStore::new(16);
        assert!(store.store(&faults, b"abc").is_err());
        assert!(!store.has_active());
        assert_eq!(store.chunk_count(), 0);
        assert_eq!(store.used_bytes(), 0);
    }
}
