//! Diagnostic counters for an interner.
//!
//! Nothing here feeds back into interning; the numbers are for profiling
//! and operational inspection only.

use serde::Serialize;

/// Footprint of the dynamic pools, static root excluded
///
/// # Examples
///
/// ```
/// use istr::Interner;
///
/// let mut interner = Interner::new();
/// interner.intern(b"alpha").unwrap();
/// interner.intern(b"beta").unwrap();
///
/// let info = interner.pool_info();
/// assert_eq!(info.pools, 1);
/// assert_eq!(info.strings, 2);
/// assert_eq!(info.string_bytes, 6 + 5);
/// assert!(info.total_bytes > info.string_bytes);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PoolInfo {
    /// Number of dynamic pools
    pub pools: usize,
    /// Entries across the dynamic pools
    pub strings: usize,
    /// String bytes, one terminator per entry included
    pub string_bytes: usize,
    /// `string_bytes` plus each pool's node and per-entry array overhead
    pub total_bytes: usize,
}

/// Interner statistics for profiling
///
/// A hit is a lookup or intern that found existing content; a miss is one
/// that did not. Failed interns count as misses.
///
/// # Examples
///
/// ```
/// use istr::Interner;
///
/// let mut interner = Interner::new();
/// interner.intern(b"x").unwrap();
/// interner.intern(b"x").unwrap();
///
/// let stats = interner.stats();
/// assert_eq!(stats.total_operations(), 2);
/// assert_eq!(stats.hit_rate(), 0.5);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct InternerStats {
    /// Entries across the whole chain, null entry included
    pub count: usize,
    /// Entries in the static root
    pub static_count: usize,
    /// Pools in the chain, root included
    pub pools: usize,
    /// Chunks ever allocated
    pub chunks: usize,
    /// Bytes written into chunks
    pub chunk_bytes: usize,
    /// Bytes reserved by chunks
    pub chunk_capacity: usize,
    /// Lookups that found their content
    pub hits: usize,
    /// Lookups that did not
    pub misses: usize,
}

impl InternerStats {
    /// Calculate the hit rate (hits / (hits + misses))
    ///
    /// Returns 0.0 if no lookups have been performed.
    ///
    /// # Examples
    ///
    /// ```
    /// use istr::InternerStats;
    ///
    /// let stats = InternerStats { hits: 90, misses: 10, ..Default::default() };
    /// assert_eq!(stats.hit_rate(), 0.9);
    /// ```
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_operations();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Get total number of lookups
    pub fn total_operations(&self) -> usize {
        self.hits + self.misses
    }

    /// Fraction of reserved chunk bytes holding string data
    ///
    /// Returns 0.0 before the first chunk is allocated.
    pub fn chunk_utilization(&self) -> f64 {
        if self.chunk_capacity == 0 {
            0.0
        } else {
            self.chunk_bytes as f64 / self.chunk_capacity as f64
        }
    }
}
