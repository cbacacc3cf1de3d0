//! Core error types for the istr crate
//!
//! Lookup misses are not errors: `find` and `get` return `Option`. Everything
//! that can fail while *creating* an entry is an [`InternError`].

use std::fmt;
use thiserror::Error;

/// Where an allocation was attempted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AllocSite {
    /// A fresh chunk for string data
    NewChunk,
    /// Growing the active chunk in place
    GrowChunk,
    /// A new pool node for the chain
    NewPool,
}

impl fmt::Display for AllocSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AllocSite::NewChunk => "new chunk",
            AllocSite::GrowChunk => "chunk growth",
            AllocSite::NewPool => "new pool",
        };
        f.write_str(name)
    }
}

/// Error type for platform allocator requests
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// The allocator refused the request
    #[error("allocation failed for {site}: requested {requested} bytes")]
    Exhausted { site: AllocSite, requested: usize },

    /// The requested size does not fit the address space
    #[error("capacity overflow for {site}")]
    CapacityOverflow { site: AllocSite },
}

impl AllocError {
    /// Site the failed request came from
    pub fn site(&self) -> AllocSite {
        match self {
            AllocError::Exhausted { site, .. } | AllocError::CapacityOverflow { site } => *site,
        }
    }
}

/// Error type for find-or-create operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InternError {
    /// Empty content never gets a handle
    #[error("cannot intern empty content")]
    Empty,

    /// The length field cannot represent the string
    #[error("string length {len} exceeds the maximum of {max}")]
    LengthExceeded { len: usize, max: usize },

    /// A chunk or pool allocation failed; nothing was indexed
    #[error(transparent)]
    Allocation(#[from] AllocError),
}

/// Error type for static root table validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StaticTableError {
    /// Entry 0 must be the empty null entry
    #[error("static table must start with the empty null entry")]
    MissingNullEntry,

    /// Entries after the null entry must be non-empty
    #[error("static table entry {index} is empty")]
    EmptyEntry { index: usize },

    /// Entry `index` does not sort strictly after entry `index - 1`
    #[error("static table is not strictly sorted at entry {index}")]
    Unsorted { index: usize },

    /// Stored hash disagrees with the content hash
    #[error("static table entry {index} carries a stale hash")]
    StaleHash { index: usize },
}

/// Error type for interner configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `initial_pool_entries` must be non-zero
    #[error("invalid initial pool entries: {0}")]
    InvalidPoolEntries(String),

    /// `initial_chunk_bytes` must be non-zero
    #[error("invalid initial chunk bytes: {0}")]
    InvalidChunkBytes(String),

    /// A static entry does not fit the configured length field
    #[error("static entry {index} has length {len}, maximum is {max}")]
    StaticEntryTooLong { index: usize, len: usize, max: usize },

    /// The static root table is malformed
    #[error(transparent)]
    StaticTable(#[from] StaticTableError),

    /// The root pool could not be allocated
    #[error("root pool allocation failed: {0}")]
    Allocation(#[from] AllocError),
}

/// Error type for ROM text decompression
#[cfg(feature = "rom-text")]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RomTextError {
    /// Input does not start with the 0xFF marker
    #[error("literal text is not compressed (missing 0xFF marker)")]
    MissingMarker,

    /// A word index past the end of the dictionary
    #[error("unknown common word {index} (dictionary has {words} words)")]
    UnknownWord { index: u8, words: usize },

    /// Output buffer cannot hold the text plus terminator
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Dictionary data is malformed
    #[error("invalid dictionary: {0}")]
    InvalidDictionary(String),
}

/// Result type alias for allocator requests
pub type AllocResult<T> = std::result::Result<T, AllocError>;

/// Result type alias for find-or-create operations
pub type InternResult<T> = std::result::Result<T, InternError>;

/// Result type alias for configuration
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for ROM text decompression
#[cfg(feature = "rom-text")]
pub type RomTextResult<T> = std::result::Result<T, RomTextError>;
