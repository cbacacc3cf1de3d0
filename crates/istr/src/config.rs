//! Configuration Module - Interner Tuning Parameters
//!
//! Controls the per-entry footprint (hash and length field widths) and the
//! growth seeds for pools and chunks.

use crate::error::{ConfigError, ConfigResult};
use crate::hash::HashWidth;
use crate::pool::StrRef;
use serde::{Deserialize, Serialize};

/// Number of bytes each entry spends on its stored length
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LenWidth {
    /// Lengths up to 255
    #[default]
    One,
    /// Lengths up to 65535
    Two,
}

impl LenWidth {
    /// Bytes per entry spent on the length array
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            LenWidth::One => 1,
            LenWidth::Two => 2,
        }
    }

    /// Largest storable length; anything `>= 2^(8 * bytes)` is rejected
    #[inline]
    pub const fn max_len(self) -> usize {
        (1usize << (8 * self.bytes())) - 1
    }
}

/// Configuration for an [`Interner`](crate::Interner)
///
/// # Examples
///
/// ```rust
/// use istr::{HashWidth, InternerConfig, LenWidth};
///
/// // Defaults: 16-bit hashes, 8-bit lengths
/// let config = InternerConfig::default();
/// assert!(config.validate().is_ok());
///
/// // Longer strings, hashes recomputed on demand
/// let config = InternerConfig {
///     hash_width: HashWidth::None,
///     len_width: LenWidth::Two,
///     ..Default::default()
/// };
/// assert_eq!(config.max_len(), 65535);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternerConfig {
    /// Width of the stored per-entry hash
    ///
    /// Must match the width the static table was generated for; the
    /// bundled tables store unmasked hashes, so any width works with them.
    ///
    /// Default: 2 bytes
    pub hash_width: HashWidth,

    /// Width of the stored per-entry length
    ///
    /// Default: 1 byte (max length 255)
    pub len_width: LenWidth,

    /// Capacity seed for dynamic pools
    ///
    /// The static root counts as a pool of this capacity, so the first
    /// dynamic pool holds twice as many entries and each later pool doubles.
    ///
    /// Default: 10
    pub initial_pool_entries: usize,

    /// Minimum size of a freshly allocated chunk
    ///
    /// Strings longer than this get a chunk of exactly `len + 1` bytes.
    ///
    /// Default: 128
    pub initial_chunk_bytes: usize,
}

impl Default for InternerConfig {
    fn default() -> Self {
        InternerConfig {
            hash_width: HashWidth::Two,
            len_width: LenWidth::One,
            initial_pool_entries: 10,
            initial_chunk_bytes: 128,
        }
    }
}

impl InternerConfig {
    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.initial_pool_entries == 0 {
            return Err(ConfigError::InvalidPoolEntries(
                "initial_pool_entries must be > 0".to_string(),
            ));
        }

        if self.initial_pool_entries > u32::MAX as usize / 2 {
            return Err(ConfigError::InvalidPoolEntries(format!(
                "initial_pool_entries ({}) leaves no room for growth",
                self.initial_pool_entries
            )));
        }

        if self.initial_chunk_bytes == 0 {
            return Err(ConfigError::InvalidChunkBytes(
                "initial_chunk_bytes must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Largest length accepted by `intern`
    #[inline]
    pub fn max_len(&self) -> usize {
        self.len_width.max_len()
    }

    /// Bytes one pool entry costs across the parallel arrays
    #[inline]
    pub fn entry_bytes(&self) -> usize {
        std::mem::size_of::<StrRef>() + self.hash_width.bytes() + self.len_width.bytes()
    }
}
