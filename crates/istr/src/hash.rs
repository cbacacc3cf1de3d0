//! Content hash shared by indexing and lookup.
//!
//! djb2 in its xor form: `h = h * 33 ^ byte`, seeded with 5381. Only the low
//! bits of the running hash survive masking, and every step (shift, add, xor)
//! propagates carries upward only, so accumulating in a wrapping `u32` yields
//! the same masked value as a native-width accumulator.
//!
//! A finished hash is never 0; 0 means "hash not computed".

use serde::{Deserialize, Serialize};

/// djb2 seed
const SEED: u32 = 5381;

/// Number of bytes each entry spends on its stored hash
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashWidth {
    /// Hashes are not stored; they are recomputed on demand with a 16-bit mask
    None,
    /// 8-bit hashes
    One,
    /// 16-bit hashes
    #[default]
    Two,
}

impl HashWidth {
    /// Mask applied to the raw hash
    #[inline]
    pub const fn mask(self) -> u32 {
        match self {
            HashWidth::One => 0xff,
            HashWidth::None | HashWidth::Two => 0xffff,
        }
    }

    /// Whether entries carry a stored hash used as a mismatch filter
    #[inline]
    pub const fn is_stored(self) -> bool {
        !matches!(self, HashWidth::None)
    }

    /// Bytes per entry spent on the hash array
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            HashWidth::None => 0,
            HashWidth::One => 1,
            HashWidth::Two => 2,
        }
    }

    /// Mask a raw djb2 value and remap the reserved 0
    #[inline]
    pub const fn finish(self, raw: u32) -> u16 {
        let hash = (raw & self.mask()) as u16;
        if hash == 0 {
            1
        } else {
            hash
        }
    }
}

/// Unmasked djb2 over `bytes`
///
/// `const` so static tables can carry their hashes without a build step.
pub const fn djb2(bytes: &[u8]) -> u32 {
    let mut hash = SEED;
    let mut i = 0;
    while i < bytes.len() {
        hash = (hash << 5).wrapping_add(hash) ^ bytes[i] as u32;
        i += 1;
    }
    hash
}

/// Finished hash of `bytes` at the given width
#[inline]
pub fn compute_hash(bytes: &[u8], width: HashWidth) -> u16 {
    width.finish(djb2(bytes))
}
