//! Handle - a compact, stable name for an interned string.
//!
//! A handle is a *global* index: the number of entries in every pool older
//! than the owning pool plus the entry's position inside that pool. Index 0
//! is reserved for the null entry of the static root, so handles wrap a
//! [`NonZeroU32`] and `Option<Handle>` is the same size as a `u32` with
//! `None` playing the role of the null handle.

use std::fmt;
use std::num::NonZeroU32;

/// Handle to an interned string
///
/// Handles compare and hash as integers. Two handles from the same
/// [`Interner`](crate::Interner) are equal iff their contents are equal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(NonZeroU32);

impl Handle {
    /// The largest representable handle
    pub const MAX: u32 = u32::MAX;

    /// Handle for a static table position, usable in `const` items
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a const) if `index` is 0.
    pub const fn from_static_index(index: u32) -> Self {
        match NonZeroU32::new(index) {
            Some(n) => Handle(n),
            None => panic!("handle 0 is reserved for the null entry"),
        }
    }

    /// Rebuild a handle from its raw value; 0 yields `None`
    #[inline]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(n) => Some(Handle(n)),
            None => None,
        }
    }

    /// Raw value, e.g. for serialization into bytecode
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0.get()
    }

    /// Global index as `usize`
    #[inline]
    pub const fn index(self) -> usize {
        self.0.get() as usize
    }

    /// Handle for a global index, `None` for 0 or out of range
    #[inline]
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().and_then(Self::from_raw)
    }
}

/// Raw value of an optional handle, 0 for `None`
#[inline]
pub fn raw_or_null(handle: Option<Handle>) -> u32 {
    handle.map_or(0, Handle::as_u32)
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<Handle> for u32 {
    fn from(handle: Handle) -> u32 {
        handle.as_u32()
    }
}

static_assertions::assert_eq_size!(Handle, u32);
static_assertions::assert_eq_size!(Option<Handle>, u32);
static_assertions::assert_impl_all!(Handle: Send, Sync, Copy);
