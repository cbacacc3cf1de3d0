//! Shared interner - find-or-create under a reader-writer lock.
//!
//! Lookups and accessors take the read lock and run concurrently. A miss
//! takes the write lock and repeats the lookup before creating, so callers
//! racing on the same content create it at most once.

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};

use super::Interner;
use crate::alloc::{Allocator, SystemAllocator};
use crate::error::{InternError, InternResult};
use crate::handle::Handle;
use crate::stats::InternerStats;

/// Thread-safe wrapper around an [`Interner`]
///
/// # Examples
///
/// ```
/// use istr::SharedInterner;
/// use std::sync::Arc;
/// use std::thread;
///
/// let shared = Arc::new(SharedInterner::new());
/// let workers: Vec<_> = (0..4)
///     .map(|_| {
///         let shared = Arc::clone(&shared);
///         thread::spawn(move || shared.intern(b"same").unwrap())
///     })
///     .collect();
///
/// let handles: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
/// assert!(handles.windows(2).all(|w| w[0] == w[1]));
/// assert_eq!(&*shared.content(handles[0]), b"same");
/// ```
#[derive(Debug)]
pub struct SharedInterner<A: Allocator = SystemAllocator> {
    inner: RwLock<Interner<A>>,
}

impl SharedInterner<SystemAllocator> {
    /// Shared interner over the builtin table with default settings
    pub fn new() -> Self {
        Self::from_interner(Interner::new())
    }
}

impl Default for SharedInterner<SystemAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> SharedInterner<A> {
    pub fn from_interner(interner: Interner<A>) -> Self {
        Self {
            inner: RwLock::new(interner),
        }
    }

    /// Find-or-create under the lock; see [`Interner::intern`]
    pub fn intern(&self, bytes: &[u8]) -> InternResult<Handle> {
        self.find_or_create(bytes, None)
    }

    /// Find-or-create without copying; see [`Interner::intern_static`]
    ///
    /// # Panics
    ///
    /// Panics if `bytes` does not end with a 0 byte.
    pub fn intern_static(&self, bytes: &'static [u8]) -> InternResult<Handle> {
        let content = match bytes.split_last() {
            Some((&0, content)) => content,
            _ => panic!("istr: intern_static requires a 0-terminated string"),
        };
        self.find_or_create(content, Some(content))
    }

    /// A call counts as one hit, or as one miss when it created the entry
    fn find_or_create(
        &self,
        bytes: &[u8],
        persistent: Option<&'static [u8]>,
    ) -> InternResult<Handle> {
        if bytes.is_empty() {
            return Err(InternError::Empty);
        }

        {
            let interner = self.inner.read();
            if let Some(handle) = interner.lookup(bytes, interner.hash_of(bytes)) {
                interner.record(true);
                return Ok(handle);
            }
        }

        let mut interner = self.inner.write();
        // Another writer may have created it while we waited.
        let hash = interner.hash_of(bytes);
        if let Some(handle) = interner.lookup(bytes, hash) {
            interner.record(true);
            return Ok(handle);
        }
        interner.record(false);
        interner.create(bytes, persistent)
    }

    /// [`intern`](Self::intern) for UTF-8 text
    pub fn intern_str(&self, text: &str) -> InternResult<Handle> {
        self.intern(text.as_bytes())
    }

    pub fn find(&self, bytes: &[u8]) -> Option<Handle> {
        self.inner.read().find(bytes)
    }

    /// Content of `handle`, holding the read lock while borrowed
    ///
    /// # Panics
    ///
    /// Panics if this interner never issued `handle`.
    pub fn content(&self, handle: Handle) -> MappedRwLockReadGuard<'_, [u8]> {
        RwLockReadGuard::map(self.inner.read(), |interner| interner.content(handle))
    }

    /// Content of `handle`, or `None` if this interner never issued it
    pub fn get(&self, handle: Handle) -> Option<MappedRwLockReadGuard<'_, [u8]>> {
        RwLockReadGuard::try_map(self.inner.read(), |interner| interner.get(handle)).ok()
    }

    pub fn len(&self, handle: Handle) -> usize {
        self.inner.read().len(handle)
    }

    pub fn hash(&self, handle: Handle) -> u16 {
        self.inner.read().hash(handle)
    }

    pub fn total(&self) -> usize {
        self.inner.read().total()
    }

    pub fn stats(&self) -> InternerStats {
        self.inner.read().stats()
    }

    /// Read access for batches of lookups under one lock
    pub fn read(&self) -> RwLockReadGuard<'_, Interner<A>> {
        self.inner.read()
    }

    pub fn into_inner(self) -> Interner<A> {
        self.inner.into_inner()
    }
}

impl<A: Allocator> From<Interner<A>> for SharedInterner<A> {
    fn from(interner: Interner<A>) -> Self {
        Self::from_interner(interner)
    }
}

static_assertions::assert_impl_all!(SharedInterner: Send, Sync);
