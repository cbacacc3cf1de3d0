//! Allocator Submodule - Platform Allocation Seam
//!
//! Every buffer the interner grows (chunk bytes, pool arrays) is reserved
//! through an [`Allocator`], so a failed request surfaces as an
//! [`AllocError`] instead of aborting the process.
//!
//! Three implementations ship with the crate:
//! - [`SystemAllocator`] - the global allocator via `try_reserve_exact`
//! - [`BudgetAllocator`] - refuses requests once a byte budget is spent
//! - [`FaultInjector`] - fails chosen allocation sites on demand

use crate::error::{AllocError, AllocResult, AllocSite};
use std::mem;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Fallible buffer reservation
pub trait Allocator {
    /// Reserve room for exactly `additional` more elements in `buf`
    ///
    /// On error `buf` is left untouched.
    fn try_reserve<T>(&self, site: AllocSite, buf: &mut Vec<T>, additional: usize)
        -> AllocResult<()>;

    /// Release capacity beyond `min_capacity`
    fn shrink<T>(&self, buf: &mut Vec<T>, min_capacity: usize) {
        buf.shrink_to(min_capacity);
    }
}

/// Size in bytes of `count` elements of `T`
fn byte_size<T>(site: AllocSite, count: usize) -> AllocResult<usize> {
    count
        .checked_mul(mem::size_of::<T>())
        .ok_or(AllocError::CapacityOverflow { site })
}

fn reserve_exact<T>(site: AllocSite, buf: &mut Vec<T>, additional: usize) -> AllocResult<()> {
    let requested = byte_size::<T>(site, additional)?;
    buf.try_reserve_exact(additional)
        .map_err(|_| AllocError::Exhausted { site, requested })
}

/// The process-wide global allocator
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn try_reserve<T>(
        &self,
        site: AllocSite,
        buf: &mut Vec<T>,
        additional: usize,
    ) -> AllocResult<()> {
        reserve_exact(site, buf, additional)
    }
}

/// Allocator with a hard ceiling on committed bytes
///
/// Meant for targets where interned strings share a fixed memory
/// allowance with the rest of the runtime.
///
/// # Examples
///
/// ```rust
/// use istr::{BudgetAllocator, Interner, InternerConfig};
///
/// let mut interner = Interner::with_allocator(
///     InternerConfig::default(),
///     BudgetAllocator::new(4096),
/// ).unwrap();
/// assert!(interner.intern(b"fits").is_ok());
/// assert!(interner.allocator().used() <= 4096);
/// ```
#[derive(Debug)]
pub struct BudgetAllocator {
    limit: usize,
    used: AtomicUsize,
}

impl BudgetAllocator {
    /// Create an allocator that commits at most `limit` bytes
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            used: AtomicUsize::new(0),
        }
    }

    /// Bytes committed so far
    pub fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    /// Bytes still available
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.used())
    }

    /// Configured ceiling
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Allocator for BudgetAllocator {
    fn try_reserve<T>(
        &self,
        site: AllocSite,
        buf: &mut Vec<T>,
        additional: usize,
    ) -> AllocResult<()> {
        let needed = buf
            .len()
            .checked_add(additional)
            .ok_or(AllocError::CapacityOverflow { site })?;
        let requested = byte_size::<T>(site, needed.saturating_sub(buf.capacity()))?;
        if requested > self.remaining() {
            return Err(AllocError::Exhausted { site, requested });
        }

        let before = buf.capacity();
        reserve_exact(site, buf, additional)?;
        let grown = byte_size::<T>(site, buf.capacity() - before)?;
        self.used.fetch_add(grown, Ordering::Relaxed);
        Ok(())
    }

    fn shrink<T>(&self, buf: &mut Vec<T>, min_capacity: usize) {
        let before = buf.capacity();
        buf.shrink_to(min_capacity);
        let released = (before - buf.capacity()).saturating_mul(mem::size_of::<T>());
        let _ = self
            .used
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |used| {
                Some(used.saturating_sub(released))
            });
    }
}

/// Allocator that fails selected sites on demand
///
/// Requests that are not failed are served by [`SystemAllocator`].
///
/// # Examples
///
/// ```rust
/// use istr::{AllocSite, FaultInjector, Interner, InternerConfig};
///
/// let mut interner =
///     Interner::with_allocator(InternerConfig::default(), FaultInjector::new()).unwrap();
/// let kept = interner.intern(b"kept").unwrap();
///
/// interner.allocator().fail_all();
/// // Longer than the room left in the first chunk
/// assert!(interner.intern(&[b'x'; 200]).is_err());
/// assert_eq!(interner.content(kept), b"kept");
/// ```
#[derive(Debug)]
pub struct FaultInjector {
    new_chunk: AtomicBool,
    grow_chunk: AtomicBool,
    new_pool: AtomicBool,
    /// Requests to serve before every site starts failing; `usize::MAX` disables
    countdown: AtomicUsize,
    failures: AtomicUsize,
}

impl FaultInjector {
    /// Create an injector that fails nothing
    pub fn new() -> Self {
        Self {
            new_chunk: AtomicBool::new(false),
            grow_chunk: AtomicBool::new(false),
            new_pool: AtomicBool::new(false),
            countdown: AtomicUsize::new(usize::MAX),
            failures: AtomicUsize::new(0),
        }
    }

    fn flag(&self, site: AllocSite) -> &AtomicBool {
        match site {
            AllocSite::NewChunk => &self.new_chunk,
            AllocSite::GrowChunk => &self.grow_chunk,
            AllocSite::NewPool => &self.new_pool,
        }
    }

    /// Fail every request from `site`
    pub fn fail(&self, site: AllocSite) {
        self.flag(site).store(true, Ordering::SeqCst);
    }

    /// Serve requests from `site` again
    pub fn heal(&self, site: AllocSite) {
        self.flag(site).store(false, Ordering::SeqCst);
    }

    /// Fail every site
    pub fn fail_all(&self) {
        for site in [AllocSite::NewChunk, AllocSite::GrowChunk, AllocSite::NewPool] {
            self.fail(site);
        }
    }

    /// Serve every site and cancel any countdown
    pub fn heal_all(&self) {
        for site in [AllocSite::NewChunk, AllocSite::GrowChunk, AllocSite::NewPool] {
            self.heal(site);
        }
        self.countdown.store(usize::MAX, Ordering::SeqCst);
    }

    /// Serve `n` more requests, then fail everything
    pub fn fail_after(&self, n: usize) {
        self.countdown.store(n, Ordering::SeqCst);
    }

    /// Number of requests refused so far
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    fn should_fail(&self, site: AllocSite) -> bool {
        if self.flag(site).load(Ordering::SeqCst) {
            return true;
        }
        let exhausted = self
            .countdown
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
                usize::MAX | 0 => None,
                n => Some(n - 1),
            })
            .is_err();
        exhausted && self.countdown.load(Ordering::SeqCst) == 0
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator for FaultInjector {
    fn try_reserve<T>(
        &self,
        site: AllocSite,
        buf: &mut Vec<T>,
        additional: usize,
    ) -> AllocResult<()> {
        if self.should_fail(site) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            let requested = byte_size::<T>(site, additional)?;
            return Err(AllocError::Exhausted { site, requested });
        }
        reserve_exact(site, buf, additional)
    }
}

static_assertions::assert_impl_all!(SystemAllocator: Send, Sync);
static_assertions::assert_impl_all!(BudgetAllocator: Send, Sync);
static_assertions::assert_impl_all!(FaultInjector: Send, Sync);
