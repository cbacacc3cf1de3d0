//! istr - Compact String Interning for Embedded Runtimes
//!
//! ============================================================================
//! MODULE OVERVIEW
//! ============================================================================
//!
//! Maps byte strings to small integer [`Handle`]s such that equal content
//! always yields the same handle. Handles are stable for the lifetime of the
//! [`Interner`] that issued them; nothing is ever removed or moved.
//!
//! DESIGN PRINCIPLES:
//! ------------------
//! 1. COMPACT ENTRIES
//!    Each entry costs a reference to its bytes (a static slice or a chunk
//!    location), a 1 or 2 byte length and an optional 1 or 2 byte hash,
//!    stored as parallel arrays.
//!
//! 2. COMPILE-TIME ROOT
//!    Pre-known strings live in a sorted `'static` table built with
//!    [`static_table!`]. They cost no heap memory and have constant handles.
//!
//! 3. FALLIBLE GROWTH
//!    Every allocation goes through an [`Allocator`]. Running out of memory
//!    is an [`InternError`], never an abort, and never invalidates a handle.
//!
//! ============================================================================
//! DATA LAYOUT
//! ============================================================================
//!
//! ```text
//! Pool chain (newest first)              Chunks
//! ┌─────────────┐  ┌─────────────┐      ┌──────────────────────┐
//! │ dynamic     │─▶│ static root │      │ "foo\0bar\0baz\0"    │
//! │ hash│len│ref│  │ sorted      │      └──────────────────────┘
//! └──────────┼──┘  └─────────────┘              ▲
//!            └──────────────────────────────────┘
//! ```
//!
//! Lookups binary-search the sorted root and scan dynamic pools linearly,
//! using the stored hash as a cheap mismatch filter. Dynamic pools double in
//! capacity, so a handle resolves in a number of steps logarithmic in the
//! number of entries.
//!
//! # Examples
//!
//! ```
//! use istr::{builtin, Interner};
//!
//! let mut interner = Interner::new();
//!
//! let name = interner.intern_str("my_variable").unwrap();
//! assert_eq!(interner.intern_str("my_variable").unwrap(), name);
//! assert_eq!(interner.as_str(name), Some("my_variable"));
//!
//! // Builtin names resolve without allocating
//! assert_eq!(interner.find(b"append"), Some(builtin::APPEND));
//! ```

pub mod alloc;
pub mod builtin;
mod chunk;
pub mod config;
pub mod error;
pub mod handle;
pub mod hash;
pub mod interner;
mod pool;
#[cfg(feature = "rom-text")]
pub mod rom_text;
pub mod stats;

pub use alloc::{Allocator, BudgetAllocator, FaultInjector, SystemAllocator};
pub use config::{InternerConfig, LenWidth};
pub use error::{
    AllocError, AllocResult, AllocSite, ConfigError, ConfigResult, InternError, InternResult,
    StaticTableError,
};
#[cfg(feature = "rom-text")]
pub use error::{RomTextError, RomTextResult};
pub use handle::Handle;
pub use hash::{compute_hash, djb2, HashWidth};
pub use interner::{Interner, SharedInterner};
pub use pool::static_table::{StaticEntry, StaticTable};
pub use stats::{InternerStats, PoolInfo};
