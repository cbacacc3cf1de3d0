//! Interning Properties - idempotence, round trip, uniqueness, growth
//!
//! ============================================================================
//! EACH TEST PINS ONE OBSERVABLE GUARANTEE OF THE INTERNER
//! ============================================================================

mod common;

use common::{assert_all_resolve, intern_many, Fixture, COLORS};
use istr::{compute_hash, HashWidth, InternError, Interner, InternerConfig, StaticEntry, StaticTable};
use quickcheck_macros::quickcheck;
use rustc_hash::FxHashSet;

// ============================================================================
// IDEMPOTENCE AND ROUND TRIP
// ============================================================================

#[quickcheck]
fn prop_intern_is_idempotent(inputs: Vec<Vec<u8>>) -> bool {
    let mut interner = Fixture::small().interner;
    inputs
        .iter()
        .filter(|bytes| !bytes.is_empty() && bytes.len() <= 255)
        .all(|bytes| {
            let first = interner.intern(bytes).unwrap();
            let total = interner.total();
            let chunk_bytes = interner.stats().chunk_bytes;
            let second = interner.intern(bytes).unwrap();
            first == second
                && interner.total() == total
                && interner.stats().chunk_bytes == chunk_bytes
        })
}

#[quickcheck]
fn prop_round_trip(inputs: Vec<Vec<u8>>) -> bool {
    let mut interner = Fixture::small().interner;
    let kept: Vec<_> = inputs
        .into_iter()
        .filter(|bytes| !bytes.is_empty() && bytes.len() <= 255)
        .map(|bytes| (interner.intern(&bytes).unwrap(), bytes))
        .collect();

    kept.iter().all(|(handle, bytes)| {
        interner.content(*handle) == &bytes[..]
            && interner.len(*handle) == bytes.len()
            && interner.hash(*handle) == compute_hash(bytes, HashWidth::Two)
    })
}

#[quickcheck]
fn prop_distinct_content_distinct_handles(inputs: Vec<String>) -> bool {
    let mut interner = Fixture::colors().interner;
    let distinct: FxHashSet<String> = inputs
        .into_iter()
        .filter(|s| !s.is_empty() && s.len() <= 255)
        .collect();

    let handles: FxHashSet<_> = distinct
        .iter()
        .map(|s| interner.intern_str(s).unwrap())
        .collect();
    handles.len() == distinct.len() && handles.iter().all(|h| h.as_u32() != 0)
}

#[test]
fn test_static_and_dynamic_lookup_agree() {
    let mut interner = Fixture::colors().interner;
    for (index, entry) in COLORS.iter().enumerate().skip(1) {
        let handle = interner.intern(entry.bytes()).unwrap();
        assert_eq!(handle.index(), index);
    }
    assert_eq!(interner.total(), COLORS.len());
}

// ============================================================================
// EMPTY INPUT
// ============================================================================

#[test]
fn test_empty_input_never_allocates() {
    let mut interner = Fixture::small().interner;
    assert_eq!(interner.find(b""), None);
    assert_eq!(interner.intern(b""), Err(InternError::Empty));
    assert_eq!(interner.intern_str(""), Err(InternError::Empty));

    let stats = interner.stats();
    assert_eq!(stats.chunks, 0);
    assert_eq!(stats.pools, 1);
}

// ============================================================================
// GROWTH
// ============================================================================

#[test]
fn test_full_root_grows_to_twice_its_capacity() {
    // A root of exactly C entries is a full pool of capacity C
    static FOUR: [StaticEntry; 4] = [
        StaticEntry::NULL,
        StaticEntry::new(b"a"),
        StaticEntry::new(b"b"),
        StaticEntry::new(b"c"),
    ];
    let config = InternerConfig {
        initial_pool_entries: 4,
        ..Default::default()
    };
    let mut interner = Interner::with_config(StaticTable::new(&FOUR), config).unwrap();

    let handle = interner.intern(b"d").unwrap();
    assert_eq!(handle.index(), 4);

    let info = interner.pool_info();
    assert_eq!(info.pools, 1);
    assert_eq!(info.strings, 1);

    // The new pool holds 2C = 8 entries: 7 more fit without another pool
    intern_many(&mut interner, "more_", 7);
    assert_eq!(interner.pool_info().pools, 1);
    interner.intern(b"overflow").unwrap();
    assert_eq!(interner.pool_info().pools, 2);
}

#[test]
fn test_dynamic_pools_double() {
    let mut fixture = Fixture::small();
    let config = fixture.config.clone();
    let interner = &mut fixture.interner;

    // Pools of 4, 8, 16 hold 28 entries
    let entries = intern_many(interner, "grow_", 28);
    assert_eq!(interner.pool_info().pools, 3);
    assert_eq!(interner.total(), 1 + 28);

    interner.intern(b"one_more").unwrap();
    assert_eq!(interner.pool_info().pools, 4);
    assert_eq!(config.initial_pool_entries, 2);
    assert_all_resolve(interner, &entries);
}

#[test]
fn test_handles_are_dense() {
    let mut interner = Fixture::small().interner;
    let entries = intern_many(&mut interner, "dense_", 100);
    for (offset, (handle, _)) in entries.iter().enumerate() {
        assert_eq!(handle.index(), 1 + offset);
    }
}

#[test]
fn test_many_strings_resolve() {
    let mut interner = Interner::new();
    let entries = intern_many(&mut interner, "identifier_", 5000);
    assert_all_resolve(&interner, &entries);

    let unique: FxHashSet<_> = entries.iter().map(|(h, _)| *h).collect();
    assert_eq!(unique.len(), entries.len());
}
