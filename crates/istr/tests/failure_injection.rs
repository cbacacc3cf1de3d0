//! Failure Injection - allocation failures never corrupt the chain
//!
//! Each test forces a chunk or pool allocation to fail during `intern` and
//! checks that every handle returned earlier still resolves to its original
//! content, and that the interner keeps working once memory is back.

mod common;

use common::{assert_all_resolve, intern_many, Fixture};
use istr::{
    AllocError, AllocSite, BudgetAllocator, InternError, Interner, InternerConfig, StaticTable,
};

fn site_of(err: &InternError) -> Option<AllocSite> {
    match err {
        InternError::Allocation(alloc) => Some(alloc.site()),
        _ => None,
    }
}

#[test]
fn test_new_chunk_failure() {
    let mut interner = Fixture::faulty().interner;
    let kept = intern_many(&mut interner, "kept_", 10);
    let total = interner.total();

    interner.allocator().fail(AllocSite::NewChunk);
    interner.allocator().fail(AllocSite::GrowChunk);
    let err = interner.intern(&[b'n'; 250]).unwrap_err();
    assert_eq!(site_of(&err), Some(AllocSite::NewChunk));

    assert_eq!(interner.total(), total);
    assert_all_resolve(&interner, &kept);
}

#[test]
fn test_grow_failure_falls_back_to_new_chunk() {
    let mut interner = Fixture::faulty().interner;
    let kept = intern_many(&mut interner, "kept_", 10);
    let chunks = interner.stats().chunks;

    interner.allocator().fail(AllocSite::GrowChunk);
    let big = interner.intern(&[b'g'; 200]).unwrap();

    assert_eq!(interner.stats().chunks, chunks + 1);
    assert_eq!(interner.content(big), &[b'g'; 200][..]);
    assert_all_resolve(&interner, &kept);
}

#[test]
fn test_new_pool_failure() {
    let mut interner = Fixture::faulty().interner;

    // Fill the first dynamic pool (2 * 10 entries)
    let kept = intern_many(&mut interner, "fill_", 20);
    let total = interner.total();

    interner.allocator().fail(AllocSite::NewPool);
    let err = interner.intern(b"no_room").unwrap_err();
    assert_eq!(site_of(&err), Some(AllocSite::NewPool));
    assert_eq!(interner.total(), total);
    assert_eq!(interner.find(b"no_room"), None);
    assert_all_resolve(&interner, &kept);

    interner.allocator().heal(AllocSite::NewPool);
    let retry = interner.intern(b"no_room").unwrap();
    assert_eq!(retry.index(), total);
}

#[test]
fn test_countdown_failures() {
    for budget in 0..12 {
        let mut interner = Fixture::faulty().interner;
        let kept = intern_many(&mut interner, "before_", 5);

        interner.allocator().fail_after(budget);
        let mut created = Vec::new();
        for i in 0..50 {
            let name = format!("after_{}_{}", budget, i);
            match interner.intern_str(&name) {
                Ok(handle) => created.push((handle, name)),
                Err(err) => {
                    assert!(site_of(&err).is_some(), "unexpected error {}", err);
                    break;
                }
            }
        }

        assert_all_resolve(&interner, &kept);
        assert_all_resolve(&interner, &created);
        assert!(interner.allocator().failures() > 0 || created.len() == 50);
    }
}

#[test]
fn test_budget_allocator_bounds_memory() {
    let config = InternerConfig {
        initial_chunk_bytes: 64,
        initial_pool_entries: 4,
        ..Default::default()
    };
    let mut interner =
        Interner::from_parts(StaticTable::EMPTY, config, BudgetAllocator::new(8 * 1024)).unwrap();

    let mut kept = Vec::new();
    let err = loop {
        let name = format!("bounded_{}", kept.len());
        match interner.intern_str(&name) {
            Ok(handle) => kept.push((handle, name)),
            Err(err) => break err,
        }
    };

    assert!(matches!(
        err,
        InternError::Allocation(AllocError::Exhausted { .. })
    ));
    assert!(interner.allocator().used() <= interner.allocator().limit());
    assert_all_resolve(&interner, &kept);

    // Content already present is still found without allocating
    let (first, name) = &kept[0];
    assert_eq!(interner.intern_str(name).unwrap(), *first);
}
