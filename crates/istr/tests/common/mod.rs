//! Shared fixtures for the istr integration tests.

#![allow(dead_code)]

use istr::{
    Allocator, FaultInjector, Handle, Interner, InternerConfig, StaticEntry, StaticTable,
};

/// Small sorted root used across the suites
pub static COLORS: [StaticEntry; 5] = [
    StaticEntry::NULL,
    StaticEntry::new(b"blue"),
    StaticEntry::new(b"green"),
    StaticEntry::new(b"red"),
    StaticEntry::new(b"yellow"),
];

/// Interner fixture bundling the interner with what it was built from
pub struct Fixture<A: Allocator> {
    pub interner: Interner<A>,
    pub config: InternerConfig,
}

impl Fixture<istr::SystemAllocator> {
    /// Empty root, small pools and chunks to force growth early
    pub fn small() -> Self {
        let config = InternerConfig {
            initial_pool_entries: 2,
            initial_chunk_bytes: 16,
            ..Default::default()
        };
        let interner = Interner::with_config(StaticTable::EMPTY, config.clone())
            .expect("small fixture config is valid");
        Self { interner, config }
    }

    /// The COLORS root with default settings
    pub fn colors() -> Self {
        let config = InternerConfig::default();
        let interner = Interner::with_config(StaticTable::new(&COLORS), config.clone())
            .expect("colors table is valid");
        Self { interner, config }
    }
}

impl Fixture<FaultInjector> {
    /// The COLORS root with a fault injector
    pub fn faulty() -> Self {
        let config = InternerConfig::default();
        let interner =
            Interner::from_parts(StaticTable::new(&COLORS), config.clone(), FaultInjector::new())
                .expect("colors table is valid");
        Self { interner, config }
    }
}

/// Intern `count` distinct names `"{prefix}{i}"`, panicking on failure
pub fn intern_many<A: Allocator>(
    interner: &mut Interner<A>,
    prefix: &str,
    count: usize,
) -> Vec<(Handle, String)> {
    (0..count)
        .map(|i| {
            let name = format!("{}{}", prefix, i);
            let handle = interner
                .intern_str(&name)
                .unwrap_or_else(|err| panic!("interning {:?} failed: {}", name, err));
            (handle, name)
        })
        .collect()
}

/// Assert every handle still resolves to its original content
pub fn assert_all_resolve<A: Allocator>(interner: &Interner<A>, entries: &[(Handle, String)]) {
    for (handle, name) in entries {
        assert_eq!(
            interner.content(*handle),
            name.as_bytes(),
            "{} no longer resolves to {:?}",
            handle,
            name
        );
    }
}
