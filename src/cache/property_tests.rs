//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the engine's behavioural properties over random
//! operation sequences.

use proptest::prelude::*;
use std::collections::HashMap;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{derive_key, Cache, KeyParams, ShardedCache, Ttl};
use crate::config::CacheConfig;

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);

fn new_cache(max_entries: usize) -> Cache<String, String> {
    Cache::new(
        &CacheConfig::new(TEST_DEFAULT_TTL)
            .with_max_entries(max_entries)
            .with_cleanup_interval(Duration::ZERO),
    )
}

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-f0-9]{1,3}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}"
}

/// A single cache operation
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn param_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[a-z]{1,8}", "[a-zA-Z0-9]{0,40}"), 0..6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Statistics accuracy: hits and misses match what the caller observed.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let store = new_cache(TEST_MAX_ENTRIES);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.insert(key, value),
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.current_size, store.len(), "Size mismatch");
    }

    // Unbounded cache behaves like a map.
    #[test]
    fn prop_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let store = new_cache(0);
        let mut model: HashMap<String, String> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.insert(key.clone(), value.clone());
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(store.get(&key), model.get(&key).cloned());
                }
                CacheOp::Delete { key } => {
                    prop_assert_eq!(store.delete(&key), model.remove(&key).is_some());
                }
            }
        }

        prop_assert_eq!(store.len(), model.len());
    }

    // Overwrite semantics: the last value wins and the entry count is one.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let store = new_cache(TEST_MAX_ENTRIES);

        store.insert(key.clone(), value1);
        store.insert(key.clone(), value2.clone());

        prop_assert_eq!(store.get(&key), Some(value2));
        prop_assert_eq!(store.len(), 1);
    }

    // Capacity enforcement: size never exceeds max_entries.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..200),
        max_entries in 1usize..20
    ) {
        let store = new_cache(max_entries);

        for (key, value) in entries {
            store.insert(key, value);
            prop_assert!(
                store.len() <= max_entries,
                "Cache size {} exceeds max {}",
                store.len(),
                max_entries
            );
        }
    }

    // Sharded capacity: the shard capacities add up to the bound.
    #[test]
    fn prop_sharded_capacity(
        keys in prop::collection::vec(key_strategy(), 1..300),
        max_entries in 1usize..40,
        shards in 1usize..8
    ) {
        let store: ShardedCache<String, usize> = ShardedCache::new(
            &CacheConfig::new(TEST_DEFAULT_TTL)
                .with_max_entries(max_entries)
                .with_shards(shards)
                .with_cleanup_interval(Duration::ZERO),
        );

        for (i, key) in keys.into_iter().enumerate() {
            store.insert(key, i);
            prop_assert!(store.len() <= max_entries);
        }
    }

    // LRU: the one key never read after the others were refreshed is the victim.
    #[test]
    fn prop_lru_victim(capacity in 2usize..10, stale in 0usize..10) {
        let stale = stale % capacity;
        let store = new_cache(capacity);

        for i in 0..capacity {
            store.insert(format!("k{}", i), i.to_string());
        }
        for i in (0..capacity).filter(|&i| i != stale) {
            let key = format!("k{}", i);
            prop_assert!(store.get(key.as_str()).is_some());
        }

        store.insert("new".to_string(), "x".to_string());

        let stale_key = format!("k{}", stale);
        prop_assert_eq!(store.len(), capacity);
        prop_assert!(store.get(stale_key.as_str()).is_none());
        prop_assert!(store.get("new").is_some());
        prop_assert_eq!(store.stats().evictions, 1);
    }

    // Shard aggregation: router hits equal the per-shard sum.
    #[test]
    fn prop_shard_aggregation(ops in prop::collection::vec(cache_op_strategy(), 1..120), shards in 1usize..8) {
        let store: ShardedCache<String, String> = ShardedCache::new(
            &CacheConfig::new(TEST_DEFAULT_TTL)
                .with_shards(shards)
                .with_cleanup_interval(Duration::ZERO),
        );
        let mut expected_hits = 0u64;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.insert(key, value),
                CacheOp::Get { key } => {
                    if store.get(&key).is_some() {
                        expected_hits += 1;
                    }
                }
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
            }
        }

        let total = store.stats();
        let per_shard = store.shard_stats();
        prop_assert_eq!(total.hits, expected_hits);
        prop_assert_eq!(total.hits, per_shard.iter().map(|s| s.hits).sum::<u64>());
        prop_assert_eq!(total.misses, per_shard.iter().map(|s| s.misses).sum::<u64>());
        prop_assert_eq!(total.current_size, per_shard.iter().map(|s| s.current_size).sum::<usize>());
    }

    // Key derivation ignores parameter order.
    #[test]
    fn prop_key_order_independent(method in "[a-z]{1,8}\\.[a-z]{1,12}", params in param_strategy()) {
        let forward: KeyParams = params.iter().map(|(n, v)| (n.clone(), v.clone())).collect();
        let reverse: KeyParams = params.iter().rev().map(|(n, v)| (n.clone(), v.clone())).collect();

        // Duplicate names keep the last value, so only compare unique-name sets.
        let mut names: Vec<_> = params.iter().map(|(n, _)| n).collect();
        names.sort();
        names.dedup();
        prop_assume!(names.len() == params.len());

        prop_assert_eq!(derive_key(&method, &forward), derive_key(&method, &reverse));
    }

    // Derived keys stay bounded.
    #[test]
    fn prop_key_length_bounded(method in "[a-z]{1,8}\\.[a-z]{1,12}", params in param_strategy()) {
        let params: KeyParams = params.into_iter().collect();
        let key = derive_key(&method, &params);

        prop_assert!(key.starts_with(method.as_str()));
        prop_assert!(key.chars().count() <= 100 || key.len() == method.len() + 1 + 32);
    }

    // Load-through: a second lookup never calls fetch.
    #[test]
    fn prop_load_through_fetches_once(key in key_strategy(), value in value_strategy()) {
        let store = new_cache(TEST_MAX_ENTRIES);
        let mut calls = 0;

        let first = tokio_test::block_on(store.get_or_fetch(key.clone(), |_| {
            calls += 1;
            let value = value.clone();
            async move { Ok::<_, String>(value) }
        }));
        let second = tokio_test::block_on(store.get_or_fetch(key.clone(), |_| {
            calls += 1;
            async { Ok::<_, String>(String::new()) }
        }));

        prop_assert_eq!(first, Ok(value.clone()));
        prop_assert_eq!(second, Ok(value));
        prop_assert_eq!(calls, 1);
        prop_assert_eq!(store.stats().loads, 1);
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // TTL expiration: visible before the TTL elapses, gone after.
    #[test]
    fn prop_ttl_expiration_behavior(key in key_strategy(), value in value_strategy()) {
        let store = new_cache(TEST_MAX_ENTRIES);

        store.set(key.clone(), value.clone(), Ttl::After(Duration::from_millis(40)));
        prop_assert_eq!(store.get(&key), Some(value.clone()));

        sleep(Duration::from_millis(70));

        prop_assert_eq!(store.get(&key), None);
    }

    // No-expiry sentinel outlives a short default TTL.
    #[test]
    fn prop_never_outlives_default(key in key_strategy(), value in value_strategy()) {
        let store: Cache<String, String> = Cache::new(
            &CacheConfig::new(Duration::from_millis(10)).with_cleanup_interval(Duration::ZERO),
        );

        store.set(key.clone(), value.clone(), Ttl::Never);
        sleep(Duration::from_millis(40));

        prop_assert_eq!(store.get(&key), Some(value));
    }
}
