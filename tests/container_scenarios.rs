//! End-to-end scenarios for the public container API
//!
//! Each test exercises one behavior the way a caller would see it: insert
//! semantics, growth boundaries, tombstones, ordering, views and allocators
//! working together.

use std::rc::Rc;

use probekit::containers::{ArrayRef, IndexRange, MutableArrayRef, Vector};
use probekit::hash_map::{ByAddress, Entry, Map, SetVector, StdHash, StringMap};
use probekit::memory::{GuardedAllocator, TemporaryAllocator, TemporaryPool};
use probekit::{Config, ProbeError, TemporaryPoolConfig};

// =============================================================================
// MAP SCENARIOS
// =============================================================================

#[test]
fn test_map_add_keeps_first_value() {
    let mut map: Map<i32, &str> = Map::new();
    assert!(map.add(7, "first"));
    assert!(!map.add(7, "second"));
    assert_eq!(*map.lookup(&7), "first");

    assert!(!map.add_override(7, "third"));
    assert_eq!(*map.lookup(&7), "third");
    assert_eq!(map.len(), 1);
}

#[test]
fn test_map_growth_boundary() {
    let mut map: Map<u64, u64> = Map::new();
    let usable = map.slots_usable();
    for i in 0..usable as u64 {
        map.add_new(i, i * 10);
    }
    assert_eq!(map.slots_usable(), usable);

    // One more insert than the table can hold forces exactly one rebuild.
    map.add_new(usable as u64, 0);
    assert!(map.slots_usable() > usable);
    assert_eq!(map.len(), usable + 1);
    for i in 0..usable as u64 {
        assert_eq!(*map.lookup(&i), i * 10);
    }
    assert_eq!(*map.lookup(&(usable as u64)), 0);
    assert!(map.validate().is_ok());
}

#[test]
fn test_map_remove_scenario() {
    let mut map: Map<String, i32> = Map::new();
    map.add_new("a".to_string(), 1);
    map.add_new("b".to_string(), 2);
    map.remove("a");

    assert!(!map.contains("a"));
    assert_eq!(*map.lookup("b"), 2);
    assert_eq!(map.len(), 1);
    assert!(map.lookup_ptr("a").is_none());
}

#[test]
fn test_map_missing_key_queries() {
    let map: Map<u32, u32> = [(1, 2)].into_iter().collect();
    assert!(map.lookup_ptr(&5).is_none());
    assert_eq!(map.lookup_default(&5, 99), 99);
    assert!(matches!(map.try_lookup(&5), Err(ProbeError::KeyNotFound { .. })));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| *map.lookup(&5)));
    assert!(result.is_err());
}

#[test]
fn test_map_entry_counting() {
    let text = "the quick brown fox jumps over the lazy dog the end";
    let mut counts: Map<&str, usize> = Map::new();
    for word in text.split_whitespace() {
        *counts.entry(word).or_insert(0) += 1;
    }
    assert_eq!(*counts.lookup("the"), 3);
    assert_eq!(*counts.lookup("fox"), 1);

    match counts.entry("dog") {
        Entry::Occupied(entry) => assert_eq!(entry.remove(), 1),
        Entry::Vacant(_) => panic!("dog should be present"),
    }
    assert!(!counts.contains("dog"));
    assert!(counts.validate().is_ok());
}

#[test]
fn test_map_churn_keeps_table_bounded() {
    // Repeated add/remove cycles fill the table with tombstones; rebuilding
    // must reclaim them instead of growing without bound.
    let mut map: Map<u32, u32> = Map::new();
    for round in 0..10_000u32 {
        map.add_new(round, round);
        map.remove(&round);
    }
    assert!(map.is_empty());
    assert!(map.slots_usable() <= 8);
    assert!(map.validate().is_ok());
}

#[test]
fn test_map_with_user_keys() {
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Point {
        x: i32,
        y: i32,
    }

    let mut map: Map<StdHash<Point>, &str> = Map::new();
    map.add_new(StdHash(Point { x: 1, y: 2 }), "a");
    map.add_new(StdHash(Point { x: 2, y: 1 }), "b");
    assert_eq!(*map.lookup(&StdHash(Point { x: 1, y: 2 })), "a");
    assert!(!map.contains(&StdHash(Point { x: 0, y: 0 })));
}

#[test]
fn test_map_with_identity_keys() {
    let first = Rc::new(String::from("same"));
    let second = Rc::new(String::from("same"));

    let mut map: Map<ByAddress<Rc<String>>, u8> = Map::new();
    map.add_new(ByAddress(Rc::clone(&first)), 1);
    map.add_new(ByAddress(Rc::clone(&second)), 2);

    assert_eq!(map.len(), 2);
    assert_eq!(*map.lookup(&ByAddress(Rc::clone(&second))), 2);
}

// =============================================================================
// SET VECTOR SCENARIOS
// =============================================================================

#[test]
fn test_set_vector_first_seen_order() {
    let set: SetVector<i32> = [1, 3, 3, 2, 1, 5].into_iter().collect();
    assert_eq!(set.len(), 4);
    assert_eq!(set.as_slice(), &[1, 3, 2, 5]);
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3, 2, 5]);
}

#[test]
fn test_set_vector_remove_relocates_tail() {
    let mut set: SetVector<&str> = ["a", "b", "c", "d"].into_iter().collect();
    set.remove(&"b");

    assert!(!set.contains(&"b"));
    assert_eq!(set.len(), 3);
    assert_eq!(set.as_slice(), &["a", "d", "c"]);
    assert_eq!(set.index_of(&"d"), 1);
    assert_eq!(set.index_of(&"c"), 2);
    assert_eq!(set.index_of_try(&"b"), None);
    assert!(set.validate().is_ok());
}

#[test]
fn test_set_vector_from_views() {
    let values = [4u16, 8, 15, 16, 23, 42, 4, 8];
    let mut set: SetVector<u16> = SetVector::new();
    set.add_multiple(ArrayRef::from(&values));
    assert_eq!(set.len(), 6);

    let view = set.as_view();
    assert!(!view.has_duplicates_linear());
    assert!(view.intersects_linear(ArrayRef::from(&[42u16, 100])));
    assert_eq!(set[5], 42);
}

// =============================================================================
// STRING MAP SCENARIOS
// =============================================================================

#[test]
fn test_string_map_basic_scenario() {
    let mut map: StringMap<i32> = StringMap::new();
    map.add_new("alpha", 1);
    map.add_new("beta", 2);

    assert_eq!(*map.lookup("alpha"), 1);
    assert_eq!(*map.lookup("beta"), 2);
    assert!(!map.contains("gamma"));
    assert_eq!(map.len(), 2);
}

#[test]
fn test_string_map_accepts_borrowed_keys() {
    let mut map: StringMap<Vec<usize>> = StringMap::new();
    let line = String::from("one two three two one two");
    for (position, word) in line.split(' ').enumerate() {
        map.lookup_or_add_default(word).push(position);
    }
    drop(line);

    // Keys live in the map's own arena after the source text is gone.
    assert_eq!(map.lookup("two"), &vec![1, 3, 5]);
    let mut keys: Vec<&str> = map.keys().collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["one", "three", "two"]);
}

// =============================================================================
// VECTOR AND VIEWS
// =============================================================================

#[test]
fn test_vector_and_views_together() {
    let mut vec: Vector<u32, 8> = Vector::from_slice(&[5, 1, 4, 1, 5, 9, 2, 6]);
    assert!(vec.is_inline());

    let view = vec.as_view();
    assert_eq!(view.first_index(&4), 2);
    assert!(view.has_duplicates_linear());
    assert_eq!(view.slice_range(IndexRange::new(2, 3)).as_slice(), &[4, 1, 5]);
    assert_eq!(view.take_back(2).as_slice(), &[2, 6]);

    let mut window = MutableArrayRef::from(&mut vec).drop_front(6);
    window.fill(0);
    assert_eq!(vec.as_slice(), &[5, 1, 4, 1, 5, 9, 0, 0]);

    vec.fill_indices(ArrayRef::from(&[0usize, 4]), 7);
    assert_eq!(vec.as_slice(), &[7, 1, 4, 1, 7, 9, 0, 0]);
}

#[test]
fn test_index_range_iteration() {
    let range = IndexRange::new(3, 4);
    assert_eq!(range.into_iter().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
    assert_eq!(range.one_after_last(), 7);
    assert_eq!(range.iter().rev().collect::<Vec<_>>(), vec![6, 5, 4, 3]);
    assert_eq!(IndexRange::from(2..5).size(), 3);
}

#[test]
fn test_vector_owned_iteration_drops_remaining() {
    let tracker = Rc::new(());
    let vec: Vector<Rc<()>, 2> = (0..6).map(|_| Rc::clone(&tracker)).collect();
    assert_eq!(Rc::strong_count(&tracker), 7);

    let mut iter = vec.into_iter();
    let first = iter.next();
    let last = iter.next_back();
    drop(iter);
    assert_eq!(Rc::strong_count(&tracker), 3);
    drop((first, last));
    assert_eq!(Rc::strong_count(&tracker), 1);
}

// =============================================================================
// ALLOCATORS AND CONFIGURATION
// =============================================================================

#[test]
fn test_scratch_vector_on_temporary_pool() {
    let mut scratch: Vector<f64, 0, TemporaryAllocator> = Vector::new();
    scratch.extend((0..512).map(f64::from));
    assert_eq!(scratch.len(), 512);
    assert_eq!(scratch[511], 511.0);
    scratch.clear_and_make_small();
    assert_eq!(scratch.capacity(), 0);
}

#[test]
fn test_explicit_pool_handle() {
    let config = TemporaryPoolConfig {
        buffer_size: 1024,
        max_cached_buffers: 2,
        ..TemporaryPoolConfig::default()
    };
    let mut pool = TemporaryPool::with_config(config).unwrap();

    let a = pool.allocate(100);
    unsafe { pool.deallocate(a) };
    let b = pool.allocate(200);
    assert_eq!(a, b, "most recently returned buffer is reused first");
    assert_eq!(pool.stats().buffers_created, 1);

    let big = pool.allocate(4096);
    assert_eq!(pool.stats().direct_allocations, 1);
    unsafe {
        pool.deallocate(big);
        pool.deallocate(b);
    }
    assert_eq!(pool.stats().live_allocations, 0);
    assert_eq!(pool.stats().cached_buffers, 1);
}

#[test]
fn test_pool_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pool.json");

    let config = TemporaryPoolConfig::memory_preset();
    config.save_to_file(&path).unwrap();
    let loaded = TemporaryPoolConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);

    std::fs::write(&path, r#"{"buffer_size": 0}"#).unwrap();
    assert!(TemporaryPoolConfig::load_from_file(&path).is_err());
}

#[test]
fn test_guarded_allocator_tracks_containers() {
    let before = GuardedAllocator::stats().total_allocations;
    let mut vec: Vector<u8, 4> = Vector::new();
    vec.extend_from_slice(&[0; 64]);
    assert!(GuardedAllocator::stats().total_allocations > before);
}
