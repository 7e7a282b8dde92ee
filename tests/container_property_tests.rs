//! Property-based testing for the hash containers and the small-buffer vector
//!
//! Every container is driven with random operation sequences and compared
//! against a standard library model after each step. Structural invariants of
//! the slot tables are checked through `validate()`.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

use probekit::containers::Vector;
use probekit::hash_map::{Map, SetVector, StringMap};

// =============================================================================
// OPERATION STRATEGIES
// =============================================================================

#[derive(Debug, Clone)]
enum MapOp {
    Add(u16, i32),
    AddOverride(u16, i32),
    Discard(u16),
    Pop(u16),
    Lookup(u16),
    Clear,
}

#[derive(Debug, Clone)]
enum SetOp {
    Add(u8),
    Discard(u8),
    Pop,
}

#[derive(Debug, Clone)]
enum VectorOp {
    Append(i64),
    PopLast,
    RemoveAndReorder(usize),
    Reserve(usize),
    ClearAndMakeSmall,
}

fn map_ops_strategy() -> impl Strategy<Value = Vec<MapOp>> {
    // A narrow key domain makes collisions, overrides and tombstone reuse common.
    let key = 0u16..64;
    prop::collection::vec(
        prop_oneof![
            4 => (key.clone(), any::<i32>()).prop_map(|(k, v)| MapOp::Add(k, v)),
            2 => (key.clone(), any::<i32>()).prop_map(|(k, v)| MapOp::AddOverride(k, v)),
            2 => key.clone().prop_map(MapOp::Discard),
            1 => key.clone().prop_map(MapOp::Pop),
            2 => key.prop_map(MapOp::Lookup),
            1 => Just(MapOp::Clear),
        ],
        0..300,
    )
}

fn set_ops_strategy() -> impl Strategy<Value = Vec<SetOp>> {
    prop::collection::vec(
        prop_oneof![
            5 => any::<u8>().prop_map(SetOp::Add),
            2 => any::<u8>().prop_map(SetOp::Discard),
            1 => Just(SetOp::Pop),
        ],
        0..300,
    )
}

fn vector_ops_strategy() -> impl Strategy<Value = Vec<VectorOp>> {
    prop::collection::vec(
        prop_oneof![
            6 => any::<i64>().prop_map(VectorOp::Append),
            2 => Just(VectorOp::PopLast),
            2 => (0usize..64).prop_map(VectorOp::RemoveAndReorder),
            1 => (0usize..100).prop_map(VectorOp::Reserve),
            1 => Just(VectorOp::ClearAndMakeSmall),
        ],
        0..200,
    )
}

fn key_string_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-c]{0,3}",
        "[a-zA-Z0-9_]{4,24}",
        "\\PC{1,8}",
    ]
}

// =============================================================================
// MAP PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_map_matches_std_model(ops in map_ops_strategy()) {
        let mut map: Map<u16, i32> = Map::new();
        let mut model: HashMap<u16, i32> = HashMap::new();

        for op in ops {
            match op {
                MapOp::Add(k, v) => {
                    let expected = !model.contains_key(&k);
                    if expected {
                        model.insert(k, v);
                    }
                    prop_assert_eq!(map.add(k, v), expected);
                }
                MapOp::AddOverride(k, v) => {
                    let expected = model.insert(k, v).is_none();
                    prop_assert_eq!(map.add_override(k, v), expected);
                }
                MapOp::Discard(k) => {
                    prop_assert_eq!(map.discard(&k), model.remove(&k).is_some());
                }
                MapOp::Pop(k) => {
                    prop_assert_eq!(map.pop_try(&k), model.remove(&k));
                }
                MapOp::Lookup(k) => {
                    prop_assert_eq!(map.lookup_ptr(&k), model.get(&k));
                    prop_assert_eq!(map.contains(&k), model.contains_key(&k));
                }
                MapOp::Clear => {
                    map.clear();
                    model.clear();
                }
            }
            prop_assert_eq!(map.len(), model.len());
        }

        prop_assert!(map.validate().is_ok());
        let mut items: Vec<(u16, i32)> = map.items().map(|(k, v)| (*k, *v)).collect();
        let mut expected: Vec<(u16, i32)> = model.into_iter().collect();
        items.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(items, expected);
    }

    #[test]
    fn prop_map_load_factor_is_respected(keys in prop::collection::hash_set(any::<u32>(), 0..500)) {
        let mut map: Map<u32, u32> = Map::new();
        for &k in &keys {
            map.add_new(k, k.wrapping_mul(3));
            prop_assert!(map.len() <= map.slots_usable());
        }
        prop_assert!(map.validate().is_ok());
        for &k in &keys {
            prop_assert_eq!(*map.lookup(&k), k.wrapping_mul(3));
        }
    }

    #[test]
    fn prop_map_clone_is_equal(entries in prop::collection::vec((any::<i16>(), any::<u8>()), 0..100)) {
        let map: Map<i16, u8> = entries.iter().copied().collect();
        let copy = map.clone();
        prop_assert_eq!(&copy, &map);
        prop_assert!(copy.validate().is_ok());

        // Last value wins for repeated keys.
        let model: HashMap<i16, u8> = entries.into_iter().collect();
        prop_assert_eq!(map.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(map.lookup(k), v);
        }
    }
}

// =============================================================================
// SET VECTOR PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_set_vector_matches_model(ops in set_ops_strategy()) {
        let mut set: SetVector<u8> = SetVector::new();
        let mut model: Vec<u8> = Vec::new();

        for op in ops {
            match op {
                SetOp::Add(k) => {
                    let expected = !model.contains(&k);
                    if expected {
                        model.push(k);
                    }
                    prop_assert_eq!(set.add(k), expected);
                }
                SetOp::Discard(k) => {
                    match model.iter().position(|&x| x == k) {
                        Some(index) => {
                            model.swap_remove(index);
                            prop_assert!(set.discard(&k));
                        }
                        None => prop_assert!(!set.discard(&k)),
                    }
                }
                SetOp::Pop => {
                    if let Some(expected) = model.pop() {
                        prop_assert_eq!(set.pop(), expected);
                    }
                }
            }
            prop_assert_eq!(set.as_slice(), model.as_slice());
        }

        prop_assert!(set.validate().is_ok());
        for (index, key) in model.iter().enumerate() {
            prop_assert_eq!(set.index_of(key), index);
        }
    }

    #[test]
    fn prop_set_vector_keeps_first_occurrence_order(values in prop::collection::vec(0u32..50, 0..200)) {
        let set: SetVector<u32> = values.iter().copied().collect();

        let mut seen = HashSet::new();
        let expected: Vec<u32> = values.into_iter().filter(|v| seen.insert(*v)).collect();
        prop_assert_eq!(set.as_slice(), expected.as_slice());
    }
}

// =============================================================================
// STRING MAP PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_string_map_matches_std_model(keys in prop::collection::vec(key_string_strategy(), 0..200)) {
        let mut map: StringMap<usize> = StringMap::new();
        let mut model: HashMap<String, usize> = HashMap::new();

        for (index, key) in keys.iter().enumerate() {
            let expected = !model.contains_key(key);
            if expected {
                model.insert(key.clone(), index);
            }
            prop_assert_eq!(map.add(key, index), expected);
        }

        prop_assert_eq!(map.len(), model.len());
        prop_assert!(map.validate().is_ok());
        for (key, value) in &model {
            prop_assert_eq!(map.lookup(key), value);
        }

        let mut collected: Vec<(String, usize)> =
            map.items().map(|(k, v)| (k.to_string(), *v)).collect();
        let mut expected: Vec<(String, usize)> = model.into_iter().collect();
        collected.sort();
        expected.sort();
        prop_assert_eq!(collected, expected);
    }

    #[test]
    fn prop_string_map_rejects_unknown_keys(
        stored in prop::collection::hash_set("[a-z]{1,6}", 0..50),
        probe in "[0-9]{1,6}",
    ) {
        let mut map: StringMap<u8> = StringMap::new();
        for key in &stored {
            map.add_new(key, 1);
        }
        prop_assert!(!map.contains(&probe));
        prop_assert!(map.lookup_ptr(&probe).is_none());
        prop_assert!(map.try_lookup(&probe).is_err());
    }
}

// =============================================================================
// VECTOR PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_vector_matches_std_vec(ops in vector_ops_strategy()) {
        let mut vec: Vector<i64, 4> = Vector::new();
        let mut model: Vec<i64> = Vec::new();

        for op in ops {
            match op {
                VectorOp::Append(v) => {
                    vec.append(v);
                    model.push(v);
                }
                VectorOp::PopLast => {
                    if let Some(expected) = model.pop() {
                        prop_assert_eq!(vec.pop_last(), expected);
                    }
                }
                VectorOp::RemoveAndReorder(index) => {
                    if index < model.len() {
                        prop_assert_eq!(vec.remove_and_reorder(index), model.swap_remove(index));
                    }
                }
                VectorOp::Reserve(capacity) => {
                    vec.reserve(capacity);
                    prop_assert!(vec.capacity() >= capacity);
                }
                VectorOp::ClearAndMakeSmall => {
                    vec.clear_and_make_small();
                    model.clear();
                    prop_assert!(vec.is_inline());
                }
            }
            prop_assert_eq!(vec.as_slice(), model.as_slice());
            prop_assert!(vec.capacity() >= vec.len());
            prop_assert_eq!(vec.is_inline(), vec.capacity() == 4);
        }
    }

    #[test]
    fn prop_vector_capacity_is_power_of_two(len in 5usize..1000) {
        let mut vec: Vector<u32, 4> = Vector::new();
        for i in 0..len {
            vec.append(i as u32);
        }
        prop_assert!(vec.capacity().is_power_of_two());
        prop_assert!(vec.capacity() >= len);
        prop_assert!(vec.capacity() < len * 2);
    }

    #[test]
    fn prop_vector_from_vector_preserves_contents(values in prop::collection::vec(any::<u16>(), 0..40)) {
        let small: Vector<u16, 2> = values.iter().copied().collect();
        let large: Vector<u16, 16> = Vector::from_vector(small);
        prop_assert_eq!(large.as_slice(), values.as_slice());

        let back: Vector<u16, 0> = Vector::from_vector(large);
        prop_assert_eq!(back.as_slice(), values.as_slice());
    }
}
