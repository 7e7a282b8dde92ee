//! StringMap: string-keyed map with an interning arena
//!
//! Keys are copied into one growable byte arena, one record per key:
//!
//! ```text
//! [u32 length, native endian][key bytes][NUL]
//! ```
//!
//! Each slot caches the 32-bit hash and the arena offset of its key, so probing
//! compares hashes first and only touches the arena on a hash match. Growth
//! moves `(hash, offset, value)` triples and never rehashes or copies keys.
//!
//! There is no removal and therefore no tombstone state: an Empty slot always
//! ends a probe.

use super::hash_functions::hash_string;
use super::open_addressing::{OpenAddressingArray, ProbeSequence, SlotState, SlotStatus};
use crate::containers::Vector;
use crate::error::{ProbeError, Result};
use crate::memory::{Allocator, GuardedAllocator};
use std::fmt;
use std::mem;

/// Inline bytes of the key arena
const ARENA_INLINE_BYTES: usize = 32;

/// Bytes in front of every key: its length
const LENGTH_PREFIX: usize = mem::size_of::<u32>();

enum StringSlot<T> {
    Empty,
    Set { hash: u32, offset: u32, value: T },
}

impl<T> Default for StringSlot<T> {
    fn default() -> Self {
        StringSlot::Empty
    }
}

impl<T: Clone> Clone for StringSlot<T> {
    fn clone(&self) -> Self {
        match self {
            StringSlot::Empty => StringSlot::Empty,
            StringSlot::Set { hash, offset, value } => StringSlot::Set {
                hash: *hash,
                offset: *offset,
                value: value.clone(),
            },
        }
    }
}

impl<T> SlotStatus for StringSlot<T> {
    #[inline]
    fn status(&self) -> SlotState {
        match self {
            StringSlot::Empty => SlotState::Empty,
            StringSlot::Set { .. } => SlotState::Set,
        }
    }
}

/// Read the key stored at `offset`
#[inline]
fn key_at(arena: &[u8], offset: u32) -> &str {
    let start = offset as usize;
    let mut length = [0u8; LENGTH_PREFIX];
    length.copy_from_slice(&arena[start..start + LENGTH_PREFIX]);
    let length = u32::from_ne_bytes(length) as usize;
    let bytes = &arena[start + LENGTH_PREFIX..start + LENGTH_PREFIX + length];
    // SAFETY: records are only ever written from `&str` keys.
    unsafe { std::str::from_utf8_unchecked(bytes) }
}

/// Map from strings to `T` with interned keys
///
/// ```rust
/// use probekit::StringMap;
///
/// let mut map = StringMap::new();
/// map.add_new("alpha", 1);
/// map.add_new("beta", 2);
/// assert_eq!(*map.lookup("alpha"), 1);
/// assert!(!map.contains("gamma"));
/// ```
pub struct StringMap<T, A: Allocator = GuardedAllocator> {
    slots: OpenAddressingArray<StringSlot<T>, 1, A>,
    chars: Vector<u8, ARENA_INLINE_BYTES, A>,
}

impl<T> StringMap<T> {
    /// Create an empty map
    pub fn new() -> Self {
        Self::new_in(GuardedAllocator)
    }
}

impl<T, A: Allocator> StringMap<T, A> {
    /// Create an empty map that allocates through `allocator`
    pub fn new_in(allocator: A) -> Self {
        Self {
            slots: OpenAddressingArray::new_in(allocator.clone()),
            chars: Vector::new_in(allocator),
        }
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.slots_set()
    }

    /// Returns true if the map holds no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes used by the key arena
    #[inline]
    pub fn arena_size(&self) -> usize {
        self.chars.len()
    }

    /// Number of entries the current table accepts before growing
    #[inline]
    pub fn slots_usable(&self) -> usize {
        self.slots.slots_usable()
    }

    /// Verify that the occupancy counters match the slot contents
    pub fn validate(&self) -> Result<()> {
        self.slots.validate()
    }

    /// Slot index of `key`, or the empty slot ending its probe
    fn probe(&self, key: &str, hash: u32) -> std::result::Result<usize, usize> {
        let slots = self.slots.slots();
        for index in ProbeSequence::new(hash, self.slots.slot_mask()) {
            match &slots[index] {
                StringSlot::Empty => return Err(index),
                StringSlot::Set {
                    hash: stored_hash,
                    offset,
                    ..
                } => {
                    // A hash match may still be a different key.
                    if *stored_hash == hash && key_at(&self.chars, *offset) == key {
                        return Ok(index);
                    }
                }
            }
        }
        unreachable!("probe sequence ended")
    }

    #[inline]
    fn find(&self, key: &str) -> Option<usize> {
        self.probe(key, hash_string(key)).ok()
    }

    #[inline]
    fn value_at(&self, index: usize) -> &T {
        match &self.slots.slots()[index] {
            StringSlot::Set { value, .. } => value,
            StringSlot::Empty => unreachable!("slot {} is not set", index),
        }
    }

    #[inline]
    fn value_at_mut(&mut self, index: usize) -> &mut T {
        match &mut self.slots.slots_mut()[index] {
            StringSlot::Set { value, .. } => value,
            StringSlot::Empty => unreachable!("slot {} is not set", index),
        }
    }

    /// Append an arena record for `key` and return its offset
    fn intern(&mut self, key: &str) -> u32 {
        let offset = self.chars.len();
        let end = offset + LENGTH_PREFIX + key.len() + 1;
        assert!(
            u32::try_from(end).is_ok() && u32::try_from(key.len()).is_ok(),
            "StringMap key arena exceeds 4 GiB"
        );
        self.chars.reserve(end);
        self.chars.extend_from_slice(&(key.len() as u32).to_ne_bytes());
        self.chars.extend_from_slice(key.as_bytes());
        self.chars.append(0);
        offset as u32
    }

    fn ensure_can_add(&mut self) {
        if self.slots.should_grow() {
            self.realloc_and_reinsert(self.len() + 1);
        }
    }

    /// Rebuild the table from cached hashes and offsets
    fn realloc_and_reinsert(&mut self, min_usable_slots: usize) {
        let new_slots = self.slots.init_reserved(min_usable_slots);
        log::trace!(
            "StringMap: growing from {} to {} slots with {} entries",
            self.slots.slots_total(),
            new_slots.slots_total(),
            self.len()
        );
        let old_slots = mem::replace(&mut self.slots, new_slots);
        let mask = self.slots.slot_mask();
        let table = self.slots.slots_mut();
        for slot in old_slots.into_slots() {
            if let StringSlot::Set { hash, .. } = slot {
                for index in ProbeSequence::new(hash, mask) {
                    if let StringSlot::Empty = table[index] {
                        table[index] = slot;
                        break;
                    }
                }
            }
        }
    }

    /// Store a new entry in the empty slot `index`
    fn occupy(&mut self, index: usize, key: &str, hash: u32, value: T) {
        let offset = self.intern(key);
        self.slots.slots_mut()[index] = StringSlot::Set { hash, offset, value };
        self.slots.update_empty_to_set();
    }

    /// Make room for at least `min_entries` entries without further growth
    pub fn reserve(&mut self, min_entries: usize) {
        if min_entries > self.slots.slots_usable() {
            self.realloc_and_reinsert(min_entries);
        }
    }

    /// Insert a key that is known to be absent
    ///
    /// The absence is only checked in debug builds.
    pub fn add_new(&mut self, key: &str, value: T) {
        debug_assert!(!self.contains(key), "add_new() with a key already in the StringMap");
        self.ensure_can_add();
        let hash = hash_string(key);
        let slots = self.slots.slots();
        let index = ProbeSequence::new(hash, self.slots.slot_mask())
            .find(|&index| matches!(slots[index], StringSlot::Empty))
            .unwrap_or_else(|| unreachable!("probe sequence ended"));
        self.occupy(index, key, hash, value);
    }

    /// Insert if `key` is absent; returns true if the entry was added
    pub fn add(&mut self, key: &str, value: T) -> bool {
        self.ensure_can_add();
        let hash = hash_string(key);
        match self.probe(key, hash) {
            Ok(_) => false,
            Err(index) => {
                self.occupy(index, key, hash, value);
                true
            }
        }
    }

    /// Value of `key`, created with `create` first if absent
    pub fn lookup_or_add<F>(&mut self, key: &str, create: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        self.ensure_can_add();
        let hash = hash_string(key);
        let index = match self.probe(key, hash) {
            Ok(index) => index,
            Err(index) => {
                self.occupy(index, key, hash, create());
                index
            }
        };
        self.value_at_mut(index)
    }

    /// Value of `key`, default-constructed first if absent
    pub fn lookup_or_add_default(&mut self, key: &str) -> &mut T
    where
        T: Default,
    {
        self.lookup_or_add(key, T::default)
    }

    /// Returns true if `key` is present
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Value of `key`, or `None`
    pub fn lookup_ptr(&self, key: &str) -> Option<&T> {
        let index = self.find(key)?;
        Some(self.value_at(index))
    }

    /// Mutable value of `key`, or `None`
    pub fn lookup_ptr_mut(&mut self, key: &str) -> Option<&mut T> {
        let index = self.find(key)?;
        Some(self.value_at_mut(index))
    }

    /// Value of `key`
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent.
    pub fn lookup(&self, key: &str) -> &T {
        match self.find(key) {
            Some(index) => self.value_at(index),
            None => panic!("lookup() of key '{}' that is not in the StringMap", key),
        }
    }

    /// Mutable value of `key`
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent.
    pub fn lookup_mut(&mut self, key: &str) -> &mut T {
        match self.find(key) {
            Some(index) => self.value_at_mut(index),
            None => panic!("lookup_mut() of key '{}' that is not in the StringMap", key),
        }
    }

    /// Value of `key` as a `Result`
    pub fn try_lookup(&self, key: &str) -> Result<&T> {
        self.lookup_ptr(key)
            .ok_or_else(|| ProbeError::key_not_found(format!("StringMap key '{}'", key)))
    }

    /// Copy of the value of `key`, or `default`
    pub fn lookup_default(&self, key: &str, default: T) -> T
    where
        T: Clone,
    {
        self.lookup_ptr(key).cloned().unwrap_or(default)
    }

    /// Iterate over `(key, value)` pairs in slot order
    pub fn items(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        let arena = self.chars.as_slice();
        self.slots.slots().iter().filter_map(move |slot| match slot {
            StringSlot::Set { offset, value, .. } => Some((key_at(arena, *offset), value)),
            StringSlot::Empty => None,
        })
    }

    /// Iterate over the keys
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.items().map(|(key, _)| key)
    }

    /// Iterate over the values
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.items().map(|(_, value)| value)
    }

    /// Iterate over mutable references to the values
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.slots.slots_mut().iter_mut().filter_map(|slot| match slot {
            StringSlot::Set { value, .. } => Some(value),
            StringSlot::Empty => None,
        })
    }

    /// Call `f` for every entry
    pub fn foreach_key_value_pair<F>(&self, mut f: F)
    where
        F: FnMut(&str, &T),
    {
        for (key, value) in self.items() {
            f(key, value);
        }
    }

    /// Log occupancy, probe statistics and arena size under `name`
    pub fn log_stats(&self, name: &str) {
        let stats = self.slots.stats(|slot| match slot {
            StringSlot::Set { hash, .. } => *hash,
            StringSlot::Empty => 0,
        });
        log::debug!(
            "StringMap '{}': {}, {} bytes of slots, {} bytes of keys",
            name,
            stats,
            self.slots.size_in_bytes(),
            self.chars.len()
        );
    }
}

impl<T, A: Allocator> Default for StringMap<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: Clone, A: Allocator> Clone for StringMap<T, A> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            chars: self.chars.clone(),
        }
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for StringMap<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.items()).finish()
    }
}
