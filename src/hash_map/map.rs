//! Map: open-addressing hash map
//!
//! Keys and values live directly in the slots of an [`OpenAddressingArray`].
//! Removal leaves a tombstone behind so that probing stays correct; tombstones
//! are reused by later insertions and disappear when the table grows.
//!
//! Every insertion is built on a single probe that either finds the key or the
//! place where it belongs, exposed as the [`Entry`] API. [`Map::add_or_modify`],
//! [`Map::lookup_or_add`] and [`Map::add_override`] are thin layers over it.
//!
//! # Examples
//!
//! ```rust
//! use probekit::Map;
//!
//! let mut map = Map::new();
//! map.add_new("a".to_string(), 1);
//! map.add_new("b".to_string(), 2);
//! map.remove("a");
//! assert!(!map.contains("a"));
//! assert_eq!(*map.lookup("b"), 2);
//! assert_eq!(map.len(), 1);
//! ```

use super::hash_functions::DefaultHash;
use super::open_addressing::{OpenAddressingArray, ProbeSequence, SlotState, SlotStatus};
use crate::error::{ProbeError, Result};
use crate::memory::{Allocator, GuardedAllocator};
use std::borrow::Borrow;
use std::fmt;
use std::mem;

enum MapSlot<K, V> {
    Empty,
    Set { key: K, value: V },
    Dummy,
}

impl<K, V> Default for MapSlot<K, V> {
    fn default() -> Self {
        MapSlot::Empty
    }
}

impl<K: Clone, V: Clone> Clone for MapSlot<K, V> {
    fn clone(&self) -> Self {
        match self {
            MapSlot::Empty => MapSlot::Empty,
            MapSlot::Set { key, value } => MapSlot::Set {
                key: key.clone(),
                value: value.clone(),
            },
            MapSlot::Dummy => MapSlot::Dummy,
        }
    }
}

impl<K, V> SlotStatus for MapSlot<K, V> {
    #[inline]
    fn status(&self) -> SlotState {
        match self {
            MapSlot::Empty => SlotState::Empty,
            MapSlot::Set { .. } => SlotState::Set,
            MapSlot::Dummy => SlotState::Dummy,
        }
    }
}

type Slots<K, V, A> = OpenAddressingArray<MapSlot<K, V>, 1, A>;

/// Result of probing for a key that is about to be inserted
enum InsertProbe {
    Occupied(usize),
    Vacant { index: usize, reuses_dummy: bool },
}

/// Hash map with open addressing and tombstone deletion
pub struct Map<K, V, A: Allocator = GuardedAllocator> {
    slots: Slots<K, V, A>,
}

impl<K, V> Map<K, V> {
    /// Create an empty map; no allocation happens until the table grows
    pub fn new() -> Self {
        Self::new_in(GuardedAllocator)
    }
}

impl<K, V, A: Allocator> Map<K, V, A> {
    /// Create an empty map that allocates through `allocator`
    pub fn new_in(allocator: A) -> Self {
        Self {
            slots: OpenAddressingArray::new_in(allocator),
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

    /// Number of entries the current table accepts before growing
    #[inline]
    pub fn slots_usable(&self) -> usize {
        self.slots.slots_usable()
    }

    /// Bytes used by the slot table
    pub fn size_in_bytes(&self) -> usize {
        self.slots.size_in_bytes()
    }

    /// Remove every entry and return to the smallest table
    pub fn clear(&mut self) {
        self.slots = OpenAddressingArray::new_in(self.slots.allocator().clone());
    }

    /// Iterate over `(key, value)` pairs in slot order
    pub fn items(&self) -> Items<'_, K, V> {
        Items {
            slots: self.slots.slots().iter(),
            remaining: self.len(),
        }
    }

    /// Iterate over the keys
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { items: self.items() }
    }

    /// Iterate over the values
    pub fn values(&self) -> Values<'_, K, V> {
        Values { items: self.items() }
    }

    /// Iterate over mutable references to the values
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        let remaining = self.len();
        ValuesMut {
            slots: self.slots.slots_mut().iter_mut(),
            remaining,
        }
    }

    /// Call `f` for every entry
    pub fn foreach_item<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self.items() {
            f(key, value);
        }
    }

    /// Verify that the occupancy counters match the slot contents
    pub fn validate(&self) -> Result<()> {
        self.slots.validate()
    }

    #[inline]
    fn value_at(&self, index: usize) -> &V {
        match &self.slots.slots()[index] {
            MapSlot::Set { value, .. } => value,
            _ => unreachable!("slot {} is not set", index),
        }
    }

    #[inline]
    fn value_at_mut(&mut self, index: usize) -> &mut V {
        match &mut self.slots.slots_mut()[index] {
            MapSlot::Set { value, .. } => value,
            _ => unreachable!("slot {} is not set", index),
        }
    }
}

impl<K, V, A> Map<K, V, A>
where
    K: DefaultHash + PartialEq,
    A: Allocator,
{
    /// Slot index holding `key`
    fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        let slots = self.slots.slots();
        for index in ProbeSequence::new(key.default_hash(), self.slots.slot_mask()) {
            match &slots[index] {
                MapSlot::Empty => return None,
                MapSlot::Set { key: stored, .. } if <K as Borrow<Q>>::borrow(stored) == key => {
                    return Some(index)
                }
                _ => {}
            }
        }
        unreachable!("probe sequence ended")
    }

    /// Probe for `key`, remembering the first tombstone on the way
    fn probe_for_insert(&self, key: &K) -> InsertProbe {
        let slots = self.slots.slots();
        let mut first_dummy = None;
        for index in ProbeSequence::new(key.default_hash(), self.slots.slot_mask()) {
            match &slots[index] {
                MapSlot::Empty => {
                    return match first_dummy {
                        Some(dummy) => InsertProbe::Vacant {
                            index: dummy,
                            reuses_dummy: true,
                        },
                        None => InsertProbe::Vacant {
                            index,
                            reuses_dummy: false,
                        },
                    };
                }
                MapSlot::Set { key: stored, .. } => {
                    if stored == key {
                        return InsertProbe::Occupied(index);
                    }
                }
                MapSlot::Dummy => {
                    if first_dummy.is_none() {
                        first_dummy = Some(index);
                    }
                }
            }
        }
        unreachable!("probe sequence ended")
    }

    /// Place an entry into the first empty slot of its probe sequence
    ///
    /// Counters are left untouched.
    fn place(slots: &mut Slots<K, V, A>, key: K, value: V) -> usize {
        let mask = slots.slot_mask();
        let table = slots.slots_mut();
        for index in ProbeSequence::new(key.default_hash(), mask) {
            if let MapSlot::Empty = table[index] {
                table[index] = MapSlot::Set { key, value };
                return index;
            }
        }
        unreachable!("probe sequence ended")
    }

    fn ensure_can_add(&mut self) {
        if self.slots.should_grow() {
            self.realloc_and_reinsert(self.len() + 1);
        }
    }

    /// Rebuild the table with room for `min_usable_slots`, dropping tombstones
    fn realloc_and_reinsert(&mut self, min_usable_slots: usize) {
        let new_slots = self.slots.init_reserved(min_usable_slots);
        log::trace!(
            "Map: growing from {} to {} slots with {} entries",
            self.slots.slots_total(),
            new_slots.slots_total(),
            self.len()
        );
        let old_slots = mem::replace(&mut self.slots, new_slots);
        for slot in old_slots.into_slots() {
            if let MapSlot::Set { key, value } = slot {
                Self::place(&mut self.slots, key, value);
            }
        }
    }

    /// Make room for at least `min_entries` entries without further growth
    pub fn reserve(&mut self, min_entries: usize) {
        if min_entries > self.slots.slots_usable() {
            self.realloc_and_reinsert(min_entries);
        }
    }

    /// Single-probe access to the slot of `key`, growing the table if needed
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, A> {
        self.ensure_can_add();
        match self.probe_for_insert(&key) {
            InsertProbe::Occupied(index) => Entry::Occupied(OccupiedEntry {
                slots: &mut self.slots,
                index,
            }),
            InsertProbe::Vacant { index, reuses_dummy } => Entry::Vacant(VacantEntry {
                slots: &mut self.slots,
                key,
                index,
                reuses_dummy,
            }),
        }
    }

    /// Insert a key that is known to be absent
    ///
    /// The absence is only checked in debug builds.
    pub fn add_new(&mut self, key: K, value: V) {
        debug_assert!(!self.contains(&key), "add_new() with a key already in the Map");
        self.ensure_can_add();
        Self::place(&mut self.slots, key, value);
        self.slots.update_empty_to_set();
    }

    /// Insert if `key` is absent; returns true if the entry was added
    pub fn add(&mut self, key: K, value: V) -> bool {
        match self.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(value);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Insert or overwrite; returns true if the key was new
    pub fn add_override(&mut self, key: K, value: V) -> bool {
        match self.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(value);
                true
            }
            Entry::Occupied(mut entry) => {
                entry.insert(value);
                false
            }
        }
    }

    /// Call `create` on a vacant entry or `modify` on the existing value
    ///
    /// Both callbacks return the same type, which becomes the result.
    ///
    /// ```rust
    /// use probekit::Map;
    ///
    /// let mut counts: Map<&str, u32> = Map::new();
    /// for word in ["a", "b", "a"] {
    ///     counts.add_or_modify(word, |entry| { entry.insert(1); }, |count| *count += 1);
    /// }
    /// assert_eq!(*counts.lookup("a"), 2);
    /// ```
    pub fn add_or_modify<R, C, M>(&mut self, key: K, create: C, modify: M) -> R
    where
        C: FnOnce(VacantEntry<'_, K, V, A>) -> R,
        M: FnOnce(&mut V) -> R,
    {
        match self.entry(key) {
            Entry::Vacant(entry) => create(entry),
            Entry::Occupied(entry) => modify(entry.into_mut()),
        }
    }

    /// Value of `key`, created with `create` first if absent
    pub fn lookup_or_add<F>(&mut self, key: K, create: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        self.entry(key).or_insert_with(create)
    }

    /// Value of `key`, default-constructed first if absent
    pub fn lookup_or_add_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }

    /// Returns true if `key` is present
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Value of `key`, or `None`
    pub fn lookup_ptr<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        let index = self.find(key)?;
        Some(self.value_at(index))
    }

    /// Mutable value of `key`, or `None`
    pub fn lookup_ptr_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        let index = self.find(key)?;
        Some(self.value_at_mut(index))
    }

    /// Value of `key`
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent.
    pub fn lookup<Q>(&self, key: &Q) -> &V
    where
        K: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        match self.find(key) {
            Some(index) => self.value_at(index),
            None => panic!("lookup() of a key that is not in the Map"),
        }
    }

    /// Mutable value of `key`
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent.
    pub fn lookup_mut<Q>(&mut self, key: &Q) -> &mut V
    where
        K: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        match self.find(key) {
            Some(index) => self.value_at_mut(index),
            None => panic!("lookup_mut() of a key that is not in the Map"),
        }
    }

    /// Value of `key` as a `Result`
    pub fn try_lookup<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        self.lookup_ptr(key)
            .ok_or_else(|| ProbeError::key_not_found(format!("Map with {} entries", self.len())))
    }

    /// Copy of the value of `key`, or `default`
    pub fn lookup_default<Q>(&self, key: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
        V: Clone,
    {
        self.lookup_ptr(key).cloned().unwrap_or(default)
    }

    /// Remove `key` and return its value, or `None` if absent
    pub fn pop_try<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        let index = self.find(key)?;
        let slot = mem::replace(&mut self.slots.slots_mut()[index], MapSlot::Dummy);
        self.slots.update_set_to_dummy();
        match slot {
            MapSlot::Set { value, .. } => Some(value),
            _ => unreachable!("slot {} is not set", index),
        }
    }

    /// Remove `key` and return its value
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent.
    pub fn pop<Q>(&mut self, key: &Q) -> V
    where
        K: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        match self.pop_try(key) {
            Some(value) => value,
            None => panic!("pop() of a key that is not in the Map"),
        }
    }

    /// Remove `key`
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent.
    pub fn remove<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        drop(self.pop(key));
    }

    /// Remove `key` if present; returns true if an entry was removed
    pub fn discard<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        self.pop_try(key).is_some()
    }

    /// Log occupancy and probe statistics under `name`
    pub fn log_stats(&self, name: &str) {
        let stats = self.slots.stats(|slot| match slot {
            MapSlot::Set { key, .. } => key.default_hash(),
            _ => 0,
        });
        log::debug!(
            "Map '{}': {}, {} bytes per slot, {} bytes total",
            name,
            stats,
            mem::size_of::<MapSlot<K, V>>(),
            self.size_in_bytes()
        );
    }
}

/// View into a single slot of a [`Map`]
pub enum Entry<'a, K, V, A: Allocator> {
    /// The key is absent
    Vacant(VacantEntry<'a, K, V, A>),
    /// The key is present
    Occupied(OccupiedEntry<'a, K, V, A>),
}

impl<'a, K, V, A: Allocator> Entry<'a, K, V, A> {
    /// Value of the entry, inserting `default` if vacant
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Vacant(entry) => entry.insert(default),
            Entry::Occupied(entry) => entry.into_mut(),
        }
    }

    /// Value of the entry, inserting the result of `create` if vacant
    pub fn or_insert_with<F: FnOnce() -> V>(self, create: F) -> &'a mut V {
        match self {
            Entry::Vacant(entry) => entry.insert(create()),
            Entry::Occupied(entry) => entry.into_mut(),
        }
    }

    /// Value of the entry, inserting `V::default()` if vacant
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }

    /// Modify the value if the entry is occupied
    pub fn and_modify<F: FnOnce(&mut V)>(self, modify: F) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                modify(entry.get_mut());
                Entry::Occupied(entry)
            }
            vacant => vacant,
        }
    }
}

/// Slot where an absent key will be stored
pub struct VacantEntry<'a, K, V, A: Allocator> {
    slots: &'a mut Slots<K, V, A>,
    key: K,
    index: usize,
    reuses_dummy: bool,
}

impl<'a, K, V, A: Allocator> VacantEntry<'a, K, V, A> {
    /// The key that would be inserted
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Give the key back without inserting
    pub fn into_key(self) -> K {
        self.key
    }

    /// Store `value` and return a reference to it
    pub fn insert(self, value: V) -> &'a mut V {
        let slots = self.slots;
        if self.reuses_dummy {
            slots.update_dummy_to_set();
        } else {
            slots.update_empty_to_set();
        }
        let slot = &mut slots.slots_mut()[self.index];
        *slot = MapSlot::Set { key: self.key, value };
        match slot {
            MapSlot::Set { value, .. } => value,
            _ => unreachable!(),
        }
    }
}

/// Slot holding a present key
pub struct OccupiedEntry<'a, K, V, A: Allocator> {
    slots: &'a mut Slots<K, V, A>,
    index: usize,
}

impl<'a, K, V, A: Allocator> OccupiedEntry<'a, K, V, A> {
    /// The stored key
    pub fn key(&self) -> &K {
        match &self.slots.slots()[self.index] {
            MapSlot::Set { key, .. } => key,
            _ => unreachable!(),
        }
    }

    /// The stored value
    pub fn get(&self) -> &V {
        match &self.slots.slots()[self.index] {
            MapSlot::Set { value, .. } => value,
            _ => unreachable!(),
        }
    }

    /// The stored value, mutably
    pub fn get_mut(&mut self) -> &mut V {
        match &mut self.slots.slots_mut()[self.index] {
            MapSlot::Set { value, .. } => value,
            _ => unreachable!(),
        }
    }

    /// The stored value with the lifetime of the map borrow
    pub fn into_mut(self) -> &'a mut V {
        let slots = self.slots;
        match &mut slots.slots_mut()[self.index] {
            MapSlot::Set { value, .. } => value,
            _ => unreachable!(),
        }
    }

    /// Replace the value, returning the old one
    pub fn insert(&mut self, value: V) -> V {
        mem::replace(self.get_mut(), value)
    }

    /// Remove the entry, leaving a tombstone
    pub fn remove(self) -> V {
        let slot = mem::replace(&mut self.slots.slots_mut()[self.index], MapSlot::Dummy);
        self.slots.update_set_to_dummy();
        match slot {
            MapSlot::Set { value, .. } => value,
            _ => unreachable!(),
        }
    }
}

/// Iterator over the entries of a [`Map`]
pub struct Items<'a, K, V> {
    slots: std::slice::Iter<'a, MapSlot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Items<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let MapSlot::Set { key, value } = slot {
                self.remaining -= 1;
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Items<'a, K, V> {}

impl<'a, K, V> Clone for Items<'a, K, V> {
    fn clone(&self) -> Self {
        Items {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

/// Iterator over the keys of a [`Map`]
pub struct Keys<'a, K, V> {
    items: Items<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.items.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

/// Iterator over the values of a [`Map`]
pub struct Values<'a, K, V> {
    items: Items<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.items.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

/// Iterator over mutable references to the values of a [`Map`]
pub struct ValuesMut<'a, K, V> {
    slots: std::slice::IterMut<'a, MapSlot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        for slot in self.slots.by_ref() {
            if let MapSlot::Set { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V, A: Allocator> IntoIterator for &'a Map<K, V, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = Items<'a, K, V>;

    fn into_iter(self) -> Items<'a, K, V> {
        self.items()
    }
}

impl<K, V, A: Allocator> Default for Map<K, V, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<K: Clone, V: Clone, A: Allocator> Clone for Map<K, V, A> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, A: Allocator> fmt::Debug for Map<K, V, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.items()).finish()
    }
}

impl<K, V, A> PartialEq for Map<K, V, A>
where
    K: DefaultHash + PartialEq,
    V: PartialEq,
    A: Allocator,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .items()
                .all(|(key, value)| other.lookup_ptr(key) == Some(value))
    }
}

impl<K, V, A> Extend<(K, V)> for Map<K, V, A>
where
    K: DefaultHash + PartialEq,
    A: Allocator,
{
    /// Later pairs override earlier pairs with the same key.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve(self.len().saturating_add(lower));
        for (key, value) in iter {
            self.add_override(key, value);
        }
    }
}

impl<K, V, A> FromIterator<(K, V)> for Map<K, V, A>
where
    K: DefaultHash + PartialEq,
    A: Allocator,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}
