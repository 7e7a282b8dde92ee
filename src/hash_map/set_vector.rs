//! SetVector: hash set that remembers insertion order
//!
//! The elements live in a [`Vector`] in the order they were added; the hash
//! table only stores indices into it. Iteration walks the vector and never
//! touches the table.
//!
//! Removal swaps the last element into the freed position, so the order is
//! preserved for every element except the one that was moved.

use super::hash_functions::DefaultHash;
use super::open_addressing::{OpenAddressingArray, ProbeSequence, SlotState, SlotStatus};
use crate::containers::{ArrayRef, Vector};
use crate::memory::{Allocator, GuardedAllocator};
use std::borrow::Borrow;
use std::fmt;
use std::mem;
use std::ops::Index;

/// Table slot: empty, tombstone or the index of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum IndexSlot {
    #[default]
    Empty,
    Dummy,
    Set(usize),
}

impl SlotStatus for IndexSlot {
    #[inline]
    fn status(&self) -> SlotState {
        match self {
            IndexSlot::Empty => SlotState::Empty,
            IndexSlot::Dummy => SlotState::Dummy,
            IndexSlot::Set(_) => SlotState::Set,
        }
    }
}

/// Ordered set with O(1) add, remove and membership tests
///
/// ```rust
/// use probekit::SetVector;
///
/// let set: SetVector<i32> = [1, 3, 3, 2, 1, 5].into_iter().collect();
/// assert_eq!(set.len(), 4);
/// assert_eq!(set.as_slice(), &[1, 3, 2, 5]);
/// assert_eq!(set.index_of(&2), 2);
/// ```
pub struct SetVector<T, A: Allocator = GuardedAllocator> {
    slots: OpenAddressingArray<IndexSlot, 1, A>,
    keys: Vector<T, 4, A>,
}

impl<T> SetVector<T> {
    /// Create an empty set
    pub fn new() -> Self {
        Self::new_in(GuardedAllocator)
    }
}

impl<T, A: Allocator> SetVector<T, A> {
    /// Create an empty set that allocates through `allocator`
    pub fn new_in(allocator: A) -> Self {
        Self {
            slots: OpenAddressingArray::new_in(allocator.clone()),
            keys: Vector::new_in(allocator),
        }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the set holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Elements in insertion order
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.keys.as_slice()
    }

    /// View of the elements in insertion order
    #[inline]
    pub fn as_view(&self) -> ArrayRef<'_, T> {
        self.keys.as_view()
    }

    /// Iterate in insertion order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.keys.iter()
    }

    /// Number of elements the current table accepts before growing
    #[inline]
    pub fn slots_usable(&self) -> usize {
        self.slots.slots_usable()
    }

    /// Remove every element and return to the smallest table
    pub fn clear(&mut self) {
        self.slots = OpenAddressingArray::new_in(self.slots.allocator().clone());
        self.keys.clear();
    }

    /// Verify that the table and the element vector agree
    pub fn validate(&self) -> crate::error::Result<()> {
        self.slots.validate()?;
        if self.slots.slots_set() != self.keys.len() {
            return Err(crate::error::ProbeError::invalid_data(format!(
                "{} set slots for {} elements",
                self.slots.slots_set(),
                self.keys.len()
            )));
        }
        Ok(())
    }
}

impl<T, A> SetVector<T, A>
where
    T: DefaultHash + PartialEq,
    A: Allocator,
{
    /// Slot index referring to an element equal to `key`
    fn find_slot<Q>(&self, key: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        let slots = self.slots.slots();
        for slot_index in ProbeSequence::new(key.default_hash(), self.slots.slot_mask()) {
            match slots[slot_index] {
                IndexSlot::Empty => return None,
                IndexSlot::Set(index) if <T as Borrow<Q>>::borrow(&self.keys[index]) == key => {
                    return Some(slot_index)
                }
                _ => {}
            }
        }
        unreachable!("probe sequence ended")
    }

    /// Slot index holding exactly `index`, probed with `hash`
    fn find_slot_of_index(&self, hash: u32, index: usize) -> usize {
        let slots = self.slots.slots();
        for slot_index in ProbeSequence::new(hash, self.slots.slot_mask()) {
            match slots[slot_index] {
                IndexSlot::Set(stored) if stored == index => return slot_index,
                IndexSlot::Empty => panic!("element {} is missing from the SetVector table", index),
                _ => {}
            }
        }
        unreachable!("probe sequence ended")
    }

    /// First empty slot on the probe path of `hash`
    fn first_empty_slot(slots: &OpenAddressingArray<IndexSlot, 1, A>, hash: u32) -> usize {
        let table = slots.slots();
        for slot_index in ProbeSequence::new(hash, slots.slot_mask()) {
            if table[slot_index] == IndexSlot::Empty {
                return slot_index;
            }
        }
        unreachable!("probe sequence ended")
    }

    fn ensure_can_add(&mut self) {
        if self.slots.should_grow() {
            self.realloc_and_reinsert(self.len() + 1);
        }
    }

    /// Rebuild the table; the elements themselves stay where they are
    fn realloc_and_reinsert(&mut self, min_usable_slots: usize) {
        let mut new_slots = self.slots.init_reserved(min_usable_slots);
        log::trace!(
            "SetVector: growing from {} to {} slots with {} elements",
            self.slots.slots_total(),
            new_slots.slots_total(),
            self.len()
        );
        for (index, key) in self.keys.iter().enumerate() {
            let slot_index = Self::first_empty_slot(&new_slots, key.default_hash());
            new_slots.slots_mut()[slot_index] = IndexSlot::Set(index);
        }
        self.slots = new_slots;
    }

    /// Make room for at least `min_elements` elements without further growth
    pub fn reserve(&mut self, min_elements: usize) {
        if min_elements > self.slots.slots_usable() {
            self.realloc_and_reinsert(min_elements);
        }
        self.keys.reserve(min_elements);
    }

    /// Add an element that is known to be absent
    ///
    /// The absence is only checked in debug builds.
    pub fn add_new(&mut self, key: T) {
        debug_assert!(!self.contains(&key), "add_new() with an element already in the SetVector");
        self.ensure_can_add();
        let slot_index = Self::first_empty_slot(&self.slots, key.default_hash());
        self.slots.slots_mut()[slot_index] = IndexSlot::Set(self.keys.len());
        self.slots.update_empty_to_set();
        self.keys.append(key);
    }

    /// Add an element if absent; returns true if it was added
    pub fn add(&mut self, key: T) -> bool {
        self.ensure_can_add();
        let hash = key.default_hash();
        let mut first_dummy = None;
        let mut target = None;
        {
            let slots = self.slots.slots();
            for slot_index in ProbeSequence::new(hash, self.slots.slot_mask()) {
                match slots[slot_index] {
                    IndexSlot::Empty => {
                        target = Some(slot_index);
                        break;
                    }
                    IndexSlot::Set(index) => {
                        if self.keys[index] == key {
                            break;
                        }
                    }
                    IndexSlot::Dummy => {
                        if first_dummy.is_none() {
                            first_dummy = Some(slot_index);
                        }
                    }
                }
            }
        }
        let Some(empty_slot) = target else {
            return false;
        };
        let slot_index = match first_dummy {
            Some(dummy) => {
                self.slots.update_dummy_to_set();
                dummy
            }
            None => {
                self.slots.update_empty_to_set();
                empty_slot
            }
        };
        self.slots.slots_mut()[slot_index] = IndexSlot::Set(self.keys.len());
        self.keys.append(key);
        true
    }

    /// Add every element of `keys` that is not yet present
    pub fn add_multiple(&mut self, keys: ArrayRef<'_, T>)
    where
        T: Clone,
    {
        for key in keys.iter() {
            self.add(key.clone());
        }
    }

    /// Add elements that are all known to be absent
    pub fn add_multiple_new(&mut self, keys: ArrayRef<'_, T>)
    where
        T: Clone,
    {
        for key in keys.iter() {
            self.add_new(key.clone());
        }
    }

    /// Returns true if an equal element is present
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        self.find_slot(key).is_some()
    }

    /// Position of `key` in insertion order, or `None`
    pub fn index_of_try<Q>(&self, key: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        match self.slots.slots()[self.find_slot(key)?] {
            IndexSlot::Set(index) => Some(index),
            _ => unreachable!(),
        }
    }

    /// Position of `key` in insertion order
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent.
    pub fn index_of<Q>(&self, key: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        match self.index_of_try(key) {
            Some(index) => index,
            None => panic!("index_of() of an element that is not in the SetVector"),
        }
    }

    /// Remove `key` if present; returns true if it was removed
    ///
    /// The last element takes the place of the removed one.
    pub fn discard<Q>(&mut self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        let Some(slot_index) = self.find_slot(key) else {
            return false;
        };
        let index = match mem::replace(&mut self.slots.slots_mut()[slot_index], IndexSlot::Dummy) {
            IndexSlot::Set(index) => index,
            _ => unreachable!(),
        };
        self.slots.update_set_to_dummy();

        let last = self.keys.len() - 1;
        if index != last {
            // The last element moves into `index`; its slot has to follow.
            let moved_hash = self.keys[last].default_hash();
            let moved_slot = self.find_slot_of_index(moved_hash, last);
            self.slots.slots_mut()[moved_slot] = IndexSlot::Set(index);
        }
        self.keys.remove_and_reorder(index);
        true
    }

    /// Remove `key`
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent.
    pub fn remove<Q>(&mut self, key: &Q)
    where
        T: Borrow<Q>,
        Q: DefaultHash + PartialEq + ?Sized,
    {
        if !self.discard(key) {
            panic!("remove() of an element that is not in the SetVector");
        }
    }

    /// Remove and return the most recently added element
    ///
    /// # Panics
    ///
    /// Panics if the set is empty.
    pub fn pop(&mut self) -> T {
        assert!(!self.is_empty(), "pop() on an empty SetVector");
        let last = self.keys.len() - 1;
        let slot_index = self.find_slot_of_index(self.keys[last].default_hash(), last);
        self.slots.slots_mut()[slot_index] = IndexSlot::Dummy;
        self.slots.update_set_to_dummy();
        self.keys.pop_last()
    }

    /// Log occupancy and probe statistics under `name`
    pub fn log_stats(&self, name: &str) {
        let keys = &self.keys;
        let stats = self.slots.stats(|slot| match slot {
            IndexSlot::Set(index) => keys[*index].default_hash(),
            _ => 0,
        });
        log::debug!("SetVector '{}': {}, {} bytes of slots", name, stats, self.slots.size_in_bytes());
    }
}

impl<T, A: Allocator> Index<usize> for SetVector<T, A> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.keys[index]
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a SetVector<T, A> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, A: Allocator> Default for SetVector<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: Clone, A: Allocator> Clone for SetVector<T, A> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            keys: self.keys.clone(),
        }
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for SetVector<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys.iter()).finish()
    }
}

impl<T, A> Extend<T> for SetVector<T, A>
where
    T: DefaultHash + PartialEq,
    A: Allocator,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.add(key);
        }
    }
}

impl<T, A> FromIterator<T> for SetVector<T, A>
where
    T: DefaultHash + PartialEq,
    A: Allocator,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}
