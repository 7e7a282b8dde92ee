//! Open-addressing slot array
//!
//! [`OpenAddressingArray`] owns a power-of-two array of [`SlotBundle`]s and the
//! occupancy counters of the table built on top of it. It never inspects a slot:
//! the containers that embed it decide the status of every slot and report each
//! transition through the three `update_*` methods.
//!
//! Probing is also left to the containers. They walk the table with a
//! [`ProbeSequence`], the perturbation scheme known from CPython's dict, which
//! scans the sub-slots of one bundle linearly before jumping to the next bucket.
//!
//! The maximum load factor is fixed at 50%: `slots_usable = slots_total / 2`.
//! Dummy slots count as used until the next growth, which rebuilds the table by
//! reinserting every live slot and therefore drops all tombstones.

use crate::containers::Vector;
use crate::error::{ProbeError, Result};
use crate::memory::{Allocator, GuardedAllocator};
use std::fmt;
use std::slice;

/// Number of slots packed into one bundle
pub const SLOTS_PER_ITEM: usize = 4;

/// Fixed group of slots allocated as one unit
#[repr(transparent)]
#[derive(Clone)]
pub struct SlotBundle<S> {
    slots: [S; SLOTS_PER_ITEM],
}

impl<S: Default> Default for SlotBundle<S> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| S::default()),
        }
    }
}

/// Logical state of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Never used since the last growth; terminates probing
    Empty,
    /// Holds a live entry
    Set,
    /// Held an entry that was removed; probing continues past it
    Dummy,
}

/// Slot types that can report their state
///
/// Used for statistics and for cross-checking the occupancy counters.
pub trait SlotStatus {
    /// Current state of the slot
    fn status(&self) -> SlotState;
}

/// Counters gathered by [`OpenAddressingArray::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TableStats {
    /// Live entries
    pub slots_set: usize,
    /// Tombstones
    pub slots_dummy: usize,
    /// Slots the table may fill before growing
    pub slots_usable: usize,
    /// All slots
    pub slots_total: usize,
    /// Average number of slots visited to find each live entry
    pub average_collisions: f64,
}

impl fmt::Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} set, {} dummy, {}/{} usable/total, load {:.1}%, {:.2} avg collisions",
            self.slots_set,
            self.slots_dummy,
            self.slots_usable,
            self.slots_total,
            if self.slots_total == 0 {
                0.0
            } else {
                100.0 * self.slots_set as f64 / self.slots_total as f64
            },
            self.average_collisions
        )
    }
}

/// Power-of-two slot array with occupancy bookkeeping
///
/// `ITEMS_INLINE` bundles are stored inside the object, so small tables need no
/// allocation.
#[derive(Clone)]
pub struct OpenAddressingArray<S, const ITEMS_INLINE: usize = 1, A: Allocator = GuardedAllocator> {
    items: Vector<SlotBundle<S>, ITEMS_INLINE, A>,
    item_exponent: u8,
    slots_total: usize,
    slots_set_or_dummy: usize,
    slots_dummy: usize,
    slots_usable: usize,
    slot_mask: usize,
}

impl<S: Default, const ITEMS_INLINE: usize, A: Allocator> OpenAddressingArray<S, ITEMS_INLINE, A> {
    /// Smallest table: one bundle
    pub fn new() -> Self {
        Self::with_exponent_in(0, A::default())
    }

    /// Smallest table with an explicit allocator
    pub fn new_in(allocator: A) -> Self {
        Self::with_exponent_in(0, allocator)
    }

    fn with_exponent_in(item_exponent: u8, allocator: A) -> Self {
        let item_amount = 1usize << item_exponent;
        let slots_total = item_amount * SLOTS_PER_ITEM;

        let mut items = Vector::new_in(allocator);
        items.reserve(item_amount);
        items.extend((0..item_amount).map(|_| SlotBundle::default()));

        Self {
            items,
            item_exponent,
            slots_total,
            slots_set_or_dummy: 0,
            slots_dummy: 0,
            slots_usable: slots_total / 2,
            slot_mask: slots_total - 1,
        }
    }

    /// Fresh, all-empty table with room for at least `min_usable_slots` entries
    ///
    /// `slots_set_or_dummy` of the result starts at the number of live entries
    /// of `self`, so that the caller can move those entries over without
    /// reporting each one.
    pub fn init_reserved(&self, min_usable_slots: usize) -> Self {
        let min_total_slots = min_usable_slots.saturating_mul(2).max(SLOTS_PER_ITEM);
        let min_items = (min_total_slots + SLOTS_PER_ITEM - 1) / SLOTS_PER_ITEM;
        let item_exponent = log2_ceil(min_items);

        let mut table = Self::with_exponent_in(item_exponent, self.items.allocator().clone());
        table.slots_set_or_dummy = self.slots_set();
        debug_assert!(table.slots_set_or_dummy <= table.slots_usable);
        table
    }
}

impl<S, const ITEMS_INLINE: usize, A: Allocator> OpenAddressingArray<S, ITEMS_INLINE, A> {
    /// Base-two logarithm of the bundle count
    #[inline]
    pub fn item_exponent(&self) -> u8 {
        self.item_exponent
    }

    /// Total number of slots, always a power of two
    #[inline]
    pub fn slots_total(&self) -> usize {
        self.slots_total
    }

    /// `slots_total - 1`; folds a hash into a slot index
    #[inline]
    pub fn slot_mask(&self) -> usize {
        self.slot_mask
    }

    /// Number of slots the table may fill before it has to grow
    #[inline]
    pub fn slots_usable(&self) -> usize {
        self.slots_usable
    }

    /// Number of live entries
    #[inline]
    pub fn slots_set(&self) -> usize {
        self.slots_set_or_dummy - self.slots_dummy
    }

    /// Number of tombstones
    #[inline]
    pub fn slots_dummy(&self) -> usize {
        self.slots_dummy
    }

    /// Live entries plus tombstones
    #[inline]
    pub fn slots_set_or_dummy(&self) -> usize {
        self.slots_set_or_dummy
    }

    /// Whether the next insertion has to grow the table first
    #[inline]
    pub fn should_grow(&self) -> bool {
        self.slots_set_or_dummy >= self.slots_usable
    }

    /// Record an Empty slot becoming Set
    #[inline]
    pub fn update_empty_to_set(&mut self) {
        self.slots_set_or_dummy += 1;
    }

    /// Record a Set slot becoming Dummy
    #[inline]
    pub fn update_set_to_dummy(&mut self) {
        self.slots_dummy += 1;
    }

    /// Record a Dummy slot becoming Set
    #[inline]
    pub fn update_dummy_to_set(&mut self) {
        debug_assert!(self.slots_dummy > 0, "no dummy slot to reuse");
        self.slots_dummy -= 1;
    }

    /// All slots as one flat slice
    #[inline]
    pub fn slots(&self) -> &[S] {
        let items = self.items.as_slice();
        // SAFETY: `SlotBundle` is a transparent wrapper around `[S; SLOTS_PER_ITEM]`,
        // so consecutive bundles are consecutive slots.
        unsafe { slice::from_raw_parts(items.as_ptr().cast::<S>(), items.len() * SLOTS_PER_ITEM) }
    }

    /// All slots as one flat mutable slice
    #[inline]
    pub fn slots_mut(&mut self) -> &mut [S] {
        let items = self.items.as_mut_slice();
        let len = items.len() * SLOTS_PER_ITEM;
        // SAFETY: see `slots`.
        unsafe { slice::from_raw_parts_mut(items.as_mut_ptr().cast::<S>(), len) }
    }

    /// Consume the table, yielding every slot
    pub fn into_slots(self) -> impl Iterator<Item = S> {
        self.items.into_iter().flat_map(|bundle| bundle.slots)
    }

    /// Allocator of the bundle storage
    #[inline]
    pub fn allocator(&self) -> &A {
        self.items.allocator()
    }

    /// Bytes occupied by the slot storage
    pub fn size_in_bytes(&self) -> usize {
        self.slots_total * std::mem::size_of::<S>()
    }
}

impl<S: SlotStatus, const ITEMS_INLINE: usize, A: Allocator> OpenAddressingArray<S, ITEMS_INLINE, A> {
    /// Recount the slot states and compare them with the counters
    pub fn validate(&self) -> Result<()> {
        let (mut set, mut dummy) = (0usize, 0usize);
        for slot in self.slots() {
            match slot.status() {
                SlotState::Set => set += 1,
                SlotState::Dummy => dummy += 1,
                SlotState::Empty => {}
            }
        }
        if set != self.slots_set() || dummy != self.slots_dummy {
            return Err(ProbeError::invalid_data(format!(
                "slot counters out of sync: counted {} set / {} dummy, tracked {} set / {} dummy",
                set,
                dummy,
                self.slots_set(),
                self.slots_dummy
            )));
        }
        if self.slots_set_or_dummy > self.slots_usable {
            return Err(ProbeError::invalid_data(format!(
                "{} used slots exceed the usable {}",
                self.slots_set_or_dummy, self.slots_usable
            )));
        }
        Ok(())
    }

    /// Occupancy counters plus the average probe length of live entries
    ///
    /// `hash_of_slot` returns the hash of a Set slot; the probe length of each
    /// entry is measured by replaying its probe sequence.
    pub fn stats<F>(&self, hash_of_slot: F) -> TableStats
    where
        F: Fn(&S) -> u32,
    {
        let slots = self.slots();
        let mut collisions = 0usize;
        for (index, slot) in slots.iter().enumerate() {
            if slot.status() != SlotState::Set {
                continue;
            }
            let probe = ProbeSequence::new(hash_of_slot(slot), self.slot_mask);
            collisions += probe.take_while(|&visited| visited != index).count();
        }
        let slots_set = self.slots_set();
        TableStats {
            slots_set,
            slots_dummy: self.slots_dummy,
            slots_usable: self.slots_usable,
            slots_total: self.slots_total,
            average_collisions: if slots_set == 0 {
                0.0
            } else {
                collisions as f64 / slots_set as f64
            },
        }
    }
}

impl<S: Default, const ITEMS_INLINE: usize, A: Allocator> Default for OpenAddressingArray<S, ITEMS_INLINE, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, const ITEMS_INLINE: usize, A: Allocator> fmt::Debug for OpenAddressingArray<S, ITEMS_INLINE, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAddressingArray")
            .field("item_exponent", &self.item_exponent)
            .field("slots_total", &self.slots_total)
            .field("slots_usable", &self.slots_usable)
            .field("slots_set", &self.slots_set())
            .field("slots_dummy", &self.slots_dummy)
            .finish()
    }
}

/// Smallest `e` with `2^e >= value`
#[inline]
fn log2_ceil(value: usize) -> u8 {
    value.max(1).next_power_of_two().trailing_zeros() as u8
}

/// Infinite sequence of slot indices for one hash
///
/// Starting at `hash & slot_mask`, the sequence covers the bundle containing
/// that slot (wrapping within the bundle), then moves to the next bucket with
/// `perturb >>= 5; hash = hash * 5 + 1 + perturb`. Once `perturb` reaches zero
/// the recurrence is a full-period generator modulo any power of two, so every
/// bucket is eventually visited.
#[derive(Debug, Clone)]
pub struct ProbeSequence {
    hash: u32,
    perturb: u32,
    slot_mask: usize,
    offset: usize,
}

impl ProbeSequence {
    /// Probe sequence of `hash` in a table with the given mask
    #[inline]
    pub fn new(hash: u32, slot_mask: usize) -> Self {
        Self {
            hash,
            perturb: hash,
            slot_mask,
            offset: 0,
        }
    }

    /// Slot the sequence starts at
    #[inline]
    pub fn first_slot(&self) -> usize {
        self.hash as usize & self.slot_mask
    }
}

impl Iterator for ProbeSequence {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.offset == SLOTS_PER_ITEM {
            self.perturb >>= 5;
            self.hash = self
                .hash
                .wrapping_mul(5)
                .wrapping_add(1)
                .wrapping_add(self.perturb);
            self.offset = 0;
        }
        let start = self.hash as usize & self.slot_mask;
        let bundle_start = start & !(SLOTS_PER_ITEM - 1);
        let index = bundle_start + ((start + self.offset) & (SLOTS_PER_ITEM - 1));
        self.offset += 1;
        Some(index)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
