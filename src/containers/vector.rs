//! Vector: growable array with inline storage
//!
//! `Vector<T, N, A>` keeps up to `N` elements inside the object itself and only
//! touches its [`Allocator`] once the size exceeds `N`. Growth doubles the
//! capacity (rounded up to a power of two), so appending is amortized O(1).
//!
//! The element pointer is never cached: it is derived from the heap buffer when
//! one exists and from the inline buffer otherwise. An inline-backed vector can
//! therefore be moved like any Rust value, and the move relocates its elements
//! without any allocator call.
//!
//! # Examples
//!
//! ```rust
//! use probekit::Vector;
//!
//! let mut vec: Vector<u32, 4> = Vector::new();
//! vec.extend_from_slice(&[1, 2, 3]);
//! assert!(vec.is_inline());
//! vec.append(4);
//! vec.append(5);
//! assert!(!vec.is_inline());
//! assert_eq!(vec.capacity(), 8);
//! ```

use super::index_range::IndexRange;
use super::views::{ArrayRef, MutableArrayRef};
use crate::memory::{Allocator, GuardedAllocator};
use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::ptr::{self, NonNull};
use std::slice;

/// Contiguous, resizable sequence with `N` elements of inline storage
pub struct Vector<T, const N: usize = 4, A: Allocator = GuardedAllocator> {
    heap: Option<NonNull<T>>,
    len: usize,
    capacity: usize,
    inline: [MaybeUninit<T>; N],
    allocator: A,
    _marker: PhantomData<T>,
}

#[cold]
#[inline(never)]
fn capacity_overflow() -> ! {
    panic!("Vector capacity overflow");
}

impl<T, const N: usize, A: Allocator> Vector<T, N, A> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    #[inline]
    const fn inline_capacity() -> usize {
        if Self::IS_ZST {
            usize::MAX
        } else {
            N
        }
    }

    /// Create an empty vector backed by its inline buffer
    #[inline]
    pub fn new() -> Self {
        Self::new_in(A::default())
    }

    /// Create an empty vector that allocates through `allocator`
    #[inline]
    pub fn new_in(allocator: A) -> Self {
        Self {
            heap: None,
            len: 0,
            capacity: Self::inline_capacity(),
            // SAFETY: an array of `MaybeUninit` needs no initialization.
            inline: unsafe { MaybeUninit::uninit().assume_init() },
            allocator,
            _marker: PhantomData,
        }
    }

    /// Create a vector of `size` default-constructed elements
    pub fn with_size(size: usize) -> Self
    where
        T: Default,
    {
        let mut vec = Self::new();
        vec.reserve(size);
        for _ in 0..size {
            // SAFETY: capacity was reserved above.
            unsafe { vec.append_unchecked(T::default()) };
        }
        vec
    }

    /// Create a vector of `size` copies of `value`
    pub fn from_elem(size: usize, value: T) -> Self
    where
        T: Clone,
    {
        let mut vec = Self::new();
        vec.reserve(size);
        for _ in 0..size {
            // SAFETY: capacity was reserved above.
            unsafe { vec.append_unchecked(value.clone()) };
        }
        vec
    }

    /// Create a vector holding copies of `values`
    pub fn from_slice(values: &[T]) -> Self
    where
        T: Clone,
    {
        let mut vec = Self::new();
        vec.extend_from_slice(values);
        vec
    }

    /// Move the elements of a vector with a different inline capacity
    ///
    /// A heap buffer is taken over as is. Inline elements are relocated into the
    /// inline buffer of the result when they fit and into a new heap buffer
    /// otherwise. `other` must use an allocator compatible with `A`.
    pub fn from_vector<const M: usize>(mut other: Vector<T, M, A>) -> Self {
        let mut result = Self::new_in(other.allocator.clone());
        match other.heap.take() {
            Some(buffer) => {
                result.heap = Some(buffer);
                result.capacity = other.capacity;
            }
            None => {
                result.grow(other.len);
                // SAFETY: `result` has room for `other.len` elements and the two
                // buffers belong to different objects.
                unsafe {
                    ptr::copy_nonoverlapping(other.data_ptr(), result.data_mut_ptr(), other.len);
                }
            }
        }
        result.len = other.len;
        other.len = 0;
        other.capacity = Vector::<T, M, A>::inline_capacity();
        result
    }

    /// Move all elements out, leaving `self` empty and inline
    #[inline]
    pub fn take(&mut self) -> Self {
        let allocator = self.allocator.clone();
        mem::replace(self, Self::new_in(allocator))
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the vector holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements that fit without reallocation
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if the elements live in the inline buffer
    #[inline]
    pub fn is_inline(&self) -> bool {
        self.heap.is_none()
    }

    /// The allocator used for heap buffers
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    #[inline]
    fn data_ptr(&self) -> *const T {
        match self.heap {
            Some(buffer) => buffer.as_ptr(),
            None => self.inline.as_ptr() as *const T,
        }
    }

    #[inline]
    fn data_mut_ptr(&mut self) -> *mut T {
        match self.heap {
            Some(buffer) => buffer.as_ptr(),
            None => self.inline.as_mut_ptr() as *mut T,
        }
    }

    /// The elements as a slice
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` elements are initialized.
        unsafe { slice::from_raw_parts(self.data_ptr(), self.len) }
    }

    /// The elements as a mutable slice
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len;
        // SAFETY: the first `len` elements are initialized.
        unsafe { slice::from_raw_parts_mut(self.data_mut_ptr(), len) }
    }

    /// Read-only view of the elements
    #[inline]
    pub fn as_view(&self) -> ArrayRef<'_, T> {
        ArrayRef::new(self.as_slice())
    }

    /// Mutable view of the elements
    #[inline]
    pub fn as_mut_view(&mut self) -> MutableArrayRef<'_, T> {
        MutableArrayRef::new(self.as_mut_slice())
    }

    /// All valid indices
    #[inline]
    pub fn index_range(&self) -> IndexRange {
        IndexRange::from_size(self.len)
    }

    /// Make room for at least `min_capacity` elements in total
    #[inline]
    pub fn reserve(&mut self, min_capacity: usize) {
        self.grow(min_capacity);
    }

    /// Grow the buffer to the next power of two at or above `min_capacity`
    ///
    /// Does nothing when the capacity already suffices.
    fn grow(&mut self, min_capacity: usize) {
        if min_capacity <= self.capacity {
            return;
        }
        let new_capacity = match min_capacity.checked_next_power_of_two() {
            Some(capacity) => capacity,
            None => capacity_overflow(),
        };
        self.realloc_exact(new_capacity);
    }

    /// Move the elements into a fresh heap buffer of exactly `new_capacity`
    fn realloc_exact(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity >= self.len);
        debug_assert!(!Self::IS_ZST);
        let bytes = match mem::size_of::<T>().checked_mul(new_capacity) {
            Some(bytes) => bytes,
            None => capacity_overflow(),
        };
        let new_buffer = self
            .allocator
            .allocate_aligned(bytes, mem::align_of::<T>(), "Vector::grow")
            .cast::<T>();

        // SAFETY: the new buffer holds `new_capacity >= len` elements and does not
        // overlap the old storage.
        unsafe {
            ptr::copy_nonoverlapping(self.data_ptr(), new_buffer.as_ptr(), self.len);
        }
        if let Some(old) = self.heap.take() {
            // SAFETY: the old buffer came from this allocator and its elements were
            // relocated above.
            unsafe { self.allocator.deallocate(old.cast()) };
        }
        self.heap = Some(new_buffer);
        self.capacity = new_capacity;
    }

    /// Append an element, doubling the capacity when full
    #[inline]
    pub fn append(&mut self, value: T) {
        if self.len == self.capacity {
            self.grow(std::cmp::max(self.len * 2, 1));
        }
        // SAFETY: the capacity check above guarantees room for one element.
        unsafe { self.append_unchecked(value) };
    }

    /// Append without a capacity check
    ///
    /// # Safety
    ///
    /// `len() < capacity()` must hold.
    #[inline]
    pub unsafe fn append_unchecked(&mut self, value: T) {
        debug_assert!(self.len < self.capacity);
        let len = self.len;
        // SAFETY: the caller guarantees the slot at `len` is within capacity.
        unsafe { ptr::write(self.data_mut_ptr().add(len), value) };
        self.len += 1;
    }

    /// Append copies of all `values`
    pub fn extend_from_slice(&mut self, values: &[T])
    where
        T: Clone,
    {
        self.reserve(self.len + values.len());
        for value in values {
            // SAFETY: capacity was reserved above.
            unsafe { self.append_unchecked(value.clone()) };
        }
    }

    /// Append the `values` not already contained, in order
    ///
    /// Linear search per value; meant for short vectors.
    pub fn extend_non_duplicates(&mut self, values: &[T])
    where
        T: Clone + PartialEq,
    {
        for value in values {
            if !self.as_slice().contains(value) {
                self.append(value.clone());
            }
        }
    }

    /// Overwrite every element with `value`
    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.as_mut_slice().fill(value);
    }

    /// Overwrite the elements at `indices` with `value`
    pub fn fill_indices(&mut self, indices: ArrayRef<'_, usize>, value: T)
    where
        T: Clone,
    {
        self.as_mut_view().fill_indices(indices, value);
    }

    /// Remove and return the last element
    ///
    /// # Panics
    ///
    /// Panics if the vector is empty.
    #[inline]
    pub fn pop_last(&mut self) -> T {
        assert!(self.len > 0, "pop_last() on an empty Vector");
        self.len -= 1;
        // SAFETY: the element at the old `len - 1` is initialized and is no longer
        // counted, so it is read exactly once.
        unsafe { ptr::read(self.data_ptr().add(self.len)) }
    }

    /// Drop the last element
    #[inline]
    pub fn remove_last(&mut self) {
        drop(self.pop_last());
    }

    /// Remove the element at `index` by moving the last element into its place
    ///
    /// O(1); the order of the remaining elements is not preserved.
    pub fn remove_and_reorder(&mut self, index: usize) -> T {
        assert!(index < self.len, "index {} out of range for Vector of length {}", index, self.len);
        let last = self.len - 1;
        self.as_mut_slice().swap(index, last);
        self.pop_last()
    }

    /// Remove the first element equal to `value` with [`Vector::remove_and_reorder`]
    ///
    /// # Panics
    ///
    /// Panics if no element equals `value`.
    pub fn remove_first_occurrence_and_reorder(&mut self, value: &T) -> T
    where
        T: PartialEq,
    {
        let index = self.first_index_of(value);
        self.remove_and_reorder(index)
    }

    /// Index of the first element equal to `value`, if any
    pub fn first_index_of_try(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.as_slice().iter().position(|element| element == value)
    }

    /// Index of the first element equal to `value`
    ///
    /// # Panics
    ///
    /// Panics if no element equals `value`.
    pub fn first_index_of(&self, value: &T) -> usize
    where
        T: PartialEq,
    {
        match self.first_index_of_try(value) {
            Some(index) => index,
            None => panic!("value is not contained in the Vector"),
        }
    }

    /// Drop all elements, keeping the allocated capacity
    pub fn clear(&mut self) {
        let elements: *mut [T] = self.as_mut_slice();
        // Zero the length first so a panicking destructor cannot cause a double drop.
        self.len = 0;
        // SAFETY: the elements were initialized and are no longer reachable.
        unsafe { ptr::drop_in_place(elements) };
    }

    /// Drop all elements and release the heap buffer
    pub fn clear_and_make_small(&mut self) {
        self.clear();
        if let Some(buffer) = self.heap.take() {
            // SAFETY: the buffer came from this allocator and holds no live elements.
            unsafe { self.allocator.deallocate(buffer.cast()) };
        }
        self.capacity = Self::inline_capacity();
    }

    /// Log size and storage of this vector under `name`
    pub fn log_stats(&self, name: &str) {
        log::debug!(
            "Vector '{}': {} elements, capacity {}, {} storage, {} bytes per element",
            name,
            self.len,
            self.capacity,
            if self.is_inline() { "inline" } else { "heap" },
            mem::size_of::<T>()
        );
    }
}

impl<T, const N: usize, A: Allocator> Drop for Vector<T, N, A> {
    fn drop(&mut self) {
        // SAFETY: the first `len` elements are initialized and dropped exactly once.
        unsafe { ptr::drop_in_place(self.as_mut_slice() as *mut [T]) };
        if let Some(buffer) = self.heap {
            // SAFETY: the heap buffer was allocated by `self.allocator`.
            unsafe { self.allocator.deallocate(buffer.cast()) };
        }
    }
}

impl<T, const N: usize, A: Allocator> Default for Vector<T, N, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize, A: Allocator> Deref for Vector<T, N, A> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize, A: Allocator> DerefMut for Vector<T, N, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, const N: usize, A: Allocator> Index<usize> for Vector<T, N, A> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T, const N: usize, A: Allocator> IndexMut<usize> for Vector<T, N, A> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<T: Clone, const N: usize, A: Allocator> Clone for Vector<T, N, A> {
    /// Copies into inline storage when possible, otherwise into a heap buffer of
    /// exactly `len()` elements.
    fn clone(&self) -> Self {
        let mut result = Self::new_in(self.allocator.clone());
        if self.len > result.capacity {
            result.realloc_exact(self.len);
        }
        for value in self.as_slice() {
            // SAFETY: capacity is at least `self.len`.
            unsafe { result.append_unchecked(value.clone()) };
        }
        result
    }
}

impl<T: fmt::Debug, const N: usize, A: Allocator> fmt::Debug for Vector<T, N, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice().iter()).finish()
    }
}

impl<T: PartialEq, const N: usize, A: Allocator> PartialEq for Vector<T, N, A> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, const N: usize, A: Allocator> Eq for Vector<T, N, A> {}

impl<T, const N: usize, A: Allocator> Extend<T> for Vector<T, N, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve(self.len.saturating_add(lower));
        for value in iter {
            self.append(value);
        }
    }
}

impl<T, const N: usize, A: Allocator> FromIterator<T> for Vector<T, N, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = Self::new();
        vec.extend(iter);
        vec
    }
}

impl<'a, T, const N: usize, A: Allocator> IntoIterator for &'a Vector<T, N, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, const N: usize, A: Allocator> IntoIterator for &'a mut Vector<T, N, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T, const N: usize, A: Allocator> IntoIterator for Vector<T, N, A> {
    type Item = T;
    type IntoIter = IntoIter<T, N, A>;

    fn into_iter(mut self) -> IntoIter<T, N, A> {
        let end = self.len;
        // The iterator owns the elements from here on.
        self.len = 0;
        IntoIter {
            vector: self,
            next: 0,
            end,
        }
    }
}

/// Owning iterator of a [`Vector`]
pub struct IntoIter<T, const N: usize, A: Allocator> {
    vector: Vector<T, N, A>,
    next: usize,
    end: usize,
}

impl<T, const N: usize, A: Allocator> Iterator for IntoIter<T, N, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.next == self.end {
            return None;
        }
        // SAFETY: elements in `next..end` are initialized and not yet moved out.
        let value = unsafe { ptr::read(self.vector.data_ptr().add(self.next)) };
        self.next += 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<T, const N: usize, A: Allocator> DoubleEndedIterator for IntoIter<T, N, A> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.next == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: see `next`.
        Some(unsafe { ptr::read(self.vector.data_ptr().add(self.end)) })
    }
}

impl<T, const N: usize, A: Allocator> ExactSizeIterator for IntoIter<T, N, A> {}

impl<T, const N: usize, A: Allocator> Drop for IntoIter<T, N, A> {
    fn drop(&mut self) {
        let remaining = self.end - self.next;
        // SAFETY: elements in `next..end` are still owned by the iterator.
        unsafe {
            let start = self.vector.data_mut_ptr().add(self.next);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(start, remaining));
        }
    }
}

impl<'a, T, const N: usize, A: Allocator> From<&'a Vector<T, N, A>> for ArrayRef<'a, T> {
    #[inline]
    fn from(vec: &'a Vector<T, N, A>) -> Self {
        vec.as_view()
    }
}

impl<'a, T, const N: usize, A: Allocator> From<&'a mut Vector<T, N, A>> for MutableArrayRef<'a, T> {
    #[inline]
    fn from(vec: &'a mut Vector<T, N, A>) -> Self {
        vec.as_mut_view()
    }
}

// SAFETY: a `Vector` owns its elements exclusively, like `Vec`.
unsafe impl<T: Send, const N: usize, A: Allocator + Send> Send for Vector<T, N, A> {}

// SAFETY: shared access only hands out `&T`.
unsafe impl<T: Sync, const N: usize, A: Allocator + Sync> Sync for Vector<T, N, A> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::RawAllocator;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_new_is_inline() {
        let vec: Vector<i32> = Vector::new();
        assert!(vec.is_empty());
        assert!(vec.is_inline());
        assert_eq!(vec.capacity(), 4);
    }

    #[test]
    fn test_append_and_growth() {
        let mut vec: Vector<u64, 4> = Vector::new();
        for i in 0..4 {
            vec.append(i);
        }
        assert!(vec.is_inline());
        vec.append(4);
        assert!(!vec.is_inline());
        assert_eq!(vec.capacity(), 8);
        for i in 5..9 {
            vec.append(i);
        }
        assert_eq!(vec.capacity(), 16);
        assert_eq!(vec.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_zero_inline_capacity() {
        let mut vec: Vector<u8, 0> = Vector::new();
        assert_eq!(vec.capacity(), 0);
        vec.append(7);
        assert_eq!(vec.capacity(), 1);
        vec.append(8);
        assert_eq!(vec.capacity(), 2);
        vec.append(9);
        assert_eq!(vec.capacity(), 4);
        assert_eq!(vec[2], 9);
    }

    #[test]
    fn test_constructors() {
        let defaults: Vector<i32> = Vector::with_size(3);
        assert_eq!(defaults.as_slice(), &[0, 0, 0]);

        let filled: Vector<&str, 2> = Vector::from_elem(5, "x");
        assert_eq!(filled.len(), 5);
        assert_eq!(filled.capacity(), 8);

        let copied: Vector<i32> = Vector::from_slice(&[3, 1, 2]);
        assert_eq!(copied.as_slice(), &[3, 1, 2]);

        let collected: Vector<i32> = (0..10).collect();
        assert_eq!(collected.len(), 10);
        assert_eq!(collected.capacity(), 16);
    }

    #[test]
    fn test_pop_and_remove() {
        let mut vec: Vector<i32> = Vector::from_slice(&[1, 2, 3, 4, 5]);
        assert_eq!(vec.pop_last(), 5);
        vec.remove_last();
        assert_eq!(vec.as_slice(), &[1, 2, 3]);

        assert_eq!(vec.remove_and_reorder(0), 1);
        assert_eq!(vec.as_slice(), &[3, 2]);

        assert_eq!(vec.remove_first_occurrence_and_reorder(&2), 2);
        assert_eq!(vec.as_slice(), &[3]);
    }

    #[test]
    #[should_panic(expected = "empty Vector")]
    fn test_pop_empty_panics() {
        let mut vec: Vector<i32> = Vector::new();
        vec.pop_last();
    }

    #[test]
    fn test_searching() {
        let vec: Vector<char> = Vector::from_slice(&['a', 'b', 'c', 'b']);
        assert_eq!(vec.first_index_of(&'b'), 1);
        assert_eq!(vec.first_index_of_try(&'z'), None);
        assert!(vec.contains(&'c'));
        assert_eq!(vec.as_view().count(&'b'), 2);
    }

    #[test]
    fn test_extend_non_duplicates() {
        let mut vec: Vector<i32> = Vector::from_slice(&[1, 2]);
        vec.extend_non_duplicates(&[2, 3, 3, 1, 4]);
        assert_eq!(vec.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_fill() {
        let mut vec: Vector<i32> = Vector::with_size(5);
        vec.fill(3);
        vec.fill_indices(ArrayRef::from(&[1, 3]), 8);
        assert_eq!(vec.as_slice(), &[3, 8, 3, 8, 3]);
    }

    #[test]
    fn test_clone_uses_exact_capacity() {
        let vec: Vector<i32, 2> = (0..5).collect();
        assert_eq!(vec.capacity(), 8);
        let copy = vec.clone();
        assert_eq!(copy, vec);
        assert_eq!(copy.capacity(), 5);

        let small: Vector<i32, 2> = Vector::from_slice(&[1]);
        assert!(small.clone().is_inline());
    }

    #[test]
    fn test_move_keeps_inline_elements() {
        let vec: Vector<String> = Vector::from_slice(&["a".to_string(), "b".to_string()]);
        let moved = vec;
        let boxed = Box::new(moved);
        assert_eq!(boxed[1], "b");
        assert!(boxed.is_inline());
    }

    #[test]
    fn test_from_vector() {
        let small: Vector<i32, 2> = Vector::from_slice(&[1, 2]);
        let larger: Vector<i32, 8> = Vector::from_vector(small);
        assert!(larger.is_inline());
        assert_eq!(larger.as_slice(), &[1, 2]);

        let inline: Vector<i32, 8> = Vector::from_slice(&[1, 2, 3, 4, 5]);
        let spilled: Vector<i32, 2> = Vector::from_vector(inline);
        assert!(!spilled.is_inline());
        assert_eq!(spilled.as_slice(), &[1, 2, 3, 4, 5]);

        let heap: Vector<i32, 2> = (0..10).collect();
        let ptr = heap.as_ptr();
        let stolen: Vector<i32, 4> = Vector::from_vector(heap);
        assert_eq!(stolen.as_ptr(), ptr);
        assert_eq!(stolen.len(), 10);
    }

    #[test]
    fn test_take_leaves_empty_inline() {
        let mut vec: Vector<i32> = (0..10).collect();
        let taken = vec.take();
        assert_eq!(taken.len(), 10);
        assert!(vec.is_empty());
        assert!(vec.is_inline());
        assert_eq!(vec.capacity(), 4);
    }

    #[test]
    fn test_clear_variants() {
        let mut vec: Vector<i32> = (0..10).collect();
        vec.clear();
        assert!(vec.is_empty());
        assert_eq!(vec.capacity(), 16);
        vec.append(1);
        vec.clear_and_make_small();
        assert!(vec.is_inline());
        assert_eq!(vec.capacity(), 4);
    }

    #[test]
    fn test_into_iter() {
        let vec: Vector<String> = ["x", "y", "z", "w", "v"].iter().map(|s| s.to_string()).collect();
        let mut iter = vec.into_iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next().as_deref(), Some("x"));
        assert_eq!(iter.next_back().as_deref(), Some("v"));
        let rest: Vec<String> = iter.collect();
        assert_eq!(rest, vec!["y", "z", "w"]);
    }

    #[derive(Clone)]
    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_every_element_dropped_once() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut vec: Vector<DropCounter, 2> = Vector::new();
            for _ in 0..6 {
                vec.append(DropCounter(drops.clone()));
            }
            vec.remove_and_reorder(1);
            assert_eq!(drops.get(), 1);
        }
        assert_eq!(drops.get(), 6);

        drops.set(0);
        let vec: Vector<DropCounter, 2> = (0..5).map(|_| DropCounter(drops.clone())).collect();
        let mut iter = vec.into_iter();
        drop(iter.next());
        drop(iter);
        assert_eq!(drops.get(), 5);
    }

    #[test]
    fn test_zero_sized_elements() {
        let mut vec: Vector<()> = Vector::new();
        for _ in 0..100 {
            vec.append(());
        }
        assert_eq!(vec.len(), 100);
        assert!(vec.is_inline());
        vec.pop_last();
        assert_eq!(vec.len(), 99);
    }

    #[test]
    fn test_custom_allocator() {
        let mut vec: Vector<u16, 1, RawAllocator> = Vector::new_in(RawAllocator);
        vec.extend(0..100u16);
        assert_eq!(vec.iter().map(|&v| v as u32).sum::<u32>(), 4950);
    }

    #[test]
    fn test_views_and_ranges() {
        let mut vec: Vector<i32> = Vector::from_slice(&[5, 6, 7]);
        assert_eq!(vec.index_range().iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        vec.as_mut_view().fill(1);
        let view: ArrayRef<'_, i32> = (&vec).into();
        assert_eq!(view.count(&1), 3);
    }

    #[test]
    fn test_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Vector<i32>>();
        assert_sync::<Vector<i32>>();
    }
}
