//! Non-owning views over contiguous memory
//!
//! [`ArrayRef`] and [`MutableArrayRef`] are the common currency between all
//! containers: algorithms take a view and stay independent of the container that
//! owns the elements. Views are a pointer and a length; slicing never copies.

use super::index_range::IndexRange;
use crate::error::{check_bounds, check_range, Result};
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Read-only view of `size()` consecutive elements
pub struct ArrayRef<'a, T> {
    data: &'a [T],
}

impl<'a, T> Clone for ArrayRef<'a, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for ArrayRef<'a, T> {}

impl<'a, T> ArrayRef<'a, T> {
    /// View over a slice
    #[inline]
    pub const fn new(data: &'a [T]) -> Self {
        Self { data }
    }

    /// View over nothing
    #[inline]
    pub const fn empty() -> Self {
        Self { data: &[] }
    }

    /// Number of elements in the view
    #[inline]
    pub const fn size(&self) -> usize {
        self.data.len()
    }

    /// The viewed elements with the view's lifetime
    #[inline]
    pub const fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Iterate with the view's lifetime
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'a, T> {
        self.data.iter()
    }

    /// `size` elements starting at `start`
    #[inline]
    pub fn slice(&self, start: usize, size: usize) -> Self {
        assert!(start + size <= self.size(), "slice {}+{} exceeds view of size {}", start, size, self.size());
        Self::new(&self.data[start..start + size])
    }

    /// Elements covered by an index range
    #[inline]
    pub fn slice_range(&self, range: IndexRange) -> Self {
        self.slice(range.start(), range.size())
    }

    /// Checked variant of [`ArrayRef::slice`]
    pub fn try_slice(&self, start: usize, size: usize) -> Result<Self> {
        check_range(start, start.saturating_add(size), self.size())?;
        Ok(Self::new(&self.data[start..start + size]))
    }

    /// Everything but the first `n` elements
    #[inline]
    pub fn drop_front(&self, n: usize) -> Self {
        assert!(n <= self.size());
        Self::new(&self.data[n..])
    }

    /// Everything but the last `n` elements
    #[inline]
    pub fn drop_back(&self, n: usize) -> Self {
        assert!(n <= self.size());
        Self::new(&self.data[..self.size() - n])
    }

    /// The first `n` elements
    #[inline]
    pub fn take_front(&self, n: usize) -> Self {
        assert!(n <= self.size());
        Self::new(&self.data[..n])
    }

    /// The last `n` elements
    #[inline]
    pub fn take_back(&self, n: usize) -> Self {
        assert!(n <= self.size());
        Self::new(&self.data[self.size() - n..])
    }

    /// First element; the view must not be empty
    #[inline]
    pub fn first(&self) -> &'a T {
        assert!(!self.data.is_empty(), "first() on an empty view");
        &self.data[0]
    }

    /// Last element; the view must not be empty
    #[inline]
    pub fn last(&self) -> &'a T {
        assert!(!self.data.is_empty(), "last() on an empty view");
        &self.data[self.data.len() - 1]
    }

    /// Element at `index`, or `None` when out of range
    #[inline]
    pub fn get(&self, index: usize) -> Option<&'a T> {
        self.data.get(index)
    }

    /// Element at `index` as a `Result`
    pub fn try_get(&self, index: usize) -> Result<&'a T> {
        check_bounds(index, self.size())?;
        Ok(&self.data[index])
    }

    /// All indices of the view
    #[inline]
    pub fn index_range(&self) -> IndexRange {
        IndexRange::from_size(self.size())
    }
}

impl<'a, T: PartialEq> ArrayRef<'a, T> {
    /// Linear search for `value`
    pub fn contains(&self, value: &T) -> bool {
        self.data.iter().any(|element| element == value)
    }

    /// Number of elements equal to `value`
    pub fn count(&self, value: &T) -> usize {
        self.data.iter().filter(|element| *element == value).count()
    }

    /// Index of the first element equal to `value`, if any
    pub fn first_index_try(&self, value: &T) -> Option<usize> {
        self.data.iter().position(|element| element == value)
    }

    /// Index of the first element equal to `value`; the value must be present
    pub fn first_index(&self, value: &T) -> usize {
        match self.first_index_try(value) {
            Some(index) => index,
            None => panic!("value is not contained in the view"),
        }
    }

    /// Quadratic duplicate check, meant for short views
    pub fn has_duplicates_linear(&self) -> bool {
        for (i, a) in self.data.iter().enumerate() {
            if self.data[i + 1..].iter().any(|b| a == b) {
                return true;
            }
        }
        false
    }

    /// Quadratic intersection check, meant for short views
    pub fn intersects_linear(&self, other: ArrayRef<'_, T>) -> bool {
        self.data.iter().any(|value| other.contains(value))
    }
}

impl<'a, T> Deref for ArrayRef<'a, T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.data
    }
}

impl<'a, T> Default for ArrayRef<'a, T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, T> From<&'a [T]> for ArrayRef<'a, T> {
    #[inline]
    fn from(data: &'a [T]) -> Self {
        Self::new(data)
    }
}

impl<'a, T, const M: usize> From<&'a [T; M]> for ArrayRef<'a, T> {
    #[inline]
    fn from(data: &'a [T; M]) -> Self {
        Self::new(data)
    }
}

impl<'a, T> From<&'a Vec<T>> for ArrayRef<'a, T> {
    #[inline]
    fn from(data: &'a Vec<T>) -> Self {
        Self::new(data.as_slice())
    }
}

impl<'a, T> IntoIterator for ArrayRef<'a, T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<'a, 'b, T: PartialEq> PartialEq<ArrayRef<'b, T>> for ArrayRef<'a, T> {
    fn eq(&self, other: &ArrayRef<'b, T>) -> bool {
        self.data == other.data
    }
}

impl<'a, T: fmt::Debug> fmt::Debug for ArrayRef<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.data.iter()).finish()
    }
}

/// Mutable view of `size()` consecutive elements
pub struct MutableArrayRef<'a, T> {
    data: &'a mut [T],
}

impl<'a, T> MutableArrayRef<'a, T> {
    /// View over a mutable slice
    #[inline]
    pub fn new(data: &'a mut [T]) -> Self {
        Self { data }
    }

    /// Number of elements in the view
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Read-only view of the same elements
    #[inline]
    pub fn as_ref(&self) -> ArrayRef<'_, T> {
        ArrayRef::new(self.data)
    }

    /// Convert into a read-only view, keeping the lifetime
    #[inline]
    pub fn into_ref(self) -> ArrayRef<'a, T> {
        ArrayRef::new(self.data)
    }

    /// The underlying mutable slice
    #[inline]
    pub fn into_slice(self) -> &'a mut [T] {
        self.data
    }

    /// `size` elements starting at `start`
    #[inline]
    pub fn slice(&mut self, start: usize, size: usize) -> MutableArrayRef<'_, T> {
        assert!(start + size <= self.size(), "slice {}+{} exceeds view of size {}", start, size, self.size());
        MutableArrayRef::new(&mut self.data[start..start + size])
    }

    /// Everything but the first `n` elements
    #[inline]
    pub fn drop_front(self, n: usize) -> Self {
        assert!(n <= self.size());
        Self::new(&mut self.data[n..])
    }

    /// Everything but the last `n` elements
    #[inline]
    pub fn drop_back(self, n: usize) -> Self {
        assert!(n <= self.size());
        let end = self.data.len() - n;
        Self::new(&mut self.data[..end])
    }

    /// The first `n` elements
    #[inline]
    pub fn take_front(self, n: usize) -> Self {
        assert!(n <= self.size());
        Self::new(&mut self.data[..n])
    }

    /// The last `n` elements
    #[inline]
    pub fn take_back(self, n: usize) -> Self {
        assert!(n <= self.size());
        let start = self.data.len() - n;
        Self::new(&mut self.data[start..])
    }

    /// All indices of the view
    #[inline]
    pub fn index_range(&self) -> IndexRange {
        IndexRange::from_size(self.size())
    }
}

impl<'a, T: Clone> MutableArrayRef<'a, T> {
    /// Overwrite every element with `value`
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Overwrite the elements at `indices` with `value`
    pub fn fill_indices(&mut self, indices: ArrayRef<'_, usize>, value: T) {
        for &index in indices.iter() {
            self.data[index] = value.clone();
        }
    }
}

impl<'a, T> Deref for MutableArrayRef<'a, T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.data
    }
}

impl<'a, T> DerefMut for MutableArrayRef<'a, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.data
    }
}

impl<'a, T> From<&'a mut [T]> for MutableArrayRef<'a, T> {
    #[inline]
    fn from(data: &'a mut [T]) -> Self {
        Self::new(data)
    }
}

impl<'a, T, const M: usize> From<&'a mut [T; M]> for MutableArrayRef<'a, T> {
    #[inline]
    fn from(data: &'a mut [T; M]) -> Self {
        Self::new(data)
    }
}

impl<'a, T> From<&'a mut Vec<T>> for MutableArrayRef<'a, T> {
    #[inline]
    fn from(data: &'a mut Vec<T>) -> Self {
        Self::new(data.as_mut_slice())
    }
}

impl<'a, T: fmt::Debug> fmt::Debug for MutableArrayRef<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.data.iter()).finish()
    }
}
