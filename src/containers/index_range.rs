//! Half-open integer interval
//!
//! An [`IndexRange`] names the indices `start..start + size` without storing
//! them. Iterating produces a lazy, finite sequence that can be restarted any
//! number of times since the range itself is `Copy`.

use std::fmt;
use std::ops::Range;

/// Half-open range of consecutive indices
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IndexRange {
    start: usize,
    size: usize,
}

impl IndexRange {
    /// Range covering `start..start + size`
    #[inline]
    pub const fn new(start: usize, size: usize) -> Self {
        Self { start, size }
    }

    /// Range covering `0..size`
    #[inline]
    pub const fn from_size(size: usize) -> Self {
        Self { start: 0, size }
    }

    /// First index in the range (also valid for empty ranges)
    #[inline]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Number of indices
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns true if the range holds no index
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Exclusive end of the range
    #[inline]
    pub const fn one_after_last(&self) -> usize {
        self.start + self.size
    }

    /// First index; the range must not be empty
    #[inline]
    pub fn first(&self) -> usize {
        assert!(self.size > 0, "first() on an empty IndexRange");
        self.start
    }

    /// Last index; the range must not be empty
    #[inline]
    pub fn last(&self) -> usize {
        assert!(self.size > 0, "last() on an empty IndexRange");
        self.start + self.size - 1
    }

    /// Returns true if `value` lies within the range
    #[inline]
    pub const fn contains(&self, value: usize) -> bool {
        value >= self.start && value < self.start + self.size
    }

    /// The `n`-th index of the range
    #[inline]
    pub fn get(&self, n: usize) -> usize {
        debug_assert!(n < self.size, "index {} out of range of size {}", n, self.size);
        self.start + n
    }

    /// Sub-range of `size` indices beginning at offset `start`
    #[inline]
    pub fn slice(&self, start: usize, size: usize) -> IndexRange {
        debug_assert!(start + size <= self.size);
        IndexRange::new(self.start + start, size)
    }

    /// The `n` indices directly following this range
    #[inline]
    pub const fn after(&self, n: usize) -> IndexRange {
        IndexRange::new(self.one_after_last(), n)
    }

    /// The `n` indices directly preceding this range
    #[inline]
    pub fn before(&self, n: usize) -> IndexRange {
        debug_assert!(n <= self.start);
        IndexRange::new(self.start - n, n)
    }

    /// Equivalent `std` range
    #[inline]
    pub const fn as_range(&self) -> Range<usize> {
        self.start..self.start + self.size
    }

    /// Iterate over the indices
    #[inline]
    pub fn iter(&self) -> IndexRangeIter {
        IndexRangeIter {
            next: self.start,
            end: self.one_after_last(),
        }
    }
}

impl From<Range<usize>> for IndexRange {
    fn from(range: Range<usize>) -> Self {
        IndexRange::new(range.start, range.end.saturating_sub(range.start))
    }
}

impl IntoIterator for IndexRange {
    type Item = usize;
    type IntoIter = IndexRangeIter;

    fn into_iter(self) -> IndexRangeIter {
        self.iter()
    }
}

impl IntoIterator for &IndexRange {
    type Item = usize;
    type IntoIter = IndexRangeIter;

    fn into_iter(self) -> IndexRangeIter {
        self.iter()
    }
}

impl fmt::Debug for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IndexRange({}..{})", self.start, self.one_after_last())
    }
}

/// Iterator over an [`IndexRange`]
#[derive(Debug, Clone)]
pub struct IndexRangeIter {
    next: usize,
    end: usize,
}

impl Iterator for IndexRangeIter {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.next < self.end {
            let value = self.next;
            self.next += 1;
            Some(value)
        } else {
            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for IndexRangeIter {
    #[inline]
    fn next_back(&mut self) -> Option<usize> {
        if self.next < self.end {
            self.end -= 1;
            Some(self.end)
        } else {
            None
        }
    }
}

impl ExactSizeIterator for IndexRangeIter {}

impl std::iter::FusedIterator for IndexRangeIter {}
