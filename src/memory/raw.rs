//! System allocator with a header in front of every block

use super::block::{allocate_block, block_header, free_block};
use super::Allocator;
use std::ptr::NonNull;

/// Allocator that delegates straight to the system allocator
///
/// The block header records the real block start, so over-aligned allocations are
/// released uniformly through [`Allocator::deallocate`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RawAllocator;

impl RawAllocator {
    /// Size originally requested for a live block
    ///
    /// # Safety
    ///
    /// `ptr` must be a live block returned by a `RawAllocator`.
    #[inline]
    pub unsafe fn requested_size(ptr: NonNull<u8>) -> usize {
        unsafe { block_header(ptr) }.requested_size()
    }
}

impl Allocator for RawAllocator {
    #[inline]
    fn allocate_aligned(&self, size: usize, alignment: usize, tag: &'static str) -> NonNull<u8> {
        allocate_block(size, alignment, tag)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>) {
        unsafe {
            free_block(ptr);
        }
    }
}
