//! Memory sources for the containers
//!
//! Every container is parameterized over an [`Allocator`]. Three interchangeable
//! strategies are provided:
//!
//! - [`GuardedAllocator`]: tracked allocations with process-wide statistics and
//!   header checks on free. This is the default for all containers.
//! - [`RawAllocator`]: the bare system allocator. Used by objects that must
//!   outlive the tracked allocator, such as the temporary pool's own bookkeeping.
//! - [`TemporaryAllocator`]: a per-thread pool of fixed-size buffers recycled in
//!   LIFO order, for short-lived scratch containers.
//!
//! Allocation failure is never reported as an error value: it terminates the
//! process through [`std::alloc::handle_alloc_error`].

mod block;
mod guarded;
mod raw;
mod temporary;

use std::ptr::NonNull;

pub use block::{BlockHeader, MIN_ALIGNMENT};
pub use guarded::{AllocatorStats, GuardedAllocator};
pub use raw::RawAllocator;
pub use temporary::{temporary_pool_stats, TemporaryAllocator, TemporaryPool, TemporaryPoolStats};

/// Capability interface shared by all memory sources
///
/// Allocators are near-stateless strategies: identity is irrelevant, only
/// behavior matters, which is why they are `Default + Clone`.
pub trait Allocator: Default + Clone {
    /// Allocate `size` bytes with the default alignment of [`MIN_ALIGNMENT`]
    #[inline]
    fn allocate(&self, size: usize, tag: &'static str) -> NonNull<u8> {
        self.allocate_aligned(size, MIN_ALIGNMENT, tag)
    }

    /// Allocate `size` bytes aligned to `alignment` (a power of two)
    ///
    /// `tag` names the call site for diagnostics.
    fn allocate_aligned(&self, size: usize, alignment: usize, tag: &'static str) -> NonNull<u8>;

    /// Release a block
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate`/`allocate_aligned` of the same
    /// allocator type and must not have been released already.
    unsafe fn deallocate(&self, ptr: NonNull<u8>);
}
