//! Tracked allocator used by default for every container
//!
//! All guarded blocks update process-wide counters so that leaks and peak usage
//! can be inspected at any time through [`GuardedAllocator::stats`]. Freeing
//! verifies the block header, turning double frees and header overwrites into
//! an immediate panic.

use super::block::{allocate_block, free_block};
use super::Allocator;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

static BLOCKS_IN_USE: AtomicUsize = AtomicUsize::new(0);
static BYTES_IN_USE: AtomicUsize = AtomicUsize::new(0);
static PEAK_BYTES_IN_USE: AtomicUsize = AtomicUsize::new(0);
static TOTAL_ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);

/// Snapshot of the guarded allocator counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocatorStats {
    /// Blocks allocated and not yet freed
    pub blocks_in_use: usize,
    /// Requested bytes held by live blocks
    pub bytes_in_use: usize,
    /// Highest value `bytes_in_use` has reached
    pub peak_bytes_in_use: usize,
    /// Number of allocations since process start
    pub total_allocations: usize,
}

/// Default allocator: system memory plus global bookkeeping
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GuardedAllocator;

impl GuardedAllocator {
    /// Current process-wide counters
    pub fn stats() -> AllocatorStats {
        AllocatorStats {
            blocks_in_use: BLOCKS_IN_USE.load(Ordering::Relaxed),
            bytes_in_use: BYTES_IN_USE.load(Ordering::Relaxed),
            peak_bytes_in_use: PEAK_BYTES_IN_USE.load(Ordering::Relaxed),
            total_allocations: TOTAL_ALLOCATIONS.load(Ordering::Relaxed),
        }
    }

    /// Log the current counters at debug level
    pub fn log_stats() {
        let stats = Self::stats();
        log::debug!(
            "guarded allocator: {} blocks / {} bytes in use, peak {} bytes, {} allocations total",
            stats.blocks_in_use,
            stats.bytes_in_use,
            stats.peak_bytes_in_use,
            stats.total_allocations
        );
    }
}

impl Allocator for GuardedAllocator {
    fn allocate_aligned(&self, size: usize, alignment: usize, tag: &'static str) -> NonNull<u8> {
        let ptr = allocate_block(size, alignment, tag);
        BLOCKS_IN_USE.fetch_add(1, Ordering::Relaxed);
        TOTAL_ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
        let in_use = BYTES_IN_USE.fetch_add(size, Ordering::Relaxed) + size;
        PEAK_BYTES_IN_USE.fetch_max(in_use, Ordering::Relaxed);
        ptr
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>) {
        let header = unsafe { free_block(ptr) };
        BLOCKS_IN_USE.fetch_sub(1, Ordering::Relaxed);
        BYTES_IN_USE.fetch_sub(header.requested_size(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_advance() {
        let before = GuardedAllocator::stats();
        let ptr = GuardedAllocator.allocate(512, "guarded test");
        let during = GuardedAllocator::stats();
        assert!(during.total_allocations > before.total_allocations);
        assert!(during.peak_bytes_in_use >= 512);
        unsafe { GuardedAllocator.deallocate(ptr) };
        GuardedAllocator::log_stats();
    }
}
