//! Thread-local pool of fixed-size scratch buffers
//!
//! Short-lived containers (scratch vectors inside a single function) allocate and
//! free at a high rate. The temporary pool keeps a bounded LIFO stack of ready
//! buffers so that steady-state scratch work performs no real allocation at all.
//!
//! # Architecture
//!
//! - **Explicit handle**: [`TemporaryPool`] is an ordinary value that can be
//!   created and passed around by whoever owns a unit of work.
//! - **Thread-local default**: [`TemporaryAllocator`] reaches a lazily created
//!   pool owned by the calling thread. A block must be freed on the thread that
//!   allocated it.
//! - **Fixed buffers**: requests up to `buffer_size` (64 KiB by default) are served
//!   from pool buffers aligned to `alignment` (64 B by default). Larger requests go
//!   straight to the system allocator.
//! - **Leak guard**: the number of live allocations per pool is bounded by an
//!   assertion.

use super::block::{block_header, MIN_ALIGNMENT};
use super::raw::RawAllocator;
use super::Allocator;
use crate::config::TemporaryPoolConfig;
use crate::containers::Vector;
use crate::error::Result;
use std::cell::RefCell;
use std::ptr::NonNull;

/// Inline capacity of the ready-stack before it spills to the heap
const READY_STACK_INLINE: usize = 32;

/// Counters of one temporary pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemporaryPoolStats {
    /// Allocations handed out and not yet returned
    pub live_allocations: usize,
    /// Buffers sitting on the ready-stack
    pub cached_buffers: usize,
    /// Pool buffers obtained from the system allocator
    pub buffers_created: usize,
    /// Requests too large (or too aligned) for a pool buffer
    pub direct_allocations: usize,
}

/// Bounded pool of fixed-size buffers with LIFO reuse
pub struct TemporaryPool {
    config: TemporaryPoolConfig,
    ready: Vector<NonNull<u8>, READY_STACK_INLINE, RawAllocator>,
    live_allocations: usize,
    buffers_created: usize,
    direct_allocations: usize,
}

impl TemporaryPool {
    /// Create a pool with the default configuration
    pub fn new() -> Self {
        Self::from_valid_config(TemporaryPoolConfig::default())
    }

    /// Create a pool with a custom configuration
    pub fn with_config(config: TemporaryPoolConfig) -> Result<Self> {
        use crate::config::Config;
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: TemporaryPoolConfig) -> Self {
        Self {
            config,
            ready: Vector::new(),
            live_allocations: 0,
            buffers_created: 0,
            direct_allocations: 0,
        }
    }

    /// Configuration of this pool
    pub fn config(&self) -> &TemporaryPoolConfig {
        &self.config
    }

    /// Allocate with the pool's own alignment
    pub fn allocate(&mut self, size: usize) -> NonNull<u8> {
        self.allocate_aligned(size, self.config.alignment, "TemporaryPool::allocate")
    }

    /// Allocate `size` bytes aligned to `alignment`
    ///
    /// Requests that fit a pool buffer pop the most recently returned buffer, or
    /// create a new one when the ready-stack is empty.
    pub fn allocate_aligned(&mut self, size: usize, alignment: usize, tag: &'static str) -> NonNull<u8> {
        self.live_allocations += 1;
        debug_assert!(
            self.live_allocations <= self.config.max_live_allocations,
            "temporary pool has {} live allocations, probably a leak",
            self.live_allocations
        );

        if size <= self.config.buffer_size && alignment <= self.config.alignment {
            if !self.ready.is_empty() {
                return self.ready.pop_last();
            }
            self.buffers_created += 1;
            if self.config.log_buffer_creation {
                log::debug!(
                    "temporary pool: creating buffer #{} of {} bytes",
                    self.buffers_created,
                    self.config.buffer_size
                );
            }
            return RawAllocator.allocate_aligned(self.config.buffer_size, self.config.alignment, tag);
        }

        self.direct_allocations += 1;
        RawAllocator.allocate_aligned(size, alignment.max(self.config.alignment), tag)
    }

    /// Return a block to the pool
    ///
    /// Pool-sized buffers are pushed back onto the ready-stack while it has room;
    /// everything else is released to the system.
    ///
    /// # Safety
    ///
    /// `ptr` must come from this pool's `allocate*` and must not be released twice.
    pub unsafe fn deallocate(&mut self, ptr: NonNull<u8>) {
        debug_assert!(self.live_allocations > 0, "temporary pool released more blocks than it handed out");
        self.live_allocations = self.live_allocations.saturating_sub(1);

        let header = unsafe { block_header(ptr) };
        // Blocks never carry less than MIN_ALIGNMENT, whatever was requested.
        let is_pool_buffer = header.requested_size() == self.config.buffer_size
            && header.alignment() == self.config.alignment.max(MIN_ALIGNMENT);
        if is_pool_buffer {
            if self.ready.len() < self.config.max_cached_buffers {
                self.ready.append(ptr);
                return;
            }
            log::warn!(
                "temporary pool: ready-stack full ({} buffers), releasing buffer",
                self.ready.len()
            );
        }
        unsafe { RawAllocator.deallocate(ptr) };
    }

    /// Current counters
    pub fn stats(&self) -> TemporaryPoolStats {
        TemporaryPoolStats {
            live_allocations: self.live_allocations,
            cached_buffers: self.ready.len(),
            buffers_created: self.buffers_created,
            direct_allocations: self.direct_allocations,
        }
    }
}

impl Default for TemporaryPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TemporaryPool {
    fn drop(&mut self) {
        if self.live_allocations > 0 {
            log::warn!(
                "temporary pool dropped with {} live allocations",
                self.live_allocations
            );
        }
        while !self.ready.is_empty() {
            let ptr = self.ready.pop_last();
            unsafe { RawAllocator.deallocate(ptr) };
        }
    }
}

impl std::fmt::Debug for TemporaryPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporaryPool")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

thread_local! {
    static LOCAL_POOL: RefCell<TemporaryPool> = RefCell::new(TemporaryPool::new());
}

/// Counters of the calling thread's pool
pub fn temporary_pool_stats() -> TemporaryPoolStats {
    LOCAL_POOL
        .try_with(|pool| pool.borrow().stats())
        .unwrap_or_default()
}

/// Allocator backed by the calling thread's [`TemporaryPool`]
///
/// Blocks must be released on the thread that allocated them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TemporaryAllocator;

impl Allocator for TemporaryAllocator {
    fn allocate_aligned(&self, size: usize, alignment: usize, tag: &'static str) -> NonNull<u8> {
        LOCAL_POOL
            .try_with(|pool| pool.borrow_mut().allocate_aligned(size, alignment, tag))
            // The pool is gone during thread teardown.
            .unwrap_or_else(|_| RawAllocator.allocate_aligned(size, alignment, tag))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>) {
        let returned = LOCAL_POOL.try_with(|pool| unsafe { pool.borrow_mut().deallocate(ptr) });
        if returned.is_err() {
            unsafe { RawAllocator.deallocate(ptr) };
        }
    }
}
