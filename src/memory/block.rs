//! Block header shared by every allocator strategy
//!
//! Each block handed out by an allocator is preceded by a [`BlockHeader`] that
//! records the real start of the underlying system allocation and its layout.
//! Aligned blocks therefore stay freeable through a single `deallocate(ptr)`
//! without the caller remembering size or alignment.

use std::alloc::{self, Layout};
use std::mem;
use std::ptr::NonNull;

/// Minimum alignment of every returned block
pub const MIN_ALIGNMENT: usize = 16;

const BLOCK_MAGIC: usize = 0x5052_4F42_4B49_5431;
const FREED_MAGIC: usize = 0xDEAD_B10C_DEAD_B10C;

/// Metadata stored directly in front of the user pointer
#[derive(Debug, Clone, Copy)]
pub struct BlockHeader {
    base: *mut u8,
    layout: Layout,
    requested: usize,
    tag: &'static str,
    magic: usize,
}

impl BlockHeader {
    /// Size requested by the caller
    #[inline]
    pub fn requested_size(&self) -> usize {
        self.requested
    }

    /// Total bytes taken from the system allocator, header included
    #[inline]
    pub fn reserved_size(&self) -> usize {
        self.layout.size()
    }

    /// Alignment the block was allocated with
    #[inline]
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }

    /// Tag given at allocation time
    #[inline]
    pub fn tag(&self) -> &'static str {
        self.tag
    }
}

#[inline]
fn header_space(alignment: usize) -> usize {
    let header = mem::size_of::<BlockHeader>();
    (header + alignment - 1) & !(alignment - 1)
}

/// Allocate `size` bytes aligned to `alignment` with a header in front
///
/// Allocation failure is fatal and goes through [`alloc::handle_alloc_error`].
pub fn allocate_block(size: usize, alignment: usize, tag: &'static str) -> NonNull<u8> {
    assert!(alignment.is_power_of_two(), "alignment must be a power of two");
    let alignment = alignment.max(MIN_ALIGNMENT);
    let offset = header_space(alignment);
    let total = match offset.checked_add(size) {
        Some(total) => total,
        None => capacity_overflow(),
    };
    let layout = match Layout::from_size_align(total, alignment) {
        Ok(layout) => layout,
        Err(_) => capacity_overflow(),
    };

    // SAFETY: `layout` has a non-zero size because `offset >= size_of::<BlockHeader>()`.
    let base = unsafe { alloc::alloc(layout) };
    if base.is_null() {
        alloc::handle_alloc_error(layout);
    }

    // SAFETY: `offset <= total`, and the header fits in the `offset` bytes in front
    // of the user pointer. The user pointer is aligned to `alignment >= 16`, so the
    // header slot (`size_of::<BlockHeader>()` is a multiple of 8) is 8-aligned.
    unsafe {
        let user = base.add(offset);
        let header = user.sub(mem::size_of::<BlockHeader>()) as *mut BlockHeader;
        header.write(BlockHeader {
            base,
            layout,
            requested: size,
            tag,
            magic: BLOCK_MAGIC,
        });
        NonNull::new_unchecked(user)
    }
}

/// Read the header of a live block
///
/// # Safety
///
/// `ptr` must have been returned by [`allocate_block`] and not freed yet.
#[inline]
pub unsafe fn block_header(ptr: NonNull<u8>) -> BlockHeader {
    let header = unsafe { read_header(ptr) };
    assert!(
        header.magic == BLOCK_MAGIC,
        "memory block at {:p} is corrupted or was already freed",
        ptr.as_ptr()
    );
    header
}

/// Free a block returned by [`allocate_block`]
///
/// # Safety
///
/// `ptr` must have been returned by [`allocate_block`] and not freed yet.
pub unsafe fn free_block(ptr: NonNull<u8>) -> BlockHeader {
    let header = unsafe { block_header(ptr) };
    // SAFETY: the header slot is valid per the caller contract; poisoning the magic
    // turns a later double free into a panic instead of heap corruption.
    unsafe {
        let slot = ptr.as_ptr().sub(mem::size_of::<BlockHeader>()) as *mut BlockHeader;
        (*slot).magic = FREED_MAGIC;
        alloc::dealloc(header.base, header.layout);
    }
    header
}

#[inline]
unsafe fn read_header(ptr: NonNull<u8>) -> BlockHeader {
    // SAFETY: guaranteed by the callers' contract.
    unsafe { (ptr.as_ptr().sub(mem::size_of::<BlockHeader>()) as *const BlockHeader).read() }
}

#[cold]
fn capacity_overflow() -> ! {
    panic!("allocation size overflows the address space");
}
