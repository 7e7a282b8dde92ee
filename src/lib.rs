//! # Probekit: Small-Buffer Vectors and Open-Addressing Hash Containers
//!
//! This crate provides a family of allocation-aware containers built around two
//! ideas: keep small containers inside the object itself, and resolve hash
//! collisions by probing inside one flat slot array.
//!
//! ## Key Features
//!
//! - **Pluggable Allocators**: guarded (tracked), raw (system) and a per-thread
//!   temporary pool of fixed-size buffers
//! - **Small-Buffer Vector**: `Vector<T, N>` makes no heap allocation up to `N` elements
//! - **Non-Owning Views**: `ArrayRef`, `MutableArrayRef` and `IndexRange`
//! - **Open-Addressing Engine**: power-of-two slot bundles with perturbation probing
//!   and a fixed 50% load factor
//! - **Hash Containers**: `Map`, insertion-ordered `SetVector` and arena-backed `StringMap`
//!
//! ## Quick Start
//!
//! ```rust
//! use probekit::{Map, SetVector, StringMap, Vector};
//!
//! // No allocation while the vector holds at most four elements
//! let mut vec: Vector<i32, 4> = Vector::new();
//! vec.append(1);
//! vec.append(2);
//! assert!(vec.is_inline());
//!
//! // Map with tombstone deletion
//! let mut map = Map::new();
//! map.add_new("a".to_string(), 1);
//! assert_eq!(*map.lookup("a"), 1);
//!
//! // Set that iterates in first-seen order
//! let set: SetVector<i32> = [1, 3, 3, 2, 1, 5].into_iter().collect();
//! assert_eq!(set.as_slice(), &[1, 3, 2, 5]);
//!
//! // String keys interned in one arena
//! let mut strings = StringMap::new();
//! strings.add_new("alpha", 1);
//! assert!(!strings.contains("gamma"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod containers;
pub mod error;
pub mod hash_map;
pub mod memory;

// Re-export core types
pub use containers::{ArrayRef, IndexRange, MutableArrayRef, Vector};
pub use error::{ProbeError, Result};

// Re-export hash containers
pub use hash_map::{DefaultHash, Map, SetVector, StringMap};

// Re-export allocators
pub use memory::{
    Allocator, AllocatorStats, GuardedAllocator, RawAllocator, TemporaryAllocator, TemporaryPool,
};

// Re-export configuration
pub use config::{Config, TemporaryPoolConfig};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library (currently only logs the version)
pub fn init() {
    log::debug!("Initializing probekit v{}", VERSION);
}
