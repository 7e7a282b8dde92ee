//! Sequence containers and views
//!
//! - **[`Vector<T, N, A>`]** - growable array with `N` elements of inline storage
//! - **[`ArrayRef<T>`]** / **[`MutableArrayRef<T>`]** - non-owning views over
//!   contiguous elements, accepted by every algorithm in the crate
//! - **[`IndexRange`]** - half-open integer interval iterated lazily

mod index_range;
mod vector;
mod views;

pub use index_range::{IndexRange, IndexRangeIter};
pub use vector::{IntoIter, Vector};
pub use views::{ArrayRef, MutableArrayRef};
