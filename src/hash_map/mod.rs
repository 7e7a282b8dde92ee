//! Open-addressing hash containers
//!
//! All containers share one slot-array engine and one probing scheme:
//! - `Map`: general key/value map with tombstone deletion
//! - `SetVector`: hash set that iterates in insertion order
//! - `StringMap`: string-keyed map with keys interned in one arena
//!
//! Keys hash through [`DefaultHash`], a 32-bit hash with built-in
//! implementations for integers, floats, strings, pointers and pairs.

mod hash_functions;
mod map;
mod open_addressing;
mod set_vector;
mod string_map;

pub use hash_functions::{
    combine_hashes, hash_bytes, hash_string, ByAddress, DefaultHash, StdHash, STRING_HASH_SEED,
};
pub use map::{Entry, Map, OccupiedEntry, VacantEntry};

// Iterator types with module-qualified names to avoid conflicts
pub use map::{Items as MapItems, Keys as MapKeys, Values as MapValues, ValuesMut as MapValuesMut};

pub use open_addressing::{
    OpenAddressingArray, ProbeSequence, SlotBundle, SlotState, SlotStatus, TableStats, SLOTS_PER_ITEM,
};
pub use set_vector::SetVector;
pub use string_map::StringMap;
