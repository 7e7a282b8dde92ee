//! Default 32-bit hashes for container keys
//!
//! Every hash container in this crate hashes keys through [`DefaultHash`]. The
//! built-in implementations favor speed over avalanche quality: integers hash to
//! themselves and strings use DJB2. The perturbation probing of the containers
//! mixes in the high bits, so weak low bits do not lead to clustering.
//!
//! User types either implement [`DefaultHash`] directly or are wrapped in
//! [`StdHash`], which reuses their `std::hash::Hash` implementation.
//!
//! # Usage
//!
//! ```rust
//! use probekit::hash_map::{hash_string, DefaultHash};
//!
//! assert_eq!(42u32.default_hash(), 42);
//! assert_eq!("abc".default_hash(), hash_string("abc"));
//! assert_eq!(String::from("abc").default_hash(), hash_string("abc"));
//! ```

use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::ops::Deref;
use std::ptr::NonNull;

/// Initial value of the DJB2 string hash
pub const STRING_HASH_SEED: u32 = 5381;
/// Fixed seeds of the hasher behind [`StdHash`]; hashes stay stable across runs of one build
/// Fixed seeds of the hasher behind [`StdHash`]; hashes stay stable across runs
const STD_HASH_SEEDS: [u64; 4] = [
    0x243F_6A88_85A3_08D3,
    0x1319_8A2E_0370_7344,
    0xA409_3822_299F_31D0,
    0x082E_FA98_EC4E_6C89,
];

/// 32-bit hash used by the open-addressing containers
///
/// Two values that compare equal must produce the same hash. When a key type
/// `K` is looked up through a borrowed form `Q` (such as `String` and `str`),
/// both must hash identically.
pub trait DefaultHash {
    /// Hash of `self`
    fn default_hash(&self) -> u32;
}

/// DJB2 hash: `hash = hash * 33 + byte`, starting from 5381
#[inline]
pub fn hash_string(value: &str) -> u32 {
    hash_bytes(value.as_bytes())
}

/// DJB2 hash of raw bytes
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> u32 {
    bytes.iter().fold(STRING_HASH_SEED, |hash, &byte| {
        hash.wrapping_mul(33).wrapping_add(byte as u32)
    })
}

/// Combine two hashes the way pairs are hashed
#[inline]
pub fn combine_hashes(first: u32, second: u32) -> u32 {
    first ^ second.wrapping_mul(33)
}

#[inline]
fn fold_u64(value: u64) -> u32 {
    (value ^ (value >> 32)) as u32
}

#[inline]
fn hash_address(address: usize) -> u32 {
    // The low bits of a heap address are zero due to alignment.
    fold_u64((address >> 4) as u64)
}

macro_rules! impl_hash_as_u32 {
    ($($ty:ty),*) => {
        $(
            impl DefaultHash for $ty {
                #[inline]
                fn default_hash(&self) -> u32 {
                    *self as u32
                }
            }
        )*
    };
}

macro_rules! impl_hash_folded {
    ($($ty:ty),*) => {
        $(
            impl DefaultHash for $ty {
                #[inline]
                fn default_hash(&self) -> u32 {
                    fold_u64(*self as u64)
                }
            }
        )*
    };
}

impl_hash_as_u32!(u8, u16, u32, i8, i16, i32, bool, char);
impl_hash_folded!(u64, i64, usize, isize);

impl DefaultHash for u128 {
    #[inline]
    fn default_hash(&self) -> u32 {
        fold_u64((*self as u64) ^ ((*self >> 64) as u64))
    }
}

impl DefaultHash for i128 {
    #[inline]
    fn default_hash(&self) -> u32 {
        (*self as u128).default_hash()
    }
}

/// Hashes the bit pattern, so `0.0` and `-0.0` hash differently even though they
/// compare equal and a map may hold both as separate keys. NaN keys are never
/// found again since NaN is unequal to itself.
impl DefaultHash for f32 {
    #[inline]
    fn default_hash(&self) -> u32 {
        self.to_bits()
    }
}

/// Bit-pattern hash; see the `f32` impl for the signed-zero exception.
impl DefaultHash for f64 {
    #[inline]
    fn default_hash(&self) -> u32 {
        fold_u64(self.to_bits())
    }
}

impl DefaultHash for str {
    #[inline]
    fn default_hash(&self) -> u32 {
        hash_string(self)
    }
}

impl DefaultHash for String {
    #[inline]
    fn default_hash(&self) -> u32 {
        hash_string(self)
    }
}

impl<T: DefaultHash + ?Sized> DefaultHash for &T {
    #[inline]
    fn default_hash(&self) -> u32 {
        (**self).default_hash()
    }
}

impl<T: ?Sized> DefaultHash for *const T {
    #[inline]
    fn default_hash(&self) -> u32 {
        hash_address(self.cast::<()>() as usize)
    }
}

impl<T: ?Sized> DefaultHash for *mut T {
    #[inline]
    fn default_hash(&self) -> u32 {
        hash_address(self.cast::<()>() as usize)
    }
}

impl<T: ?Sized> DefaultHash for NonNull<T> {
    #[inline]
    fn default_hash(&self) -> u32 {
        self.as_ptr().default_hash()
    }
}

impl<A: DefaultHash, B: DefaultHash> DefaultHash for (A, B) {
    #[inline]
    fn default_hash(&self) -> u32 {
        combine_hashes(self.0.default_hash(), self.1.default_hash())
    }
}

/// Key wrapper comparing and hashing an owning pointer by address
///
/// `Box`, `Rc` and `Arc` compare by value in `std`. Wrapping them gives them
/// object identity instead, which is what a map keyed by owned objects wants.
///
/// ```rust
/// use probekit::hash_map::ByAddress;
/// use probekit::Map;
///
/// let a = Box::new(5);
/// let b = Box::new(5);
/// let a_address: *const i32 = &*a;
/// let mut map = Map::new();
/// map.add_new(ByAddress(a), "a");
/// map.add_new(ByAddress(b), "b");
/// assert_eq!(map.len(), 2);
/// assert!(map.keys().any(|key| std::ptr::eq(&*key.0, a_address)));
/// ```
#[derive(Clone, Copy, Default)]
pub struct ByAddress<P>(pub P);

impl<P: Deref> ByAddress<P> {
    #[inline]
    fn address(&self) -> *const () {
        let target: *const P::Target = &*self.0;
        target.cast::<()>()
    }
}

impl<P: Deref> PartialEq for ByAddress<P> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl<P: Deref> Eq for ByAddress<P> {}

impl<P: Deref> DefaultHash for ByAddress<P> {
    #[inline]
    fn default_hash(&self) -> u32 {
        hash_address(self.address() as usize)
    }
}

impl<P: Deref> Deref for ByAddress<P> {
    type Target = P::Target;

    #[inline]
    fn deref(&self) -> &P::Target {
        &self.0
    }
}

impl<P: Deref> fmt::Debug for ByAddress<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByAddress({:p})", self.address())
    }
}

/// Key wrapper hashing through `std::hash::Hash`
///
/// Uses a fixed-seed `ahash` hasher folded to 32 bits. The hash of a value is
/// stable across runs of one build; it may differ between platforms, CPU
/// feature sets and `ahash` versions, so it must not be persisted.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StdHash<T>(pub T);

impl<T> StdHash<T> {
    /// Unwrap the key
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Hash> DefaultHash for StdHash<T> {
    fn default_hash(&self) -> u32 {
        let [k0, k1, k2, k3] = STD_HASH_SEEDS;
        let mut hasher = ahash::RandomState::with_seeds(k0, k1, k2, k3).build_hasher();
        self.0.hash(&mut hasher);
        fold_u64(hasher.finish())
    }
}

impl<T> Deref for StdHash<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for StdHash<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
