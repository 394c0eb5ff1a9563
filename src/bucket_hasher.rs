//! Bucket selection strategies.
//!
//! A strategy maps a key and the table's bucket count to an index in
//! `[0, capacity)`. The map reduces any out-of-range answer modulo capacity.

use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

pub trait BucketHasher<K: ?Sized> {
    fn bucket(&self, key: &K, capacity: usize) -> usize;
}

/// Closures are strategies: `|key: &K, capacity| -> usize`.
impl<K, F> BucketHasher<K> for F
where
    K: ?Sized,
    F: Fn(&K, usize) -> usize,
{
    #[inline]
    fn bucket(&self, key: &K, capacity: usize) -> usize {
        self(key, capacity)
    }
}

/// Keys that reduce directly modulo the bucket count.
pub trait ModuloKey {
    fn modulo(&self, capacity: usize) -> usize;
}

macro_rules! modulo_unsigned {
    ($($t:ty),*) => {$(
        impl ModuloKey for $t {
            #[inline]
            fn modulo(&self, capacity: usize) -> usize {
                (*self as u128 % capacity as u128) as usize
            }
        }
    )*};
}

// Euclidean remainder keeps negative keys inside the table.
macro_rules! modulo_signed {
    ($($t:ty),*) => {$(
        impl ModuloKey for $t {
            #[inline]
            fn modulo(&self, capacity: usize) -> usize {
                (*self as i128).rem_euclid(capacity as i128) as usize
            }
        }
    )*};
}

modulo_unsigned!(u8, u16, u32, u64, u128, usize);
modulo_signed!(i8, i16, i32, i64, i128, isize);

/// `key mod capacity`. Only suited to small integer-keyed workloads.
#[derive(Copy, Clone, Debug, Default)]
pub struct ModuloHasher;

impl<K: ModuloKey + ?Sized> BucketHasher<K> for ModuloHasher {
    #[inline]
    fn bucket(&self, key: &K, capacity: usize) -> usize {
        key.modulo(capacity)
    }
}

/// General-purpose strategy: any `BuildHasher`, reduced modulo capacity.
#[derive(Clone, Debug, Default)]
pub struct BuildHasherBuckets<S = DefaultHashBuilder>(pub S);

impl<S> BuildHasherBuckets<S> {
    pub fn new(build: S) -> Self {
        Self(build)
    }
}

impl<K, S> BucketHasher<K> for BuildHasherBuckets<S>
where
    K: Hash + ?Sized,
    S: BuildHasher,
{
    #[inline]
    fn bucket(&self, key: &K, capacity: usize) -> usize {
        (self.0.hash_one(key) % capacity as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::RandomState;

    #[test]
    fn modulo_matches_remainder() {
        let h = ModuloHasher;
        assert_eq!(h.bucket(&7u32, 10), 7);
        assert_eq!(h.bucket(&23u64, 10), 3);
        assert_eq!(h.bucket(&u128::MAX, 7), (u128::MAX % 7) as usize);
        assert_eq!(h.bucket(&0usize, 1), 0);
    }

    #[test]
    fn modulo_negative_keys_stay_in_range() {
        let h = ModuloHasher;
        assert_eq!(h.bucket(&-1i32, 10), 9);
        assert_eq!(h.bucket(&-10i64, 10), 0);
        assert_eq!(h.bucket(&i8::MIN, 3), (-128i32).rem_euclid(3) as usize);
    }

    #[test]
    fn build_hasher_in_range_and_stable() {
        let h = BuildHasherBuckets::new(RandomState::new());
        for cap in [1usize, 2, 10, 97] {
            for key in ["a", "bb", "ccc", ""] {
                let b = h.bucket(key, cap);
                assert!(b < cap);
                assert_eq!(b, h.bucket(key, cap));
            }
        }
        let d: BuildHasherBuckets = BuildHasherBuckets::default();
        assert!(d.bucket(&String::from("x"), 5) < 5);
    }

    #[test]
    fn closures_are_strategies() {
        let first_byte = |k: &str, cap: usize| k.as_bytes().first().copied().unwrap_or(0) as usize % cap;
        assert_eq!(BucketHasher::<str>::bucket(&first_byte, "a", 10), 97 % 10);
        assert_eq!(BucketHasher::<str>::bucket(&first_byte, "", 10), 0);
    }
}
