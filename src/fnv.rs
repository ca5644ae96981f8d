//! 64-bit FNV-1a hashing for callers that need to precompute entry hashes.

use core::hash::{BuildHasher, Hasher};

pub const FNV1_64_INIT: u64 = 0xcbf2_9ce4_8422_2325;
pub const FNV_64_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over `bytes`: xor each octet into the low byte, then multiply by
/// the 64-bit FNV prime mod 2^64.
#[inline]
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    fold(FNV1_64_INIT, bytes)
}

#[inline]
fn fold(mut hval: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hval ^= u64::from(b);
        hval = hval.wrapping_mul(FNV_64_PRIME);
    }
    hval
}

/// Streaming FNV-1a hasher.
///
/// Writing a byte slice in one or several pieces yields `fnv1a_64` of the
/// concatenation. Note that `Hash` impls may add their own bytes (`str`
/// appends a terminator), so `hash_one("ab")` differs from
/// `fnv1a_64(b"ab")`.
#[derive(Clone, Copy, Debug)]
pub struct FnvHasher(u64);

impl Default for FnvHasher {
    fn default() -> Self {
        FnvHasher(FNV1_64_INIT)
    }
}

impl Hasher for FnvHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.0 = fold(self.0, bytes);
    }
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FnvBuildHasher;

impl BuildHasher for FnvBuildHasher {
    type Hasher = FnvHasher;
    fn build_hasher(&self) -> Self::Hasher {
        FnvHasher::default()
    }
}
