use md5::{Digest, Md5};
use rand_xoshiro::Xoroshiro128PlusPlus;
use rand_xoshiro::rand_core::{RngCore, SeedableRng};

use crate::{Random, Seed, lattice_seed};

/// 2^-53, the spacing of unit doubles built from the top bits.
const F64_UNIT: f64 = f64::EPSILON / 2.0;

const STAFFORD_1: u64 = 0xbf58476d1ce4e5b9;
const STAFFORD_2: u64 = 0x94d049bb133111eb;
const SILVER_RATIO: u64 = 0x6a09e667f3bcc909;
const GOLDEN_RATIO: u64 = 0x9e3779b97f4a7c15;

/// xoroshiro128++ behind a 64-bit seed, the source every table and feature
/// point in grain is drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XoroshiroRandom(Xoroshiro128PlusPlus);

impl XoroshiroRandom {
    /// Spreads a 64-bit seed over both state words so that nearby seeds
    /// start far apart.
    pub fn new(seed: u64) -> Self {
        let (lo, hi) = upgrade_seed_to_u128(seed);
        Self::from_halves(lo, hi)
    }

    pub fn from_seed(seed: &Seed) -> Self {
        Self::new(seed.to_u64())
    }

    /// Uses `lo` and `hi` as the raw generator state.
    pub fn from_halves(lo: u64, hi: u64) -> Self {
        let state = (u128::from(hi) << 64) | u128::from(lo);
        Self(Xoroshiro128PlusPlus::from_seed(state.to_le_bytes()))
    }
}

impl Random for XoroshiroRandom {
    /// Lemire's multiply-and-reject, consuming one output per attempt.
    fn next_u32_bound(&mut self, bound: u32) -> u32 {
        let bound = u64::from(bound);
        let mut product = u64::from(self.next_u32()) * bound;
        if product & 0xFFFF_FFFF < bound {
            let threshold = ((1u64 << 32) - bound) % bound;
            while product & 0xFFFF_FFFF < threshold {
                product = u64::from(self.next_u32()) * bound;
            }
        }
        (product >> 32) as u32
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * F64_UNIT
    }

    fn fork(&mut self) -> Self {
        let lo = self.next_u64();
        let hi = self.next_u64();
        Self::from_halves(lo, hi)
    }

    fn fork_at(&mut self, coords: &[i64]) -> Self {
        let lo = self.next_u64() ^ lattice_seed(coords);
        let hi = self.next_u64();
        Self::from_halves(lo, hi)
    }

    /// Forks keyed by a label, so independent consumers of one seed never
    /// share a stream.
    fn fork_hash(&mut self, seed: impl AsRef<[u8]>) -> Self {
        let lo = self.next_u64();
        let hi = self.next_u64();
        let digest = Md5::digest(seed.as_ref());
        Self::from_halves(
            read_be(&digest[..8]) ^ lo,
            read_be(&digest[8..]) ^ hi,
        )
    }
}

impl RngCore for XoroshiroRandom {
    /// The low half of the next 64-bit output.
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.0.next_u64() as u32
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let word = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }
}

/// Stafford's variant 13 finaliser.
fn mix_stafford_13(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(STAFFORD_1);
    z = (z ^ (z >> 27)).wrapping_mul(STAFFORD_2);
    z ^ (z >> 31)
}

/// Spreads a 64-bit seed over both state words.
fn upgrade_seed_to_u128(seed: u64) -> (u64, u64) {
    let salted = seed ^ SILVER_RATIO;
    (
        mix_stafford_13(salted),
        mix_stafford_13(salted.wrapping_add(GOLDEN_RATIO)),
    )
}

fn read_be(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |acc, &b| (acc << 8) | u64::from(b))
}

#[cfg(test)]
mod test {
    use crate::xoroshiro::XoroshiroRandom;
    use crate::{Random, Seed};
    use rand_xoshiro::rand_core::RngCore;

    #[test]
    fn signed_outputs() {
        let mut random = XoroshiroRandom::new(1);
        let longs: Vec<i64> = (0..5).map(|_| random.next_u64() as i64).collect();
        assert_eq!(
            longs,
            [
                -1033667707219518978,
                6451672561743293322,
                -1821890263888393630,
                890086654470169703,
                8094835630745194324,
            ]
        );

        let mut random = XoroshiroRandom::new(1);
        let ints: Vec<i32> = (0..5).map(|_| random.next_u32() as i32).collect();
        assert_eq!(ints, [1734564350, 836234122, 825264738, -1425890201, 767430484]);
    }

    #[test]
    fn bounded() {
        let mut random = XoroshiroRandom::new(1);
        let drawn: Vec<u32> = [25, 256, 255, 254, 0x7FFF_FFFF]
            .into_iter()
            .map(|bound| random.next_u32_bound(bound))
            .collect();
        assert_eq!(drawn, [10, 49, 48, 169, 383715241]);
    }

    #[test]
    fn unit_doubles() {
        let mut random = XoroshiroRandom::new(1);
        let drawn: Vec<f64> = (0..5).map(|_| random.next_f64()).collect();
        assert_eq!(
            drawn,
            [
                0.9439647613102243,
                0.34974587038035987,
                0.9012351308931007,
                0.048251694223845565,
                0.4388219188383503,
            ]
        );
    }

    #[test]
    fn unit_doubles_stay_in_range() {
        let mut random = XoroshiroRandom::from_seed(&Seed::from("range"));
        for _ in 0..1000 {
            let f = random.next_f64();
            assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn forks_are_reproducible() {
        let mut a = XoroshiroRandom::new(99);
        let mut b = XoroshiroRandom::new(99);
        assert_eq!(a.fork_hash("permutation"), b.fork_hash("permutation"));
        assert_eq!(a.fork_at(&[3, -4]), b.fork_at(&[3, -4]));
        assert_eq!(a.fork(), b.fork());

        let base = XoroshiroRandom::new(99);
        let mut left = base.clone().fork_at(&[0, 1]);
        let mut right = base.clone().fork_at(&[1, 0]);
        assert_ne!(left.next_u64(), right.next_u64());
    }

    #[test]
    fn fill_bytes_handles_partial_words() {
        let mut random = XoroshiroRandom::new(5);
        let mut reference = XoroshiroRandom::new(5);
        let mut dest = [0u8; 11];
        random.fill_bytes(&mut dest);
        let first = reference.next_u64().to_le_bytes();
        let second = reference.next_u64().to_le_bytes();
        assert_eq!(dest[..8], first);
        assert_eq!(dest[8..], second[..3]);
    }
}
