//! A simple pseudorandom number generator.
//!
//! Specifically, the xorshift128 generator from p. 5 of Marsaglia,
//! [Xorshift RNGs](https://doi.org/10.18637/jss.v008.i14), implemented to
//! satisfy the [RngCore]/[SeedableRng] traits.
//!
//! The solver is deterministic with respect to its seed: given the same
//! 32-bit seed and the same input, every random draw repeats exactly, and
//! with it every solver trajectory.
//!
//! Beyond the traits, [next_double](Xorshift128::next_double) and
//! [below](Xorshift128::below) expose the two draws the solver actually
//! makes: a double in `[0, 1)` and a bounded integer.

use rand::SeedableRng;
use rand_core::{impls, Error, RngCore};

/// The default seed. Entirely unmotivated, but fixed for reproducibility.
pub const DEFAULT_SEED: u32 = 91_648_253;

const MIX_A: u32 = 123_479_117;
const MIX_B: u32 = 0x8248_522B; // low 32 bits of 62346811819

/// Four words of xorshift state, never all zero.
pub struct Xorshift128 {
    a: u32,
    b: u32,
    c: u32,
    d: u32,
}

impl Default for Xorshift128 {
    fn default() -> Self {
        Xorshift128::from_u32_seed(DEFAULT_SEED)
    }
}

impl Xorshift128 {
    /// Seed the generator from a 32-bit seed.
    ///
    /// The seed is mixed into each state word with masks chosen so no word
    /// can be zero, keeping the state valid for any seed.
    pub fn from_u32_seed(seed: u32) -> Self {
        Xorshift128 {
            a: seed & MIX_A,
            b: seed | MIX_A,
            c: seed & MIX_B,
            d: seed | MIX_B,
        }
    }

    /// A double drawn uniformly from `[0, 1)`.
    pub fn next_double(&mut self) -> f64 {
        self.next_u32() as f64 * (1.0 / (65536.0 * 65536.0))
    }

    /// An integer drawn uniformly from `[0, max)`.
    pub fn below(&mut self, max: usize) -> usize {
        debug_assert!(max > 0);
        self.next_u32() as usize % max
    }
}

impl RngCore for Xorshift128 {
    fn next_u32(&mut self) -> u32 {
        let mut t = self.d;
        let s = self.a;

        self.d = self.c;
        self.c = self.b;
        self.b = s;

        t ^= t << 11;
        t ^= t >> 8;
        self.a = t ^ s ^ (s >> 19);
        self.a
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u32() as u64
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Xorshift128 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Xorshift128::from_u32_seed(u32::from_le_bytes(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinism() {
        let mut first = Xorshift128::from_u32_seed(DEFAULT_SEED);
        let mut second = Xorshift128::from_u32_seed(DEFAULT_SEED);

        for _ in 0..1000 {
            assert_eq!(first.next_u32(), second.next_u32());
        }
    }

    #[test]
    fn seeds_diverge() {
        let mut first = Xorshift128::from_u32_seed(1);
        let mut second = Xorshift128::from_u32_seed(2);

        let firsts: Vec<u32> = (0..8).map(|_| first.next_u32()).collect();
        let seconds: Vec<u32> = (0..8).map(|_| second.next_u32()).collect();
        assert_ne!(firsts, seconds);
    }

    #[test]
    fn doubles_in_unit_interval() {
        let mut rng = Xorshift128::default();
        for _ in 0..1000 {
            let x = rng.next_double();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn below_in_bounds() {
        let mut rng = Xorshift128::default();
        for max in 1..64 {
            assert!(rng.below(max) < max);
        }
    }
}
