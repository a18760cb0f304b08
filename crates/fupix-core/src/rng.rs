#![forbid(unsafe_code)]

//! Small deterministic PRNG for visual randomness.
//!
//! Particle scatter, easing coefficients and flicker only need cheap,
//! reproducible noise. [`Rng`] is a xorshift64 generator: the host seeds it
//! once (for example from the page clock) and tests seed it with constants.
//!
//! # Invariants
//!
//! 1. [`Rng::next_f32`] is in `[0.0, 1.0)`.
//! 2. [`Rng::range`] is in `[lo, hi)` for `lo < hi`, and returns `lo` otherwise.
//! 3. The same seed always yields the same sequence.

use std::f32::consts::TAU;

/// xorshift64 generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a generator from `seed`. A zero internal state is remapped.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1).max(1),
        }
    }

    /// Next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform float in `[0.0, 1.0)`.
    pub fn next_f32(&mut self) -> f32 {
        // 24 high bits fit exactly in an f32 mantissa.
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform float in `[lo, hi)`.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        let v = lo + (hi - lo) * self.next_f32();
        // Rounding can land exactly on `hi` for wide ranges.
        if v >= hi { lo } else { v }
    }

    /// Uniform angle in `[0, 2π)`.
    pub fn angle(&mut self) -> f32 {
        self.range(0.0, TAU)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn wrapping_seed_does_not_stall() {
        let mut rng = Rng::new(u64::MAX);
        let first = rng.next_u64();
        assert_ne!(first, 0);
        assert_ne!(rng.next_u64(), first);
    }

    #[test]
    fn unit_interval() {
        let mut rng = Rng::new(7);
        for _ in 0..10_000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v), "{v}");
        }
    }

    #[test]
    fn range_bounds() {
        let mut rng = Rng::new(9);
        for _ in 0..10_000 {
            let v = rng.range(500.0, 1000.0);
            assert!((500.0..1000.0).contains(&v), "{v}");
        }
        assert_eq!(rng.range(3.0, 3.0), 3.0);
        assert_eq!(rng.range(5.0, 1.0), 5.0);
    }
}
