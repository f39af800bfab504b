//! Injectable pseudo-random sources.
//!
//! Both the masonry engine (sampling with replacement) and the card stack
//! (drawing without replacement) take a [`RandomSource`] so tests can pin a
//! seed and assert exact orderings.

use std::time::{SystemTime, UNIX_EPOCH};

const LCG_MODULUS: f64 = 2_147_483_648.0;
const LCG_MULTIPLIER: f64 = 1_103_515_245.0;
const LCG_INCREMENT: f64 = 12_345.0;

/// Seed used for the default content shuffle.
pub const DEFAULT_SHUFFLE_SEED: u64 = 12_345;

/// A source of uniformly distributed floats in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len`. Returns `None` for an empty range.
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let idx = (self.next_f64() * len as f64).floor() as usize;
        Some(idx.min(len - 1))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Linear congruential generator (`state = (a * state + c) mod 2^31`).
///
/// The step is evaluated in `f64`, so once `a * state` exceeds 2^53 the
/// product rounds. Published card orderings were generated with exactly this
/// arithmetic; an exact integer LCG diverges from the second draw on.
///
/// Cheap and reproducible; not suitable for anything security related.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    state: f64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            state: (seed % (1 << 31)) as f64,
        }
    }

    /// Seed from the wall clock. Used when no seed is supplied.
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(DEFAULT_SHUFFLE_SEED);
        Self::new(nanos)
    }

    fn step(&mut self) -> f64 {
        self.state = (LCG_MULTIPLIER * self.state + LCG_INCREMENT) % LCG_MODULUS;
        self.state
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.step() / LCG_MODULUS
    }
}

/// Fisher-Yates shuffle returning a new vector; the input is left untouched.
pub fn shuffle<T: Clone, R: RandomSource + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = ((rng.next_f64() * (i + 1) as f64).floor() as usize).min(i);
        shuffled.swap(i, j);
    }
    shuffled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        for _ in 0..32 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn values_stay_in_unit_interval() {
        let mut r = SeededRandom::new(7);
        for _ in 0..1000 {
            let v = r.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn first_step_matches_lcg_formula() {
        let mut r = SeededRandom::new(1);
        let expected = (1_103_515_245u64 + 12_345) % 0x8000_0000;
        assert_eq!(r.next_f64(), expected as f64 / 0x8000_0000u64 as f64);
    }

    #[test]
    fn rounded_product_sequence_is_reproduced() {
        let mut r = SeededRandom::new(DEFAULT_SHUFFLE_SEED);
        assert_eq!(r.next_f64(), 0.6551540484651923);
        assert_eq!(r.next_f64(), 0.30481433868408203);
        assert_eq!(r.next_f64(), 0.6324834823608398);
    }

    #[test]
    fn default_seed_shuffle_order_is_pinned() {
        let items: Vec<u32> = (0..10).collect();
        let out = shuffle(&items, &mut SeededRandom::new(DEFAULT_SHUFFLE_SEED));
        assert_eq!(out, vec![7, 1, 8, 0, 3, 4, 9, 5, 2, 6]);
    }

    #[test]
    fn pick_index_empty_is_none() {
        let mut r = SeededRandom::new(3);
        assert_eq!(r.pick_index(0), None);
        assert!(r.pick_index(5).unwrap() < 5);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let items: Vec<u32> = (0..50).collect();
        let mut r = SeededRandom::new(DEFAULT_SHUFFLE_SEED);
        let mut out = shuffle(&items, &mut r);
        assert_ne!(out, items);
        out.sort_unstable();
        assert_eq!(out, items);
    }

    #[test]
    fn shuffle_is_deterministic_for_a_seed() {
        let items = vec!["a", "b", "c", "d", "e", "f"];
        let first = shuffle(&items, &mut SeededRandom::new(99));
        let second = shuffle(&items, &mut SeededRandom::new(99));
        assert_eq!(first, second);
    }
}
