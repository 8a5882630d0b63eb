//! Randomness seam for every mock generator in the crate.
//!
//! Stubs never reach for a global RNG. They take a `&mut dyn RandomSource`, so
//! callers decide whether draws come from the thread generator, a seeded
//! `StdRng`, or a fixed script.

use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::VecDeque;

/// Source of uniform draws used by the stubs. Both bounds are inclusive.
pub trait RandomSource: Send {
    fn uniform_f64(&mut self, low: f64, high: f64) -> f64;
    fn uniform_int(&mut self, low: u32, high: u32) -> u32;
}

/// Production source backed by the thread-local generator
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn uniform_f64(&mut self, low: f64, high: f64) -> f64 {
        rand::rng().random_range(low..=high)
    }

    fn uniform_int(&mut self, low: u32, high: u32) -> u32 {
        rand::rng().random_range(low..=high)
    }
}

/// Reproducible source backed by a seeded `StdRng`
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn uniform_f64(&mut self, low: f64, high: f64) -> f64 {
        self.rng.random_range(low..=high)
    }

    fn uniform_int(&mut self, low: u32, high: u32) -> u32 {
        self.rng.random_range(low..=high)
    }
}

/// Replays fixed values in order.
///
/// Values are clamped into the requested range. Once a queue runs dry the lower
/// bound is returned.
#[derive(Debug, Default, Clone)]
pub struct ScriptedRandom {
    floats: VecDeque<f64>,
    ints: VecDeque<u32>,
}

impl ScriptedRandom {
    pub fn new(floats: impl IntoIterator<Item = f64>, ints: impl IntoIterator<Item = u32>) -> Self {
        Self {
            floats: floats.into_iter().collect(),
            ints: ints.into_iter().collect(),
        }
    }

    pub fn floats(values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(values, std::iter::empty())
    }

    pub fn ints(values: impl IntoIterator<Item = u32>) -> Self {
        Self::new(std::iter::empty(), values)
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform_f64(&mut self, low: f64, high: f64) -> f64 {
        self.floats
            .pop_front()
            .map(|v| v.clamp(low, high))
            .unwrap_or(low)
    }

    fn uniform_int(&mut self, low: u32, high: u32) -> u32 {
        self.ints
            .pop_front()
            .map(|v| v.clamp(low, high))
            .unwrap_or(low)
    }
}

/// Round to a fixed number of decimal places
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_sources_repeat() {
        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        for _ in 0..20 {
            assert_eq!(a.uniform_int(1, 8), b.uniform_int(1, 8));
            assert_eq!(a.uniform_f64(0.2, 0.98), b.uniform_f64(0.2, 0.98));
        }
    }

    #[test]
    fn thread_source_stays_in_bounds() {
        let mut rng = ThreadRandom;
        for _ in 0..200 {
            let f = rng.uniform_f64(0.2, 0.98);
            assert!((0.2..=0.98).contains(&f));
            let i = rng.uniform_int(10, 40);
            assert!((10..=40).contains(&i));
        }
    }

    #[test]
    fn scripted_source_clamps_and_falls_back() {
        let mut rng = ScriptedRandom::new([0.5, 5.0], [3, 100]);
        assert_eq!(rng.uniform_f64(0.2, 0.98), 0.5);
        assert_eq!(rng.uniform_f64(0.2, 0.98), 0.98);
        assert_eq!(rng.uniform_f64(0.2, 0.98), 0.2);
        assert_eq!(rng.uniform_int(1, 8), 3);
        assert_eq!(rng.uniform_int(1, 8), 8);
        assert_eq!(rng.uniform_int(1, 8), 1);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(0.7349, 2), 0.73);
        assert_eq!(round_to(12.345678, 4), 12.3457);
    }
}
