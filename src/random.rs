use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::MIN_DURATION;

/// Source of the random choices behind every animation.
///
/// Shared between the interactive thread and the background workers, hence
/// `&self` methods and the `Send + Sync` bound.
pub trait RandomGenerator: Send + Sync {
    /// Uniform value in `[min, max]`.
    fn uniform(&self, min: f64, max: f64) -> f64;

    /// Fair coin flip.
    fn boolean(&self) -> bool;
}

/// Thread-local generator from `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomGenerator for ThreadRandom {
    fn uniform(&self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        rand::rng().random_range(min..=max)
    }

    fn boolean(&self) -> bool {
        rand::rng().random_bool(0.5)
    }
}

/// Reproducible generator for tests and `--seed` runs.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomGenerator for SeededRandom {
    fn uniform(&self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random_range(min..=max)
    }

    fn boolean(&self) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random_bool(0.5)
    }
}

/// `base` moved by up to `deviation` in either direction, never below
/// [`MIN_DURATION`].
pub fn jitter(rng: &dyn RandomGenerator, base: f64, deviation: f64) -> f64 {
    let offset = if deviation > 0.0 {
        rng.uniform(-deviation, deviation)
    } else {
        0.0
    };
    (base + offset).max(MIN_DURATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_stays_in_range() {
        let rng = SeededRandom::new(7);
        for _ in 0..1000 {
            let v = rng.uniform(-2.0, 3.0);
            assert!((-2.0..=3.0).contains(&v));
        }
        assert_eq!(ThreadRandom.uniform(4.0, 4.0), 4.0);
    }

    #[test]
    fn seeded_generators_repeat() {
        let a = SeededRandom::new(42);
        let b = SeededRandom::new(42);
        for _ in 0..32 {
            assert_eq!(a.uniform(0.0, 1.0), b.uniform(0.0, 1.0));
            assert_eq!(a.boolean(), b.boolean());
        }
    }

    #[test]
    fn boolean_produces_both_values() {
        let rng = SeededRandom::new(1);
        let trues = (0..200).filter(|_| rng.boolean()).count();
        assert!(trues > 50 && trues < 150, "trues = {trues}");
    }

    #[test]
    fn jitter_without_deviation_is_exact() {
        let rng = SeededRandom::new(3);
        assert_eq!(jitter(&rng, 10.0, 0.0), 10.0);
        for _ in 0..100 {
            let d = jitter(&rng, 10.0, 2.0);
            assert!((8.0..=12.0).contains(&d));
        }
        assert_eq!(jitter(&rng, -1.0, 0.0), MIN_DURATION);
    }
}
