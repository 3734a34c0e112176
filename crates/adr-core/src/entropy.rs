//! Pluggable randomness
//!
//! Every random draw in the pipeline (priorities, confidence scores, the
//! pre-dispute fade/escalate branch, ids, manifest hash tokens) goes through
//! [`Entropy`]. Any `rand::RngCore` is an entropy source, so a seeded
//! `StdRng` reproduces a whole session; tests can supply their own
//! implementation to force individual branches.

use rand::{Rng, RngCore};
use uuid::Uuid;

/// Source of randomness for the simulation
pub trait Entropy {
    /// Returns `true` with the given probability, clamped to `[0, 1]`.
    fn chance(&mut self, probability: f64) -> bool;

    /// Uniform float in `[0, 1)`
    fn unit(&mut self) -> f64;

    /// Uniform integer in `[0, bound)`; zero when `bound` is zero
    fn below(&mut self, bound: u64) -> u64;

    /// Fill `dest` with random bytes
    fn fill_random(&mut self, dest: &mut [u8]);
}

impl<R: RngCore + ?Sized> Entropy for R {
    fn chance(&mut self, probability: f64) -> bool {
        if probability.is_nan() {
            return false;
        }
        self.gen_bool(probability.clamp(0.0, 1.0))
    }

    fn unit(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            0
        } else {
            self.gen_range(0..bound)
        }
    }

    fn fill_random(&mut self, dest: &mut [u8]) {
        self.fill_bytes(dest);
    }
}

/// Draw a version 4 UUID
#[must_use]
pub fn uuid_v4<E: Entropy + ?Sized>(entropy: &mut E) -> Uuid {
    let mut bytes = [0u8; 16];
    entropy.fill_random(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

/// Opaque 16-hex-char token used as a placeholder manifest hash.
///
/// Not a digest of anything.
#[must_use]
pub fn hash_token<E: Entropy + ?Sized>(entropy: &mut E) -> String {
    let mut bytes = [0u8; 8];
    entropy.fill_random(&mut bytes);
    hex::encode(bytes)
}

/// Pick one element uniformly; `None` for an empty slice
pub fn pick<'a, T, E: Entropy + ?Sized>(entropy: &mut E, items: &'a [T]) -> Option<&'a T> {
    let len = u64::try_from(items.len()).ok()?;
    let index = usize::try_from(entropy.below(len)).ok()?;
    items.get(index)
}

/// Uniform integer in `[0, bound)` as `i64`
pub fn below_i64<E: Entropy + ?Sized>(entropy: &mut E, bound: u64) -> i64 {
    i64::try_from(entropy.below(bound)).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn chance_extremes_are_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(rng.chance(1.0));
            assert!(!rng.chance(0.0));
            assert!(!rng.chance(f64::NAN));
            assert!(rng.chance(3.5));
        }
    }

    #[test]
    fn below_zero_bound_is_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(rng.below(0), 0);
        for _ in 0..100 {
            assert!(rng.below(5) < 5);
        }
    }

    #[test]
    fn uuid_is_v4_and_seed_stable() {
        let a = uuid_v4(&mut StdRng::seed_from_u64(1));
        let b = uuid_v4(&mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
        assert_eq!(a.get_version_num(), 4);
    }

    #[test]
    fn hash_tokens_are_hex_and_distinct() {
        let mut rng = StdRng::seed_from_u64(3);
        let first = hash_token(&mut rng);
        let second = hash_token(&mut rng);
        assert_eq!(first.len(), 16);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[test]
    fn pick_empty_is_none() {
        let mut rng = StdRng::seed_from_u64(3);
        let empty: [u8; 0] = [];
        assert!(pick(&mut rng, &empty).is_none());
        assert_eq!(pick(&mut rng, &[9]), Some(&9));
    }
}
