use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The engine's sole source of non-determinism. Every decision that isn't a
/// pure function of state MUST draw from this RNG — `std`'s thread-local
/// source is forbidden so that `simulate(inputs, seed)` is byte-identical
/// across runs (see spec §8, Determinism).
///
/// Reseeding mid-match is not exposed; a `MatchRng` is created once from the
/// caller's seed and lives for the whole match.
pub struct MatchRng {
    inner: ChaCha8Rng,
}

impl MatchRng {
    pub fn from_seed(seed: u64) -> Self {
        MatchRng {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.random()
    }

    /// Uniform float in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    pub fn uniform(&mut self, low: f32, high: f32) -> f32 {
        if high <= low {
            return low;
        }
        low + (high - low) * self.inner.random::<f32>()
    }

    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.inner.random::<f64>() < p.clamp(0.0, 1.0)
    }

    /// Weighted choice over `0..weights.len()`. Returns `None` if every
    /// weight is non-positive.
    pub fn weighted_choice(&mut self, weights: &[f32]) -> Option<usize> {
        let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }

        let mut roll = self.inner.random::<f32>() * total;
        for (idx, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            if roll < *weight {
                return Some(idx);
            }
            roll -= *weight;
        }

        weights.iter().rposition(|w| *w > 0.0)
    }
}
