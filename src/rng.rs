//! Seedable randomness source.
//!
//! All nondeterminism in the engine (bomb placement and the cosmetic
//! low value shown on hidden bombs) flows through [`EngineRng`], so a
//! fixed seed replays an identical round.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct EngineRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl EngineRng {
    /// Deterministic source with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Source seeded from the system generator.
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    /// The seed this source was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform index in `[0, len)`.
    pub(crate) fn index(&mut self, len: usize) -> usize {
        self.inner.random_range(0..len)
    }

    /// Uniform percentage in `[lo, hi]`.
    pub(crate) fn percent_in(&mut self, lo: u8, hi: u8) -> u8 {
        self.inner.random_range(lo..=hi)
    }
}

impl Default for EngineRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
