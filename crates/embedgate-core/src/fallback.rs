//! Deterministic fallback embeddings.
//!
//! When no real backend can answer, the gateway still returns a
//! syntactically valid embedding. The vector is a pure function of the input
//! values: the seed comes from their sum, so identical inputs always yield
//! bit-identical output.
//!
//! Seed: `trunc(sum(input) * 1000)` as a two's-complement integer masked to
//! 32 bits (empty input seeds 0). Generator: ChaCha8 seeded with that value.
//! Distribution: standard normal (mean 0, std 1), one draw per dimension.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use embedgate_types::embedding::{EMBEDDING_DIM, Embedding};

/// Scale applied to the input sum before truncation, so small differences
/// in the input still change the seed.
const SEED_SCALE: f64 = 1000.0;

/// Produces seeded pseudo-random embeddings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicFallbackGenerator;

impl DeterministicFallbackGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Derive the generator seed for `input`.
    pub fn seed_for(input: &[f32]) -> u64 {
        let sum: f64 = input.iter().map(|&v| f64::from(v)).sum();
        let scaled = (sum * SEED_SCALE).trunc();
        // `as` saturates on overflow and maps NaN to 0.
        (scaled as i64 as u64) & 0xFFFF_FFFF
    }

    /// Generate the fallback embedding for `input`.
    pub fn generate(&self, input: &[f32]) -> Embedding {
        let mut rng = ChaCha8Rng::seed_from_u64(Self::seed_for(input));
        let values: Vec<f32> = (0..EMBEDDING_DIM)
            .map(|_| rng.sample::<f32, _>(StandardNormal))
            .collect();
        // Normal draws are always finite and the length is fixed.
        Embedding::try_from(values).unwrap_or_else(|_| Embedding::zeros())
    }
}
