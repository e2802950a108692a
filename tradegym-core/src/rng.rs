//! Deterministic seed hierarchy.
//!
//! A master seed expands into one sub-seed per `(stream, episode)` pair via
//! BLAKE3. Derivation is hash-based rather than sequential, so the seed for
//! episode 7 of the price sampler does not depend on how many other episodes
//! or streams were drawn first, or on which rollout thread draws it.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Stream name for randomized trade-price sampling.
pub const PRICE_STREAM: &str = "price-sampling";

/// Stream name for reference agents driving rollouts.
pub const AGENT_STREAM: &str = "agent";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedHierarchy {
    master_seed: u64,
}

impl SeedHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed for `(stream, episode)`.
    pub fn sub_seed(&self, stream: &str, episode: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(stream.as_bytes());
        hasher.update(&episode.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    pub fn rng_for(&self, stream: &str, episode: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(stream, episode))
    }
}
