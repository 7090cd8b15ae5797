//! Seeded randomness

use async_trait::async_trait;
use hearth_core::effects::RandomEffects;
use rand::RngCore;
use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};
use std::sync::{Arc, Mutex};

/// Deterministic random source backed by ChaCha20. Clones share the same stream.
#[derive(Debug, Clone)]
pub struct DeterministicRandom {
    rng: Arc<Mutex<ChaCha20Rng>>,
}

impl Default for DeterministicRandom {
    fn default() -> Self {
        Self::with_seed([42; 32])
    }
}

impl DeterministicRandom {
    /// Stream seeded with `seed`
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            rng: Arc::new(Mutex::new(ChaCha20Rng::from_seed(seed))),
        }
    }
}

#[async_trait]
impl RandomEffects for DeterministicRandom {
    async fn random_bytes(&self, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        self.rng.lock().unwrap().fill_bytes(&mut bytes);
        bytes
    }
}
