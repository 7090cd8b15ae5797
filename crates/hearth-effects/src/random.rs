//! Random effect handler
//!
//! This is the one place where operating-system randomness enters the core.

use async_trait::async_trait;
use hearth_core::effects::RandomEffects;
use rand::rngs::OsRng;
use rand::RngCore;

/// Random handler backed by the operating system's CSPRNG
#[derive(Debug, Clone, Default)]
pub struct RealRandomHandler;

impl RealRandomHandler {
    /// Create a new real random handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RandomEffects for RealRandomHandler {
    async fn random_bytes(&self, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut bytes);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_random_bytes_length_and_variation() {
        let handler = RealRandomHandler::new();
        let a = handler.random_bytes(32).await;
        let b = handler.random_bytes(32).await;
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
