//! Secure randomness effect

use async_trait::async_trait;
use std::sync::Arc;

/// Cryptographically secure random source used for secret generation
#[async_trait]
pub trait RandomEffects: Send + Sync {
    /// `len` bytes of unguessable randomness
    async fn random_bytes(&self, len: usize) -> Vec<u8>;
}

#[async_trait]
impl<T: RandomEffects + ?Sized> RandomEffects for Arc<T> {
    async fn random_bytes(&self, len: usize) -> Vec<u8> {
        (**self).random_bytes(len).await
    }
}
