//! Pure synchronous hashing for sturdy-ref identities
//!
//! A token's storage identity is the digest of its secret. Hashing is deterministic and
//! side-effect free, so it lives outside the effect system; the algorithm is selected once,
//! here, and every caller goes through [`hash`].
//!
//! Current algorithm: **SHA-256** (256-bit / 32-byte output)

use sha2::{Digest, Sha256};
use std::fmt;

/// Synchronous trait for one-way hashing
///
/// Different inputs must not plausibly collide, and the digest must not reveal the input.
pub trait HashAlgorithm: Send + Sync + fmt::Debug {
    /// Hash arbitrary bytes to a 32-byte digest
    fn hash(&self, data: &[u8]) -> [u8; 32];
}

/// SHA-256 hash implementation
#[derive(Debug, Clone, Copy)]
pub struct Sha256Algorithm;

impl HashAlgorithm for Sha256Algorithm {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        let mut output = [0u8; 32];
        output.copy_from_slice(&result);
        output
    }
}

/// The hash algorithm used for every token id in the system.
///
/// Changing this constant invalidates every stored token id.
pub const ALGORITHM: Sha256Algorithm = Sha256Algorithm;

/// Hash `data` with the global algorithm
#[inline]
pub fn hash(data: &[u8]) -> [u8; 32] {
    ALGORITHM.hash(data)
}
