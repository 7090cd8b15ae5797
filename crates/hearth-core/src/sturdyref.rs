//! Sturdy-reference codec
//!
//! A sturdy reference is a bearer secret: whoever holds it holds the capability. Only
//! [`id_of`] of the secret is ever persisted, so a dump of the token store yields no usable
//! capabilities.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::effects::RandomEffects;
use crate::hash::hash;
use crate::identifiers::TokenId;

/// Bearer secret of a capability token. Zeroized on drop; `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Secret(Vec<u8>);

impl Secret {
    /// Wrap secret bytes exactly as presented by a holder
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Wrap a textual secret
    pub fn from_text(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }

    /// The secret bytes that are hashed into the token id
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The secret as text, when it is valid UTF-8 (always true for generated secrets)
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Storage identity of this secret
    pub fn token_id(&self) -> TokenId {
        id_of(self)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

/// Derive a token's storage identity from its secret. One-way.
pub fn id_of(secret: &Secret) -> TokenId {
    TokenId::from_bytes(hash(secret.as_bytes()))
}

/// Generate a fresh secret carrying `entropy_bytes` bytes from a secure random source.
///
/// The secret is the URL-safe base64 text of those bytes, so holders can pass it around as
/// a plain string.
pub async fn generate_secret<R>(random: &R, entropy_bytes: usize) -> Secret
where
    R: RandomEffects + ?Sized,
{
    let mut bytes = random.random_bytes(entropy_bytes).await;
    let text = URL_SAFE_NO_PAD.encode(&bytes);
    bytes.zeroize();
    Secret(text.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct CountingRandom(std::sync::atomic::AtomicU8);

    #[async_trait]
    impl RandomEffects for CountingRandom {
        async fn random_bytes(&self, len: usize) -> Vec<u8> {
            let seed = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            vec![seed; len]
        }
    }

    #[test]
    fn test_id_is_hash_of_secret_bytes() {
        let secret = Secret::from_text("sturdy");
        assert_eq!(secret.token_id().as_bytes(), &hash(b"sturdy"));
        assert_eq!(id_of(&secret), secret.token_id());
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = Secret::from_text("do-not-print");
        assert!(!format!("{secret:?}").contains("do-not-print"));
    }

    #[tokio::test]
    async fn test_generated_secrets_are_text_and_distinct() {
        let random = CountingRandom(std::sync::atomic::AtomicU8::new(1));
        let a = generate_secret(&random, 32).await;
        let b = generate_secret(&random, 32).await;

        assert_ne!(a, b);
        assert_ne!(a.token_id(), b.token_id());
        // 32 bytes of entropy -> 43 characters of unpadded base64
        assert_eq!(a.as_text().map(str::len), Some(43));
    }

    #[test]
    fn test_secret_serde_preserves_bytes() {
        let secret = Secret::from_bytes(vec![0u8, 255, 17]);
        let json = serde_json::to_string(&secret).unwrap();
        let back: Secret = serde_json::from_str(&json).unwrap();
        assert_eq!(back, secret);
    }
}
