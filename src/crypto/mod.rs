//! # Cryptographic Primitives Module
//!
//! Type-safe, memory-safe primitive adapters for the GMK core.
//!
//! ## Design Principles
//!
//! 1. **Uniform adapter shape**: every cryptosystem exposes key generation
//!    plus either interactive agreement or encapsulate/decapsulate
//! 2. **Memory Safety**: secret halves live in page-locked, zero-on-drop
//!    buffers; intermediates are zeroized
//! 3. **Byte-sequence boundary**: adapters speak length-prefixed byte keys,
//!    the shape the typed key container stores
//! 4. **Testability**: every adapter has agreement/roundtrip self-tests
//!
//! ## Module Structure
//!
//! - `error` - Unified error types for all crypto operations
//! - `sbuf` - Page-locked secret buffer
//! - `entropy` - Process-wide entropy source and DRBG pool
//! - `hash` - Hash1 (64-byte BLAKE3 XOF) hashing
//! - `aead` - XChaCha20-Poly1305 authenticated encryption
//! - `ecdh` - X25519 classical key exchange
//! - `kem` - NTRU post-quantum key encapsulation
//! - `kex` - SIDH p751 post-quantum interactive key exchange
//! - `sign` - Ed25519 keygen for the reserved signature tag

// Error handling
pub mod error;

// Supporting machinery
pub mod entropy;
pub mod sbuf;

// Cryptographic primitives
pub mod aead;
pub mod ecdh;
pub mod hash;
pub mod kem;
pub mod kex;
pub mod sign;

// Re-export common types at the crypto module level
pub use error::{CryptoError, Result};

pub use hash::{hash1, hash1_secret, Blake3Hasher, HashOutput, HASH1_LEN};

pub use aead::{AeadCipher, CounterNonce, XChaCha20Key, AEAD_KEY_LEN};

pub use sbuf::SecretBuffer;

use std::fmt;

/// A freshly generated keypair at the container byte boundary.
///
/// The public half is plain bytes; the secret half is page-locked. Adapters
/// return this shape so the identity pair can append both halves without
/// knowing anything cryptosystem-specific.
pub struct KeyPairBytes {
    /// Public key bytes (safe to share)
    pub public: Vec<u8>,
    /// Secret key bytes in locked memory (zeroes on drop)
    pub secret: SecretBuffer,
}

impl fmt::Debug for KeyPairBytes {
    /// Redacted: the secret half never renders.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPairBytes")
            .field("public_len", &self.public.len())
            .field("secret", &self.secret)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_debug_is_redacted() {
        let kp = KeyPairBytes {
            public: vec![1, 2, 3],
            secret: SecretBuffer::from_plain(b"sssh").unwrap(),
        };
        let rendered = format!("{:?}", kp);
        assert!(!rendered.contains("sssh"));
    }

    #[test]
    fn test_hash_len_covers_aead_key_len() {
        assert!(HASH1_LEN >= AEAD_KEY_LEN);
    }
}
