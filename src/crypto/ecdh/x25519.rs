//! # X25519 KEX Implementation
//!
//! Elliptic curve Diffie-Hellman key exchange using X25519
//! via the x25519-dalek crate.
//!
//! ## Security Properties
//!
//! - 128-bit security level
//! - 32-byte public key, 32-byte secret key, 32-byte shared secret
//! - Constant-time operations; secret bytes live in locked memory
//!
//! ## Usage
//!
//! ```
//! use gmk_core::crypto::ecdh::X25519Kex;
//!
//! let alice = X25519Kex::generate().unwrap();
//! let bob = X25519Kex::generate().unwrap();
//!
//! let ss_a = X25519Kex::agree(alice.secret.expose(), &bob.public).unwrap();
//! let ss_b = X25519Kex::agree(bob.secret.expose(), &alice.public).unwrap();
//! assert_eq!(ss_a, ss_b);
//! ```

use super::{PUBLIC_KEY_SIZE, SECRET_KEY_SIZE};
use crate::crypto::entropy;
use crate::crypto::error::{CryptoError, Result};
use crate::crypto::sbuf::SecretBuffer;
use crate::crypto::KeyPairBytes;

/// X25519 key exchange operations.
///
/// All operations are implemented as associated functions (no instance
/// state); randomness comes from the process-wide DRBG pool.
pub struct X25519Kex;

impl X25519Kex {
    /// Generate a new X25519 keypair.
    ///
    /// The secret is 32 DRBG bytes held in a locked buffer; the public key
    /// is the scalar multiple of the curve basepoint.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Entropy` if the DRBG cannot be instantiated
    /// or `CryptoError::SecureMemory` if the locked allocation fails.
    pub fn generate() -> Result<KeyPairBytes> {
        let mut secret = SecretBuffer::zeroed(SECRET_KEY_SIZE)?;
        entropy::fill_random(entropy::DEFAULT_LEVEL, secret.as_mut_slice())?;

        let sk = x25519_dalek::StaticSecret::from(Self::scalar(secret.expose())?);
        let public = x25519_dalek::PublicKey::from(&sk);

        Ok(KeyPairBytes {
            public: public.as_bytes().to_vec(),
            secret,
        })
    }

    /// Perform Diffie-Hellman key agreement.
    ///
    /// Computes a shared secret from the local secret key bytes and the
    /// remote party's public key bytes. Both parties derive the same
    /// shared secret when using their own secret and the other's public.
    ///
    /// # Errors
    ///
    /// - `CryptoError::InvalidKeyLength` if either input is not 32 bytes
    /// - `CryptoError::Primitive` if the resulting shared secret is all
    ///   zeros, which indicates the remote public key is a low-order point
    ///   (a potential small-subgroup attack)
    pub fn agree(secret_key: &[u8], public_key: &[u8]) -> Result<SecretBuffer> {
        let sk = x25519_dalek::StaticSecret::from(Self::scalar(secret_key)?);
        let pk = x25519_dalek::PublicKey::from(Self::point(public_key)?);

        let shared = sk.diffie_hellman(&pk);
        let shared_bytes = shared.to_bytes();

        // Reject all-zero shared secret (low-order point attack)
        if shared_bytes.iter().all(|&b| b == 0) {
            return Err(CryptoError::primitive(
                "x25519::agree",
                "shared secret is all zeros: possible low-order point",
            ));
        }

        SecretBuffer::from_plain(&shared_bytes)
    }

    /// Derive the public key from stored secret key bytes.
    ///
    /// Useful when reconstructing the public half from a loaded secret
    /// container.
    pub fn public_from_secret(secret_key: &[u8]) -> Result<Vec<u8>> {
        let sk = x25519_dalek::StaticSecret::from(Self::scalar(secret_key)?);
        let public = x25519_dalek::PublicKey::from(&sk);
        Ok(public.as_bytes().to_vec())
    }

    fn scalar(bytes: &[u8]) -> Result<[u8; SECRET_KEY_SIZE]> {
        bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: SECRET_KEY_SIZE,
                actual: bytes.len(),
            })
    }

    fn point(bytes: &[u8]) -> Result<[u8; PUBLIC_KEY_SIZE]> {
        bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: PUBLIC_KEY_SIZE,
                actual: bytes.len(),
            })
    }
}


// -- Property-based tests (proptest) ----------------------------------------

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// DH exchange must be symmetric: DH(a, B) == DH(b, A)
        #[test]
        fn prop_dh_symmetry(_seed in 0u64..50) {
            let alice = X25519Kex::generate().unwrap();
            let bob = X25519Kex::generate().unwrap();

            let ss_alice = X25519Kex::agree(alice.secret.expose(), &bob.public).unwrap();
            let ss_bob = X25519Kex::agree(bob.secret.expose(), &alice.public).unwrap();
            prop_assert_eq!(ss_alice.expose(), ss_bob.expose());
        }

        /// Shared secret is always exactly 32 bytes
        #[test]
        fn prop_shared_secret_length(_seed in 0u64..20) {
            let alice = X25519Kex::generate().unwrap();
            let bob = X25519Kex::generate().unwrap();
            let ss = X25519Kex::agree(alice.secret.expose(), &bob.public).unwrap();
            prop_assert_eq!(ss.len(), super::super::SHARED_SECRET_SIZE);
        }
    }
}
