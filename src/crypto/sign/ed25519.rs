//! Ed25519 keypair generation via ed25519-dalek.

use super::{PUBLIC_KEY_SIZE, SECRET_KEY_SIZE};
use crate::crypto::entropy;
use crate::crypto::error::{CryptoError, Result};
use crate::crypto::sbuf::SecretBuffer;
use crate::crypto::KeyPairBytes;

/// Ed25519 signature-key operations (generation only).
pub struct Ed25519Sign;

impl Ed25519Sign {
    /// Generate a new Ed25519 keypair.
    ///
    /// The secret is the 32-byte seed in a locked buffer; the public key is
    /// the corresponding verifying key.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Entropy` or `CryptoError::SecureMemory` on
    /// DRBG or locked-allocation failure.
    pub fn generate() -> Result<KeyPairBytes> {
        let mut secret = SecretBuffer::zeroed(SECRET_KEY_SIZE)?;
        entropy::fill_random(entropy::DEFAULT_LEVEL, secret.as_mut_slice())?;

        let seed: [u8; SECRET_KEY_SIZE] =
            secret
                .expose()
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: SECRET_KEY_SIZE,
                    actual: secret.len(),
                })?;
        let sk = ed25519_dalek::SigningKey::from_bytes(&seed);
        let public = sk.verifying_key().to_bytes().to_vec();
        debug_assert_eq!(public.len(), PUBLIC_KEY_SIZE);

        Ok(KeyPairBytes { public, secret })
    }
}
