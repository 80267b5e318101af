//! # NTRU KEM Implementation
//!
//! One-shot key encapsulation using NTRU-HPS-2048-509 via the PQClean
//! reference implementation (`pqcrypto-ntru`).
//!
//! ## Security Properties
//!
//! - NIST security category 1 (128-bit)
//! - IND-CCA2 secure key encapsulation
//! - Decapsulation with a wrong key or tampered ciphertext yields implicit
//!   rejection: a valid-looking but non-matching shared secret
//!
//! The adapter moves keys as byte sequences (public plain, secret locked),
//! the shape the typed key container stores; the crate's typed wrappers are
//! reconstructed at the call boundary with full length validation.

use crate::crypto::error::{CryptoError, Result};
use crate::crypto::sbuf::SecretBuffer;
use crate::crypto::KeyPairBytes;
use pqcrypto_ntru::ntruhps2048509;
use pqcrypto_traits::kem::{
    Ciphertext as CiphertextTrait, PublicKey as PublicKeyTrait, SecretKey as SecretKeyTrait,
    SharedSecret as SharedSecretTrait,
};

/// NTRU-HPS-2048-509 public key size in bytes
pub const PUBLIC_KEY_SIZE: usize = 699;

/// NTRU-HPS-2048-509 secret key size in bytes
pub const SECRET_KEY_SIZE: usize = 935;

/// NTRU-HPS-2048-509 ciphertext size in bytes
pub const CIPHERTEXT_SIZE: usize = 699;

/// NTRU shared secret size in bytes
pub const SHARED_SECRET_SIZE: usize = 32;

/// NTRU KEM operations.
///
/// Provides key generation, encapsulation, and decapsulation using the
/// NTRU-HPS-2048-509 post-quantum key encapsulation mechanism.
///
/// All operations are implemented as associated functions (no instance state).
pub struct NtruKem;

impl NtruKem {
    /// Generate a new NTRU keypair.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if the locked secret allocation
    /// fails. The PQClean sizes are asserted; a mismatch aborts as a
    /// programming bug.
    pub fn generate() -> Result<KeyPairBytes> {
        let (pk, sk) = ntruhps2048509::keypair();

        let pk_bytes = PublicKeyTrait::as_bytes(&pk);
        let sk_bytes = SecretKeyTrait::as_bytes(&sk);
        assert_eq!(pk_bytes.len(), PUBLIC_KEY_SIZE);
        assert_eq!(sk_bytes.len(), SECRET_KEY_SIZE);

        Ok(KeyPairBytes {
            public: pk_bytes.to_vec(),
            secret: SecretBuffer::from_plain(sk_bytes)?,
        })
    }

    /// Encapsulate a shared secret using the recipient's public key.
    ///
    /// The sender calls this with the recipient's public key bytes to
    /// produce a ciphertext for the handshake transcript plus the shared
    /// secret both sides will use.
    ///
    /// # Returns
    ///
    /// A tuple of `(ciphertext, shared_secret)` on success.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Primitive` if the public key bytes are not a
    /// valid NTRU public key.
    pub fn encapsulate(public_key: &[u8]) -> Result<(Vec<u8>, SecretBuffer)> {
        let pk = <ntruhps2048509::PublicKey as PublicKeyTrait>::from_bytes(public_key)
            .map_err(|e| CryptoError::primitive("ntru::encapsulate", e.to_string()))?;

        let (ss, ct) = ntruhps2048509::encapsulate(&pk);

        let ct_bytes = CiphertextTrait::as_bytes(&ct);
        assert_eq!(ct_bytes.len(), CIPHERTEXT_SIZE);

        Ok((
            ct_bytes.to_vec(),
            SecretBuffer::from_plain(SharedSecretTrait::as_bytes(&ss))?,
        ))
    }

    /// Decapsulate a shared secret from a ciphertext using the secret key.
    ///
    /// # Security Note
    ///
    /// NTRU's IND-CCA2 construction uses implicit rejection: a modified
    /// ciphertext decapsulates to a pseudorandom shared secret rather than
    /// an error. Tampering therefore surfaces later, as a session-key
    /// mismatch.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Primitive` if the secret key or ciphertext
    /// bytes have the wrong shape.
    pub fn decapsulate(secret_key: &[u8], ciphertext: &[u8]) -> Result<SecretBuffer> {
        let sk = <ntruhps2048509::SecretKey as SecretKeyTrait>::from_bytes(secret_key)
            .map_err(|e| CryptoError::primitive("ntru::decapsulate", e.to_string()))?;

        let ct = <ntruhps2048509::Ciphertext as CiphertextTrait>::from_bytes(ciphertext)
            .map_err(|e| CryptoError::primitive("ntru::decapsulate", e.to_string()))?;

        let ss = ntruhps2048509::decapsulate(&ct, &sk);

        SecretBuffer::from_plain(SharedSecretTrait::as_bytes(&ss))
    }
}
