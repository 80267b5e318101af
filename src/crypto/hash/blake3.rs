//! # Hash1 Implementation
//!
//! BLAKE3 with 64-byte XOF output, in public and secret-buffer flavors.
//!
//! ## Modes
//!
//! - **Hash mode**: One-shot [`hash1`] or incremental [`Blake3Hasher`]
//! - **Secret mode**: [`hash1_secret`] writes the digest straight into a
//!   page-locked buffer, for digests that feed key derivation
//!
//! ## Security Properties
//!
//! - 256-bit security level; the 64-byte output is plain XOF extension
//! - Deterministic output for identical inputs

use super::{HashOutput, HASH1_LEN};
use crate::crypto::error::Result;
use crate::crypto::sbuf::SecretBuffer;

/// Incremental Hash1 hasher.
///
/// Supports feeding data in chunks; the final hash is identical
/// to hashing the concatenation of all chunks in one shot.
///
/// # Example
///
/// ```
/// use gmk_core::crypto::hash::{Blake3Hasher, hash1};
///
/// let mut hasher = Blake3Hasher::new();
/// hasher.update(b"hello ");
/// hasher.update(b"world");
/// let incremental = hasher.finalize();
///
/// let oneshot = hash1(b"hello world");
/// assert_eq!(incremental, oneshot);
/// ```
pub struct Blake3Hasher {
    inner: blake3::Hasher,
}

impl Blake3Hasher {
    /// Create a new Hash1 hasher.
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }

    /// Feed data into the hasher.
    ///
    /// Can be called multiple times to process data incrementally.
    /// Returns `&mut Self` for method chaining.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Consume the hasher and return the 64-byte hash.
    pub fn finalize(self) -> HashOutput {
        let mut out = [0u8; HASH1_LEN];
        self.inner.finalize_xof().fill(&mut out);
        HashOutput::from_bytes(out)
    }
}

impl Default for Blake3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the 64-byte Hash1 of `data` in one shot.
///
/// # Example
///
/// ```
/// use gmk_core::crypto::hash::hash1;
///
/// let output = hash1(b"hello");
/// assert_eq!(output.as_bytes().len(), 64);
/// ```
pub fn hash1(data: &[u8]) -> HashOutput {
    let mut out = [0u8; HASH1_LEN];
    blake3::Hasher::new().update(data).finalize_xof().fill(&mut out);
    HashOutput::from_bytes(out)
}

/// Compute the 64-byte Hash1 of `data` into a page-locked buffer.
///
/// Used to normalize raw shared secrets and to derive bound keys without
/// the digest ever living in unlocked memory.
///
/// # Errors
///
/// Returns `CryptoError::SecureMemory` if the locked allocation fails.
pub fn hash1_secret(data: &[u8]) -> Result<SecretBuffer> {
    let mut sb = SecretBuffer::zeroed(HASH1_LEN)?;
    blake3::Hasher::new()
        .update(data)
        .finalize_xof()
        .fill(sb.as_mut_slice());
    Ok(sb)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Known prefix against the official 32-byte vector -------------------

    #[test]
    fn test_hash1_empty_input_prefix() {
        // The first 32 XOF bytes equal the standard BLAKE3 hash of the input
        let output = hash1(b"");
        assert_eq!(
            hex::encode(&output.as_bytes()[..32]),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_hash1_matches_blake3_prefix() {
        let inputs: &[&[u8]] = &[
            b"hello",
            b"The quick brown fox jumps over the lazy dog",
            &[0u8; 64],
            &[0xffu8; 128],
        ];

        for input in inputs {
            let expected = blake3::hash(input);
            let actual = hash1(input);
            assert_eq!(
                &actual.as_bytes()[..32],
                expected.as_bytes(),
                "Mismatch for input of length {}",
                input.len()
            );
        }
    }

    // -- Incremental hashing ------------------------------------------------

    #[test]
    fn test_incremental_equals_oneshot() {
        let data = b"The quick brown fox jumps over the lazy dog";

        let oneshot = hash1(data);

        let mut hasher = Blake3Hasher::new();
        hasher.update(&data[..10]);
        hasher.update(&data[10..20]);
        hasher.update(&data[20..]);
        let incremental = hasher.finalize();

        assert_eq!(oneshot, incremental);
    }

    // -- Secret flavor ------------------------------------------------------

    #[test]
    fn test_hash1_secret_matches_public() {
        let public = hash1(b"shared secret bytes");
        let secret = hash1_secret(b"shared secret bytes").unwrap();
        assert_eq!(secret.expose(), public.as_bytes());
        assert_eq!(secret.len(), HASH1_LEN);
    }

    #[test]
    fn test_hash1_is_deterministic() {
        assert_eq!(hash1(b"gmk"), hash1(b"gmk"));
        assert_ne!(hash1(b"gmk"), hash1(b"gmj"));
    }
}
