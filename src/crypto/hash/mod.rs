//! # Hash1 Module
//!
//! BLAKE3-based hashing for the GMK core. `Hash1` is the crate-wide content
//! hash and key-normalization function: 64 bytes of BLAKE3 XOF output.
//!
//! ## Components
//!
//! - [`HashOutput`]: 64-byte hash output type (implements `Zeroize`)
//! - [`Blake3Hasher`]: Incremental hasher with update/finalize API
//! - [`hash1`]: One-shot convenience function
//! - [`hash1_secret`]: Same digest, written into a locked [`SecretBuffer`]
//!
//! Hash values double as identity fingerprints; ordering on [`HashOutput`]
//! is the lexicographic byte compare used for the nonce-direction tiebreak.

mod blake3;

use zeroize::{Zeroize, ZeroizeOnDrop};

pub use self::blake3::{hash1, hash1_secret, Blake3Hasher};

/// Hash1 output length in bytes.
pub const HASH1_LEN: usize = 64;

/// 64-byte Hash1 output.
///
/// This newtype wrapper prevents accidental misuse with other byte arrays.
/// Implements [`Zeroize`] and [`ZeroizeOnDrop`] because hash values of
/// shared secrets participate in key derivation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Zeroize, ZeroizeOnDrop)]
pub struct HashOutput([u8; HASH1_LEN]);

impl HashOutput {
    /// Create a new `HashOutput` from a 64-byte array.
    pub fn from_bytes(bytes: [u8; HASH1_LEN]) -> Self {
        Self(bytes)
    }

    /// Get a reference to the underlying 64 bytes.
    pub fn as_bytes(&self) -> &[u8; HASH1_LEN] {
        &self.0
    }

    /// Encode the hash as a lowercase hex string (fingerprint rendering).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Byte-wise XOR of two hash outputs.
    pub fn xor(&self, other: &HashOutput) -> HashOutput {
        let mut out = [0u8; HASH1_LEN];
        for (i, o) in out.iter_mut().enumerate() {
            *o = self.0[i] ^ other.0[i];
        }
        HashOutput(out)
    }
}

impl AsRef<[u8]> for HashOutput {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
