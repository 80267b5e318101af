//! # XChaCha20-Poly1305 AEAD Module
//!
//! Authenticated encryption for tunnel streams.
//!
//! ## Components
//!
//! - `XChaCha20Key`: 32-byte encryption key
//! - `CounterNonce`: 24-byte nonce = 16-byte session constant ∥ 64-bit counter
//! - `AeadCipher`: Encryption/decryption operations
//!
//! Streams never use random nonces: each direction of a session walks a
//! monotonically increasing 64-bit counter over a constant that both peers
//! share (all zeros for the current protocol revision). The odd/even split
//! of the counter space is what keeps the two directions disjoint under a
//! single session key.

mod xchacha20;

use crate::crypto::error::{CryptoError, Result};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use xchacha20::AeadCipher;

/// AEAD key size in bytes (32 bytes / 256 bits)
pub const AEAD_KEY_LEN: usize = 32;

/// Nonce size in bytes (24 bytes for XChaCha20)
pub const NONCE_LEN: usize = 24;

/// Shared nonce-constant size in bytes
pub const NONCE_CONST_LEN: usize = 16;

/// Authentication tag size in bytes (16 bytes / 128 bits)
pub const TAG_LEN: usize = 16;

/// XChaCha20-Poly1305 key (32 bytes)
///
/// This key automatically zeroizes when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct XChaCha20Key([u8; AEAD_KEY_LEN]);

impl XChaCha20Key {
    /// Create a key from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != AEAD_KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: AEAD_KEY_LEN,
                actual: bytes.len(),
            });
        }
        let mut key = [0u8; AEAD_KEY_LEN];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; AEAD_KEY_LEN] {
        &self.0
    }
}

/// Direction-disciplined nonce: a shared 16-byte constant followed by a
/// 64-bit little-endian counter.
///
/// The counter starts at 0 (even direction) or 1 (odd direction) and always
/// steps by 2, so the two peers of a session can never collide on a nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterNonce {
    constant: [u8; NONCE_CONST_LEN],
    counter: u64,
}

impl CounterNonce {
    /// Create a nonce sequence for one direction over the all-zero constant.
    pub fn new(odd: bool) -> Self {
        Self {
            constant: [0u8; NONCE_CONST_LEN],
            counter: u64::from(odd),
        }
    }

    /// The 24-byte nonce for the next operation (constant ∥ LE counter).
    pub fn current(&self) -> [u8; NONCE_LEN] {
        let mut out = [0u8; NONCE_LEN];
        out[..NONCE_CONST_LEN].copy_from_slice(&self.constant);
        out[NONCE_CONST_LEN..].copy_from_slice(&self.counter.to_le_bytes());
        out
    }

    /// The raw counter value (test observability).
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Step to the next nonce of this direction.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::AeadError` if the 64-bit counter would wrap,
    /// which must never be reached within one session.
    pub fn advance(&mut self) -> Result<()> {
        self.counter = self
            .counter
            .checked_add(2)
            .ok_or_else(|| CryptoError::aead("nonce counter exhausted"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_bytes() {
        let bytes = [42u8; 32];
        let key = XChaCha20Key::from_bytes(&bytes).unwrap();
        assert_eq!(key.as_bytes(), &bytes);
    }

    #[test]
    fn test_key_invalid_length() {
        let result = XChaCha20Key::from_bytes(&[0u8; 16]);
        assert!(result.is_err());
    }

    #[test]
    fn test_nonce_directions_are_disjoint() {
        let mut even = CounterNonce::new(false);
        let mut odd = CounterNonce::new(true);
        for _ in 0..100 {
            assert_ne!(even.current(), odd.current());
            even.advance().unwrap();
            odd.advance().unwrap();
        }
        assert_eq!(even.counter(), 200);
        assert_eq!(odd.counter(), 201);
    }

    #[test]
    fn test_nonce_layout() {
        let mut n = CounterNonce::new(true);
        n.advance().unwrap();
        let bytes = n.current();
        assert_eq!(&bytes[..NONCE_CONST_LEN], &[0u8; NONCE_CONST_LEN]);
        assert_eq!(bytes[NONCE_CONST_LEN], 3);
        assert_eq!(&bytes[NONCE_CONST_LEN + 1..], &[0u8; 7]);
    }

    #[test]
    fn test_nonce_overflow_detected() {
        let mut n = CounterNonce::new(false);
        n.counter = u64::MAX - 1;
        assert!(n.advance().is_err());
    }
}
