//! # XChaCha20-Poly1305 AEAD Implementation
//!
//! Authenticated encryption under counter nonces via the
//! `chacha20poly1305` crate.
//!
//! ## Security Properties
//!
//! - 256-bit key (XChaCha20)
//! - 192-bit (24-byte) nonce, here driven by the direction counter
//! - 128-bit (16-byte) authentication tag (Poly1305)
//! - All key material zeroizes on drop

use super::{XChaCha20Key, NONCE_LEN, TAG_LEN};
use crate::crypto::error::{CryptoError, Result};
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};

/// XChaCha20-Poly1305 AEAD cipher.
///
/// Each Stream direction drives this with its own [`super::CounterNonce`];
/// the cipher itself is stateless with respect to nonces.
///
/// # Example
///
/// ```
/// use gmk_core::crypto::aead::{AeadCipher, CounterNonce, XChaCha20Key};
///
/// let key = XChaCha20Key::from_bytes(&[7u8; 32]).unwrap();
/// let cipher = AeadCipher::new(&key);
/// let nonce = CounterNonce::new(false);
///
/// let sealed = cipher.encrypt(&nonce.current(), b"hello", None).unwrap();
/// let opened = cipher.decrypt(&nonce.current(), &sealed, None).unwrap();
/// assert_eq!(opened, b"hello");
/// ```
pub struct AeadCipher {
    cipher: XChaCha20Poly1305,
}

impl AeadCipher {
    /// Create a new AEAD cipher with the given key.
    pub fn new(key: &XChaCha20Key) -> Self {
        let cipher = XChaCha20Poly1305::new_from_slice(key.as_bytes())
            .expect("Key length is always 32 bytes");
        Self { cipher }
    }

    /// Encrypt plaintext under `nonce`, appending the authentication tag.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::AeadError` if the underlying AEAD refuses the
    /// operation.
    pub fn encrypt(
        &self,
        nonce: &[u8; NONCE_LEN],
        plaintext: &[u8],
        aad: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        let xnonce = XNonce::from_slice(nonce);

        let payload = Payload {
            msg: plaintext,
            aad: aad.unwrap_or(&[]),
        };

        self.cipher
            .encrypt(xnonce, payload)
            .map_err(|_| CryptoError::aead("Encryption failed"))
    }

    /// Decrypt `ciphertext` under `nonce`, verifying the appended tag.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::AeadError` if the ciphertext is too short, was
    /// tampered with, or the nonce/key do not match.
    pub fn decrypt(
        &self,
        nonce: &[u8; NONCE_LEN],
        ciphertext: &[u8],
        aad: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        // Minimum ciphertext length is TAG_LEN (empty plaintext + tag)
        if ciphertext.len() < TAG_LEN {
            return Err(CryptoError::aead(format!(
                "Ciphertext too short: {} bytes (minimum {})",
                ciphertext.len(),
                TAG_LEN
            )));
        }

        let xnonce = XNonce::from_slice(nonce);

        let payload = Payload {
            msg: ciphertext,
            aad: aad.unwrap_or(&[]),
        };

        self.cipher
            .decrypt(xnonce, payload)
            .map_err(|_| CryptoError::aead("Decryption failed: authentication tag mismatch"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::aead::CounterNonce;

    fn test_key() -> XChaCha20Key {
        XChaCha20Key::from_bytes(&[0x33u8; 32]).unwrap()
    }

    // -- Roundtrip ----------------------------------------------------------

    #[test]
    fn test_seal_open_roundtrip() {
        let cipher = AeadCipher::new(&test_key());
        let nonce = CounterNonce::new(false).current();

        let sealed = cipher.encrypt(&nonce, b"attack at dawn", None).unwrap();
        assert_eq!(sealed.len(), 14 + TAG_LEN);

        let opened = cipher.decrypt(&nonce, &sealed, None).unwrap();
        assert_eq!(opened, b"attack at dawn");
    }

    #[test]
    fn test_empty_plaintext() {
        let cipher = AeadCipher::new(&test_key());
        let nonce = CounterNonce::new(true).current();

        let sealed = cipher.encrypt(&nonce, b"", None).unwrap();
        assert_eq!(sealed.len(), TAG_LEN);
        assert_eq!(cipher.decrypt(&nonce, &sealed, None).unwrap(), b"");
    }

    // -- Tampering ----------------------------------------------------------

    #[test]
    fn test_bit_flip_rejected() {
        let cipher = AeadCipher::new(&test_key());
        let nonce = CounterNonce::new(false).current();

        let mut sealed = cipher.encrypt(&nonce, b"payload", None).unwrap();
        for pos in 0..sealed.len() {
            sealed[pos] ^= 0x01;
            assert!(
                cipher.decrypt(&nonce, &sealed, None).is_err(),
                "bit flip at {} must be rejected",
                pos
            );
            sealed[pos] ^= 0x01;
        }
    }

    #[test]
    fn test_wrong_nonce_rejected() {
        let cipher = AeadCipher::new(&test_key());
        let mut nonce = CounterNonce::new(false);

        let sealed = cipher.encrypt(&nonce.current(), b"payload", None).unwrap();
        nonce.advance().unwrap();
        assert!(cipher.decrypt(&nonce.current(), &sealed, None).is_err());
    }

    #[test]
    fn test_truncated_ciphertext_rejected() {
        let cipher = AeadCipher::new(&test_key());
        let nonce = CounterNonce::new(false).current();
        assert!(cipher.decrypt(&nonce, &[0u8; 7], None).is_err());
    }

    // -- AAD ----------------------------------------------------------------

    #[test]
    fn test_aad_mismatch_rejected() {
        let cipher = AeadCipher::new(&test_key());
        let nonce = CounterNonce::new(false).current();

        let sealed = cipher.encrypt(&nonce, b"m", Some(b"context-a")).unwrap();
        assert!(cipher.decrypt(&nonce, &sealed, Some(b"context-b")).is_err());
        assert!(cipher.decrypt(&nonce, &sealed, Some(b"context-a")).is_ok());
    }
}
