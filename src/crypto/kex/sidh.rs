//! # SIDH p751 KEX Implementation
//!
//! Supersingular-isogeny Diffie-Hellman over p751 via the `sidh` crate
//! (Cloudflare port).
//!
//! ## Security Properties
//!
//! - Interactive post-quantum key exchange (no transcript required)
//! - Both public halves are validated before a generated key is returned
//! - Raw shared secrets and secret-key halves are wiped on every exit path

use super::{
    LOGICAL_PUBLIC_SIZE, LOGICAL_SECRET_SIZE, PUBLIC_HALF_SIZE, RAW_SHARED_SIZE, SECRET_HALF_SIZE,
};
use crate::crypto::entropy;
use crate::crypto::error::{CryptoError, Result};
use crate::crypto::hash::hash1;
use crate::crypto::sbuf::SecretBuffer;
use crate::crypto::KeyPairBytes;
use rand::SeedableRng;
use sidh::sidh::{
    generate_alice_keypair, generate_bob_keypair, SIDHPublicKeyAlice, SIDHPublicKeyBob,
    SIDHSecretKeyAlice, SIDHSecretKeyBob,
};
use zeroize::Zeroize;

/// SIDH p751 key exchange operations.
///
/// All operations are implemented as associated functions (no instance
/// state). The `sidh` crate predates the crate-wide `rand` lineage; its RNG
/// is seeded from the process-wide DRBG pool so every primitive still draws
/// from the same entropy source.
pub struct SidhKex;

impl SidhKex {
    /// Generate a logical SIDH keypair (one Alice-side and one Bob-side
    /// sub-keypair, concatenated).
    ///
    /// Both public halves must pass validation before the key is returned.
    ///
    /// # Errors
    ///
    /// - `CryptoError::Entropy` if the DRBG cannot be seeded
    /// - `CryptoError::Primitive` if a generated public half fails validation
    /// - `CryptoError::SecureMemory` if the locked secret allocation fails
    pub fn generate() -> Result<KeyPairBytes> {
        let mut rng = Self::seeded_rng()?;

        let (pub_a, sec_a) = generate_alice_keypair(&mut rng);
        let (pub_b, sec_b) = generate_bob_keypair(&mut rng);

        let pub_a_bytes = pub_a.to_bytes();
        let pub_b_bytes = pub_b.to_bytes();
        Self::validate_half("sidh::generate", &pub_a_bytes)?;
        Self::validate_half("sidh::generate", &pub_b_bytes)?;

        let mut sec_a_bytes = sec_a.scalar;
        let mut sec_b_bytes = sec_b.scalar;

        let mut secret = SecretBuffer::zeroed(LOGICAL_SECRET_SIZE)?;
        secret.as_mut_slice()[..SECRET_HALF_SIZE].copy_from_slice(&sec_a_bytes);
        secret.as_mut_slice()[SECRET_HALF_SIZE..].copy_from_slice(&sec_b_bytes);
        sec_a_bytes.zeroize();
        sec_b_bytes.zeroize();

        let mut public = Vec::with_capacity(LOGICAL_PUBLIC_SIZE);
        public.extend_from_slice(&pub_a_bytes);
        public.extend_from_slice(&pub_b_bytes);

        Ok(KeyPairBytes { public, secret })
    }

    /// Agree on a combined shared secret with a peer.
    ///
    /// Runs my `sec_a` against their `pub_b` and my `sec_b` against their
    /// `pub_a`, then combines the two raw j-invariants as
    /// `Hash1(s_a) ⊕ Hash1(s_b)` (64 bytes). The combination is symmetric:
    /// the peer computes the same two invariants in swapped order.
    ///
    /// # Errors
    ///
    /// - `CryptoError::InvalidKeyLength` on malformed logical keys
    /// - `CryptoError::Primitive` if a peer public half fails validation
    pub fn agree(logical_secret: &[u8], their_logical_public: &[u8]) -> Result<SecretBuffer> {
        let (sec_a, sec_b) = Self::split_secret(logical_secret)?;
        let (their_pub_a, their_pub_b) = Self::split_public(their_logical_public)?;

        let s_a = Self::agree_side_a(sec_a, their_pub_b)?;
        let s_b = Self::agree_side_b(sec_b, their_pub_a)?;

        let combined = hash1(s_a.expose()).xor(&hash1(s_b.expose()));
        SecretBuffer::from_plain(combined.as_bytes())
    }

    /// Agreement for the 2-isogeny side: my `sec_a` with their `pub_b`.
    pub fn agree_side_a(sec_a: &[u8], their_pub_b: &[u8]) -> Result<SecretBuffer> {
        Self::check_len("sidh::agree_side_a", sec_a, SECRET_HALF_SIZE)?;
        Self::validate_half("sidh::agree_side_a", their_pub_b)?;

        let mut scalar = [0u8; SECRET_HALF_SIZE];
        scalar.copy_from_slice(sec_a);
        let sk = SIDHSecretKeyAlice { scalar };
        let pk = SIDHPublicKeyBob::from_bytes(their_pub_b);

        let mut raw = sk.shared_secret(&pk);
        let out = SecretBuffer::from_plain(&raw);
        raw.zeroize();
        let out = out?;
        debug_assert_eq!(out.len(), RAW_SHARED_SIZE);
        Ok(out)
    }

    /// Agreement for the 3-isogeny side: my `sec_b` with their `pub_a`.
    pub fn agree_side_b(sec_b: &[u8], their_pub_a: &[u8]) -> Result<SecretBuffer> {
        Self::check_len("sidh::agree_side_b", sec_b, SECRET_HALF_SIZE)?;
        Self::validate_half("sidh::agree_side_b", their_pub_a)?;

        let mut scalar = [0u8; SECRET_HALF_SIZE];
        scalar.copy_from_slice(sec_b);
        let sk = SIDHSecretKeyBob { scalar };
        let pk = SIDHPublicKeyAlice::from_bytes(their_pub_a);

        let mut raw = sk.shared_secret(&pk);
        let out = SecretBuffer::from_plain(&raw);
        raw.zeroize();
        let out = out?;
        debug_assert_eq!(out.len(), RAW_SHARED_SIZE);
        Ok(out)
    }

    /// Validate one public-key half.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Primitive` on wrong length or a degenerate
    /// (all-zero) encoding.
    pub fn validate_half(api: &'static str, half: &[u8]) -> Result<()> {
        if half.len() != PUBLIC_HALF_SIZE {
            return Err(CryptoError::primitive(
                api,
                format!(
                    "public half has {} bytes, expected {}",
                    half.len(),
                    PUBLIC_HALF_SIZE
                ),
            ));
        }
        if half.iter().all(|&b| b == 0) {
            return Err(CryptoError::primitive(api, "degenerate public half"));
        }
        Ok(())
    }

    /// Split a logical public key into its `(pub_a, pub_b)` halves.
    pub fn split_public(logical: &[u8]) -> Result<(&[u8], &[u8])> {
        Self::check_len("sidh::split_public", logical, LOGICAL_PUBLIC_SIZE)?;
        Ok(logical.split_at(PUBLIC_HALF_SIZE))
    }

    /// Split a logical secret key into its `(sec_a, sec_b)` halves.
    pub fn split_secret(logical: &[u8]) -> Result<(&[u8], &[u8])> {
        Self::check_len("sidh::split_secret", logical, LOGICAL_SECRET_SIZE)?;
        Ok(logical.split_at(SECRET_HALF_SIZE))
    }

    fn check_len(api: &'static str, bytes: &[u8], expected: usize) -> Result<()> {
        if bytes.len() != expected {
            return Err(CryptoError::InvalidKeyLength {
                expected,
                actual: bytes.len(),
            });
        }
        let _ = api;
        Ok(())
    }

    fn seeded_rng() -> Result<rand::rngs::StdRng> {
        let mut seed = [0u8; 32];
        entropy::fill_random(entropy::DEFAULT_LEVEL, &mut seed)?;
        let rng = rand::rngs::StdRng::from_seed(seed);
        seed.zeroize();
        Ok(rng)
    }
}
