//! # Identity Pair
//!
//! A public container coupled with its matching secret container. The
//! pairing is ordered: the i-th secret under a tag is the private half of
//! the i-th public under the same tag.

use super::container::{PublicKeyBytes, PublicKeys, SecretKeyBytes, SecretKeys};
use super::{CryptoTag, Result};
use crate::crypto::ecdh::X25519Kex;
use crate::crypto::error::CryptoError;
use crate::crypto::kem::NtruKem;
use crate::crypto::kex::SidhKex;
use crate::crypto::sign::Ed25519Sign;
use crate::crypto::KeyPairBytes;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Total mapping from cryptosystem tag to a requested key count; tags not
/// present count as zero.
pub type TagCounts = BTreeMap<CryptoTag, usize>;

/// A multi-key identity: parallel public and secret containers.
pub struct IdentityPair {
    public: PublicKeys,
    secret: SecretKeys,
    will_asymkex: bool,
}

impl IdentityPair {
    /// Generate an identity with `counts[tag]` keys per cryptosystem.
    ///
    /// KEM tags are skipped at this generation site unless `will_asymkex`
    /// is set: one-shot KEM contributions are driven during the handshake,
    /// and only when the caller opts in.
    ///
    /// # Errors
    ///
    /// Returns `MultikeyError::Crypto` when an adapter fails or a requested
    /// tag has no adapter (`Geport`).
    pub fn generate(counts: &TagCounts, will_asymkex: bool) -> Result<Self> {
        let mut pair = Self {
            public: PublicKeys::new(),
            secret: SecretKeys::new(),
            will_asymkex,
        };

        for tag in CryptoTag::ALL {
            let n = counts.get(&tag).copied().unwrap_or(0);
            if n == 0 {
                continue;
            }
            if tag.is_asymmetric_kem() && !will_asymkex {
                trace!(?tag, "KEM tag skipped at generation site");
                continue;
            }
            for _ in 0..n {
                pair.add(tag, Self::generate_one(tag)?);
            }
        }

        debug!(systems = pair.public.count_systems_used(), "identity generated");
        Ok(pair)
    }

    /// Generate the default identity: `{X25519: 1, Ntru: 1, Sidh: 0}` with
    /// `will_asymkex = false`, so the NTRU entry is skipped and the result
    /// carries one X25519 keypair.
    pub fn generate_default() -> Result<Self> {
        let counts = TagCounts::from([
            (CryptoTag::X25519, 1),
            (CryptoTag::Ntru, 1),
            (CryptoTag::Sidh, 0),
        ]);
        Self::generate(&counts, false)
    }

    /// Append a keypair under `tag` into both halves. Both lists grow
    /// together; the pairing order is preserved.
    pub fn add(&mut self, tag: CryptoTag, keypair: KeyPairBytes) {
        self.public.add_key(tag, PublicKeyBytes::new(keypair.public));
        self.secret.add_key(tag, SecretKeyBytes::new(keypair.secret));
        debug_assert_eq!(self.public.count_in(tag), self.secret.count_in(tag));
    }

    /// The public half.
    pub fn public(&self) -> &PublicKeys {
        &self.public
    }

    /// The secret half.
    pub fn secret(&self) -> &SecretKeys {
        &self.secret
    }

    /// Whether this identity opted into KEM contributions.
    pub fn will_asymkex(&self) -> bool {
        self.will_asymkex
    }

    fn generate_one(tag: CryptoTag) -> Result<KeyPairBytes> {
        let keypair = match tag {
            CryptoTag::X25519 => X25519Kex::generate()?,
            CryptoTag::Sidh => SidhKex::generate()?,
            CryptoTag::Ntru => NtruKem::generate()?,
            CryptoTag::Ed25519 => Ed25519Sign::generate()?,
            CryptoTag::Geport => {
                return Err(CryptoError::primitive("geport::generate", "no adapter for reserved tag").into())
            }
        };
        Ok(keypair)
    }
}

impl std::fmt::Debug for IdentityPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityPair")
            .field("public", &self.public)
            .field("secret", &self.secret)
            .field("will_asymkex", &self.will_asymkex)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multikey::KeyMaterial;

    #[test]
    fn test_generate_counts_match_request() {
        let counts = TagCounts::from([(CryptoTag::X25519, 3)]);
        let pair = IdentityPair::generate(&counts, false).unwrap();
        assert_eq!(pair.public().count_in(CryptoTag::X25519), 3);
        assert_eq!(pair.secret().count_in(CryptoTag::X25519), 3);
        assert_eq!(pair.public().count_systems_used(), 1);
    }

    #[test]
    fn test_kem_tag_skipped_without_asymkex() {
        let counts = TagCounts::from([(CryptoTag::X25519, 1), (CryptoTag::Ntru, 2)]);
        let pair = IdentityPair::generate(&counts, false).unwrap();
        assert_eq!(pair.public().count_in(CryptoTag::Ntru), 0);
        assert_eq!(pair.public().count_in(CryptoTag::X25519), 1);
    }

    #[test]
    fn test_kem_tag_generated_with_asymkex() {
        let counts = TagCounts::from([(CryptoTag::Ntru, 1)]);
        let pair = IdentityPair::generate(&counts, true).unwrap();
        assert_eq!(pair.public().count_in(CryptoTag::Ntru), 1);
        assert_eq!(pair.secret().count_in(CryptoTag::Ntru), 1);
    }

    #[test]
    fn test_generate_default_is_x25519_only() {
        let pair = IdentityPair::generate_default().unwrap();
        assert_eq!(pair.public().count_in(CryptoTag::X25519), 1);
        assert_eq!(pair.public().count_in(CryptoTag::Ntru), 0);
        assert_eq!(pair.public().count_in(CryptoTag::Sidh), 0);
        assert!(!pair.will_asymkex());
    }

    #[test]
    fn test_parallel_lengths_every_tag() {
        let counts = TagCounts::from([
            (CryptoTag::X25519, 2),
            (CryptoTag::Ed25519, 1),
        ]);
        let pair = IdentityPair::generate(&counts, false).unwrap();
        for tag in CryptoTag::ALL {
            assert_eq!(pair.public().count_in(tag), pair.secret().count_in(tag));
        }
    }

    #[test]
    fn test_reserved_tag_has_no_adapter() {
        let counts = TagCounts::from([(CryptoTag::Geport, 1)]);
        let err = IdentityPair::generate(&counts, false).unwrap_err();
        assert!(matches!(
            err,
            super::super::MultikeyError::Crypto(CryptoError::Primitive { .. })
        ));
    }

    #[test]
    fn test_add_appends_to_both_halves() {
        let mut pair = IdentityPair::generate(&TagCounts::new(), false).unwrap();
        let kp = X25519Kex::generate().unwrap();
        let public_bytes = kp.public.clone();
        pair.add(CryptoTag::X25519, kp);

        assert_eq!(pair.public().count_in(CryptoTag::X25519), 1);
        assert_eq!(pair.secret().count_in(CryptoTag::X25519), 1);
        assert_eq!(
            pair.public()
                .get_key(CryptoTag::X25519, 0)
                .unwrap()
                .as_bytes(),
            public_bytes.as_slice()
        );
    }
}
