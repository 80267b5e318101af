//! # Session Key Derivation (KCT)
//!
//! Combines per-cryptosystem shared secrets between two multi-key
//! identities into a single symmetric session key.
//!
//! ## Derivation
//!
//! For every cryptosystem both peers hold keys under, taken in ascending
//! wire-ID order, key pairs are matched by wrap-around multiplexing
//! (iterate to the larger count, index each side modulo its own count) and
//! each pair contributes
//!
//! ```text
//! k_pair = Hash1s( Hash1s(s) ⊕ Hash1(my_pub) ⊕ Hash1(their_pub) )
//! ```
//!
//! where `s` is the pair's raw shared secret and `Hash1s` is the
//! locked-output Hash1. The inner hash normalizes the non-uniform raw
//! secret; the XOR with the public-key hashes binds the key to the two
//! specific identities and prevents unknown-key-share substitution. All
//! `k_pair` values are XOR-accumulated, so the result is independent of
//! iteration order and identical on both ends; a final `Hash1s` over the
//! accumulator is truncated to the AEAD key length.
//!
//! One-shot KEM systems cannot agree without a message, so their
//! contribution runs through an explicit [`KemTranscript`]; the default
//! derivation path skips them.

use crate::crypto::aead::{XChaCha20Key, AEAD_KEY_LEN};
use crate::crypto::ecdh::X25519Kex;
use crate::crypto::hash::{hash1, hash1_secret, HASH1_LEN};
use crate::crypto::kem::NtruKem;
use crate::crypto::kex::SidhKex;
use crate::crypto::sbuf::SecretBuffer;
use crate::multikey::{CryptoTag, IdentityPair, KeyMaterial, PublicKeys, TagCounts};
use crate::tunnel::error::{Result, TunnelError};
use std::fmt;
use tracing::{debug, trace};

/// A derived symmetric session key (AEAD key length, locked memory).
///
/// Derived once per handshake; immutable thereafter.
pub struct SessionKey(SecretBuffer);

impl SessionKey {
    /// Borrow the raw key bytes (peers assert byte-identical derivation).
    pub fn as_bytes(&self) -> &[u8] {
        self.0.expose()
    }

    /// The AEAD key this session key drives.
    pub(crate) fn to_aead_key(&self) -> XChaCha20Key {
        XChaCha20Key::from_bytes(self.0.expose()).expect("session key is AEAD key length")
    }
}

impl PartialEq for SessionKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SessionKey {}

impl fmt::Debug for SessionKey {
    /// Redacted: never prints the key.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionKey(len={})", self.0.len())
    }
}

/// The result of one KCT derivation: the key plus, when requested, the map
/// of cryptosystems that actually contributed (published so the ephemeral
/// identity can be generated over exactly those systems).
pub struct Kct {
    /// The derived session key
    pub key: SessionKey,
    systems_used: TagCounts,
}

impl Kct {
    /// Cryptosystems that contributed to this key, one count each.
    ///
    /// Empty unless the derivation ran with `record_usage`.
    pub fn systems_used(&self) -> &TagCounts {
        &self.systems_used
    }
}

/// KEM contributions for one handshake.
///
/// The initiator encapsulates one fresh session contribution to each
/// selected peer KEM key and records the ciphertexts for the handshake
/// transcript; the responder decapsulates the received ciphertexts. Either
/// way the per-pair plaintexts feed the derivation as `s`.
pub struct KemTranscript {
    ciphertexts: Vec<Vec<u8>>,
    secrets: Vec<SecretBuffer>,
}

impl KemTranscript {
    /// Initiator side: encapsulate to each selected peer NTRU key.
    ///
    /// # Errors
    ///
    /// Returns `TunnelError::Handshake` when either side holds no NTRU keys
    /// and `TunnelError::Primitive` on encapsulation failure.
    pub fn initiate(me: &IdentityPair, them: &PublicKeys) -> Result<Self> {
        let (a, b) = Self::counts(me, them)?;
        let n = a.max(b);

        let mut ciphertexts = Vec::with_capacity(n);
        let mut secrets = Vec::with_capacity(n);
        for i in 0..n {
            let their_pub = them.get_key(CryptoTag::Ntru, i % b)?;
            let (ct, ss) = NtruKem::encapsulate(their_pub.as_bytes())?;
            ciphertexts.push(ct);
            secrets.push(ss);
        }
        trace!(pairs = n, "KEM transcript encapsulated");
        Ok(Self {
            ciphertexts,
            secrets,
        })
    }

    /// Responder side: decapsulate the initiator's ciphertexts.
    ///
    /// # Errors
    ///
    /// Returns `TunnelError::Handshake` when the ciphertext count does not
    /// match the wrap-around pairing and `TunnelError::Primitive` on
    /// decapsulation failure.
    pub fn respond(me: &IdentityPair, them: &PublicKeys, ciphertexts: &[Vec<u8>]) -> Result<Self> {
        let (a, b) = Self::counts(me, them)?;
        let n = a.max(b);
        if ciphertexts.len() != n {
            return Err(TunnelError::handshake(format!(
                "expected {n} KEM ciphertexts, got {}",
                ciphertexts.len()
            )));
        }

        let mut secrets = Vec::with_capacity(n);
        for (i, ct) in ciphertexts.iter().enumerate() {
            let my_sec = me.secret().get_key(CryptoTag::Ntru, i % a)?;
            secrets.push(NtruKem::decapsulate(my_sec.as_bytes(), ct)?);
        }
        trace!(pairs = n, "KEM transcript decapsulated");
        Ok(Self {
            ciphertexts: ciphertexts.to_vec(),
            secrets,
        })
    }

    /// The ciphertexts to carry in the handshake transcript.
    pub fn ciphertexts(&self) -> &[Vec<u8>] {
        &self.ciphertexts
    }

    fn secret_for_pair(&self, i: usize) -> Result<&SecretBuffer> {
        self.secrets
            .get(i)
            .ok_or_else(|| TunnelError::handshake("KEM transcript shorter than pairing"))
    }

    fn counts(me: &IdentityPair, them: &PublicKeys) -> Result<(usize, usize)> {
        let a = me.public().count_in(CryptoTag::Ntru);
        let b = them.count_in(CryptoTag::Ntru);
        if a == 0 || b == 0 {
            return Err(TunnelError::handshake(
                "KEM transcript requires NTRU keys on both sides",
            ));
        }
        Ok((a, b))
    }
}

/// Derive the session key for `me` against the peer's public container.
///
/// `record_usage` publishes the contributing systems through
/// [`Kct::systems_used`]. `packetstart` is the handshake preamble, reserved
/// for transcript binding (not hashed by the current protocol revision).
/// KEM tags are skipped on this path; see [`derive_kct_with`].
///
/// # Errors
///
/// `TunnelError::Handshake` on container count mismatch or when no
/// cryptosystem is shared; adapter failures propagate.
pub fn derive_kct(
    me: &IdentityPair,
    them: &PublicKeys,
    record_usage: bool,
    packetstart: &[u8],
) -> Result<Kct> {
    derive_kct_with(me, them, record_usage, packetstart, None)
}

/// [`derive_kct`] with an optional KEM transcript.
///
/// When a transcript is supplied, NTRU pairs consume its per-pair secrets;
/// without one, KEM tags do not participate.
pub fn derive_kct_with(
    me: &IdentityPair,
    them: &PublicKeys,
    record_usage: bool,
    packetstart: &[u8],
    kem: Option<&KemTranscript>,
) -> Result<Kct> {
    // Reserved for transcript binding of the two-stage handshake.
    let _ = packetstart;

    if me.public().count_systems_used() != me.secret().count_systems_used()
        || me.public().count_systems_used() != them.count_systems_used()
    {
        return Err(TunnelError::handshake(format!(
            "cryptosystem count mismatch: mine {}/{}, theirs {}",
            me.public().count_systems_used(),
            me.secret().count_systems_used(),
            them.count_systems_used()
        )));
    }

    let mut accum = SecretBuffer::zeroed(HASH1_LEN)?;
    let mut systems_used = TagCounts::new();
    let mut contributed = false;

    for tag in CryptoTag::ALL {
        if !participates(tag) {
            continue;
        }
        if tag.is_asymmetric_kem() && kem.is_none() {
            continue;
        }
        let a = me.public().count_in(tag);
        let b = them.count_in(tag);
        if a == 0 || b == 0 {
            continue;
        }
        if record_usage {
            systems_used.insert(tag, 1);
        }

        // Wrap-around multiplexing: every key on the larger side is
        // consumed at least once, every key on the smaller side as often
        // as needed.
        let n = a.max(b);
        for i in 0..n {
            let my_pub = me.public().get_key(tag, i % a)?;
            let my_sec = me.secret().get_key(tag, i % a)?;
            let their_pub = them.get_key(tag, i % b)?;

            let s = match tag {
                CryptoTag::X25519 => X25519Kex::agree(my_sec.as_bytes(), their_pub.as_bytes())?,
                CryptoTag::Sidh => SidhKex::agree(my_sec.as_bytes(), their_pub.as_bytes())?,
                CryptoTag::Ntru => kem
                    .expect("checked above")
                    .secret_for_pair(i)?
                    .try_clone()?,
                CryptoTag::Ed25519 | CryptoTag::Geport => unreachable!("non-KEX tag"),
            };

            // k_pair = Hash1s(Hash1s(s) ⊕ Hash1(my_pub) ⊕ Hash1(their_pub))
            let mut bound = hash1_secret(s.expose())?;
            bound.xor_assign(hash1(my_pub.as_bytes()).as_bytes());
            bound.xor_assign(hash1(their_pub.as_bytes()).as_bytes());
            let k_pair = hash1_secret(bound.expose())?;

            accum.xor_assign(k_pair.expose());
            contributed = true;
        }
    }

    if !contributed {
        return Err(TunnelError::handshake("no common cryptosystems"));
    }

    let full = hash1_secret(accum.expose())?;
    debug_assert!(HASH1_LEN >= AEAD_KEY_LEN);
    let key = SessionKey(SecretBuffer::from_plain(&full.expose()[..AEAD_KEY_LEN])?);

    debug!(
        systems = systems_used.len(),
        recorded = record_usage,
        "session key derived"
    );
    Ok(Kct { key, systems_used })
}

/// Whether a tag takes part in session-key derivation at all. Signature and
/// reserved tags never do.
fn participates(tag: CryptoTag) -> bool {
    matches!(tag, CryptoTag::X25519 | CryptoTag::Sidh | CryptoTag::Ntru)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(x25519: usize) -> IdentityPair {
        let counts = TagCounts::from([(CryptoTag::X25519, x25519)]);
        IdentityPair::generate(&counts, false).unwrap()
    }

    // -- Agreement ----------------------------------------------------------

    #[test]
    fn test_peers_derive_identical_keys() {
        let alice = identity(1);
        let bob = identity(1);

        let kct_a = derive_kct(&alice, bob.public(), false, b"").unwrap();
        let kct_b = derive_kct(&bob, alice.public(), false, b"").unwrap();
        assert_eq!(kct_a.key, kct_b.key);
        assert_eq!(kct_a.key.as_bytes().len(), AEAD_KEY_LEN);
    }

    #[test]
    fn test_wraparound_multiplexing_agrees() {
        let alice = identity(1);
        let bob = identity(3);

        let kct_a = derive_kct(&alice, bob.public(), false, b"").unwrap();
        let kct_b = derive_kct(&bob, alice.public(), false, b"").unwrap();
        assert_eq!(kct_a.key, kct_b.key);
    }

    #[test]
    fn test_wraparound_equals_explicit_pair_xor() {
        // With 1 local and 3 peer keys the KCT must equal the XOR of the
        // three per-pair bound keys (A[0],B[0]), (A[0],B[1]), (A[0],B[2]).
        let alice = identity(1);
        let bob = identity(3);

        let my_pub = alice.public().get_key(CryptoTag::X25519, 0).unwrap();
        let my_sec = alice.secret().get_key(CryptoTag::X25519, 0).unwrap();

        let mut accum = SecretBuffer::zeroed(HASH1_LEN).unwrap();
        for j in 0..3 {
            let their_pub = bob.public().get_key(CryptoTag::X25519, j).unwrap();
            let s = X25519Kex::agree(my_sec.as_bytes(), their_pub.as_bytes()).unwrap();
            let mut bound = hash1_secret(s.expose()).unwrap();
            bound.xor_assign(hash1(my_pub.as_bytes()).as_bytes());
            bound.xor_assign(hash1(their_pub.as_bytes()).as_bytes());
            let k_pair = hash1_secret(bound.expose()).unwrap();
            accum.xor_assign(k_pair.expose());
        }
        let full = hash1_secret(accum.expose()).unwrap();

        let kct = derive_kct(&alice, bob.public(), false, b"").unwrap();
        assert_eq!(kct.key.as_bytes(), &full.expose()[..AEAD_KEY_LEN]);
    }

    #[test]
    fn test_different_peers_different_keys() {
        let alice = identity(1);
        let bob = identity(1);
        let carol = identity(1);

        let kct_ab = derive_kct(&alice, bob.public(), false, b"").unwrap();
        let kct_ac = derive_kct(&alice, carol.public(), false, b"").unwrap();
        assert_ne!(kct_ab.key, kct_ac.key);
    }

    #[test]
    fn test_preamble_reserved_not_hashed() {
        let alice = identity(1);
        let bob = identity(1);

        let with_empty = derive_kct(&alice, bob.public(), false, b"").unwrap();
        let with_preamble = derive_kct(&alice, bob.public(), false, b"preamble").unwrap();
        assert_eq!(with_empty.key, with_preamble.key);
    }

    // -- Preconditions ------------------------------------------------------

    #[test]
    fn test_count_mismatch_rejected() {
        let alice = identity(1);
        let bob = IdentityPair::generate(
            &TagCounts::from([(CryptoTag::X25519, 1), (CryptoTag::Ed25519, 1)]),
            false,
        )
        .unwrap();

        let result = derive_kct(&alice, bob.public(), false, b"");
        assert!(matches!(result, Err(TunnelError::Handshake(_))));
    }

    #[test]
    fn test_no_common_systems_rejected() {
        // Matching system counts (one each) but disjoint KEX systems.
        let alice = identity(1);
        let bob = IdentityPair::generate(&TagCounts::from([(CryptoTag::Ed25519, 1)]), false)
            .unwrap();

        let result = derive_kct(&alice, bob.public(), false, b"");
        assert!(matches!(result, Err(TunnelError::Handshake(_))));
    }

    // -- Usage recording ----------------------------------------------------

    #[test]
    fn test_record_usage_publishes_contributors() {
        let alice = identity(2);
        let bob = identity(1);

        let kct = derive_kct(&alice, bob.public(), true, b"").unwrap();
        assert_eq!(kct.systems_used().len(), 1);
        assert_eq!(kct.systems_used().get(&CryptoTag::X25519), Some(&1));

        let unrecorded = derive_kct(&alice, bob.public(), false, b"").unwrap();
        assert!(unrecorded.systems_used().is_empty());
    }

    // -- KEM transcript path ------------------------------------------------

    #[test]
    fn test_kem_transcript_roundtrip() {
        let counts = TagCounts::from([(CryptoTag::X25519, 1), (CryptoTag::Ntru, 1)]);
        let alice = IdentityPair::generate(&counts, true).unwrap();
        let bob = IdentityPair::generate(&counts, true).unwrap();

        let t_a = KemTranscript::initiate(&alice, bob.public()).unwrap();
        let t_b =
            KemTranscript::respond(&bob, alice.public(), t_a.ciphertexts()).unwrap();

        let kct_a = derive_kct_with(&alice, bob.public(), true, b"", Some(&t_a)).unwrap();
        let kct_b = derive_kct_with(&bob, alice.public(), true, b"", Some(&t_b)).unwrap();

        assert_eq!(kct_a.key, kct_b.key);
        assert_eq!(kct_a.systems_used().len(), 2);
        assert!(kct_a.systems_used().contains_key(&CryptoTag::Ntru));
    }

    #[test]
    fn test_kem_skipped_without_transcript() {
        let counts = TagCounts::from([(CryptoTag::X25519, 1), (CryptoTag::Ntru, 1)]);
        let alice = IdentityPair::generate(&counts, true).unwrap();
        let bob = IdentityPair::generate(&counts, true).unwrap();

        let kct = derive_kct(&alice, bob.public(), true, b"").unwrap();
        assert!(!kct.systems_used().contains_key(&CryptoTag::Ntru));
        assert!(kct.systems_used().contains_key(&CryptoTag::X25519));
    }

    #[test]
    fn test_kem_transcript_count_mismatch_rejected() {
        let counts = TagCounts::from([(CryptoTag::Ntru, 2)]);
        let alice = IdentityPair::generate(&counts, true).unwrap();
        let bob = IdentityPair::generate(&counts, true).unwrap();

        let t_a = KemTranscript::initiate(&alice, bob.public()).unwrap();
        let short = &t_a.ciphertexts()[..1];
        let result = KemTranscript::respond(&bob, alice.public(), short);
        assert!(matches!(result, Err(TunnelError::Handshake(_))));
    }
}
