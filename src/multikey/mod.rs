//! # Multi-Key Identity Module
//!
//! A peer's identity is not one key but a sparse, typed set of keys drawn
//! from heterogeneous cryptosystems, treated as one logical identity. This
//! module provides:
//!
//! - [`CryptoTag`] - the closed enumeration of cryptosystems with stable
//!   single-byte wire IDs
//! - [`KeyContainer`] - the typed container, generic over public vs secret
//!   payload ([`PublicKeys`] / [`SecretKeys`])
//! - [`IdentityPair`] - a public container coupled with its matching secret
//!   container
//! - the GMK wire codec (`codec`) shared by both container flavors
//!
//! ## Ordering
//!
//! Everything that iterates cryptosystems does so in ascending wire-ID byte
//! order (`'e' < 'g' < 's' < 't' < 'x'`); the serialized form and the
//! session-key derivation both depend on it.

pub mod codec;
pub mod container;
pub mod error;
pub mod idpair;

pub use container::{KeyContainer, KeyMaterial, PublicKeyBytes, PublicKeys, SecretKeyBytes, SecretKeys};
pub use error::MultikeyError;
pub use idpair::{IdentityPair, TagCounts};

/// Result type alias for multikey operations
pub type Result<T> = std::result::Result<T, MultikeyError>;

/// Closed enumeration of the cryptosystems a multi-key identity can carry.
///
/// Variants are declared in ascending wire-ID order so the derived `Ord`
/// matches the serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CryptoTag {
    /// Ed25519 signatures (reserved; generatable, unused by the tunnel) - `'e'`
    Ed25519,
    /// Reserved tag with no adapter - `'g'`
    Geport,
    /// SIDH p751 interactive isogeny KEX - `'s'`
    Sidh,
    /// NTRU one-shot lattice KEM - `'t'`
    Ntru,
    /// X25519 interactive classical DH - `'x'`
    X25519,
}

impl CryptoTag {
    /// Every tag, in ascending wire-ID order.
    pub const ALL: [CryptoTag; 5] = [
        CryptoTag::Ed25519,
        CryptoTag::Geport,
        CryptoTag::Sidh,
        CryptoTag::Ntru,
        CryptoTag::X25519,
    ];

    /// The stable single-byte wire ID.
    pub fn wire_id(self) -> u8 {
        match self {
            CryptoTag::Ed25519 => b'e',
            CryptoTag::Geport => b'g',
            CryptoTag::Sidh => b's',
            CryptoTag::Ntru => b't',
            CryptoTag::X25519 => b'x',
        }
    }

    /// Resolve a wire ID back to its tag.
    pub fn from_wire_id(id: u8) -> Option<Self> {
        match id {
            b'e' => Some(CryptoTag::Ed25519),
            b'g' => Some(CryptoTag::Geport),
            b's' => Some(CryptoTag::Sidh),
            b't' => Some(CryptoTag::Ntru),
            b'x' => Some(CryptoTag::X25519),
            _ => None,
        }
    }

    /// True only for one-shot KEM systems, whose contribution needs a
    /// handshake transcript rather than plain agreement.
    pub fn is_asymmetric_kem(self) -> bool {
        matches!(self, CryptoTag::Ntru)
    }
}

/// Secrecy of a container's payload; fixed at the type level, carried on
/// the wire as one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Secrecy {
    /// Plain public material (wire byte `0`)
    Public,
    /// Locked secret material (wire byte `1`)
    Secret,
}

impl Secrecy {
    /// The wire byte for this secrecy.
    pub fn wire_byte(self) -> u8 {
        match self {
            Secrecy::Public => 0,
            Secrecy::Secret => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_ascending_wire_order() {
        let ids: Vec<u8> = CryptoTag::ALL.iter().map(|t| t.wire_id()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_derived_ord_matches_wire_order() {
        for pair in CryptoTag::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].wire_id() < pair[1].wire_id());
        }
    }

    #[test]
    fn test_wire_id_roundtrip() {
        for tag in CryptoTag::ALL {
            assert_eq!(CryptoTag::from_wire_id(tag.wire_id()), Some(tag));
        }
        assert_eq!(CryptoTag::from_wire_id(b'z'), None);
    }

    #[test]
    fn test_only_ntru_is_kem() {
        for tag in CryptoTag::ALL {
            assert_eq!(tag.is_asymmetric_kem(), tag == CryptoTag::Ntru);
        }
    }

    #[test]
    fn test_secrecy_wire_bytes() {
        assert_eq!(Secrecy::Public.wire_byte(), 0);
        assert_eq!(Secrecy::Secret.wire_byte(), 1);
    }
}
