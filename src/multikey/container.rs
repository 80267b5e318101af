//! # Typed Key Container
//!
//! Sparse mapping from cryptosystem tag to an ordered list of keys, generic
//! over the payload secrecy. [`PublicKeys`] stores plain byte keys;
//! [`SecretKeys`] stores page-locked buffers. The two never mix: secrecy is
//! a property of the type, so a secret key cannot be appended to a public
//! container at all.
//!
//! The container's content hash (`Hash1` of its serialization) doubles as
//! the identity fingerprint and as the comparison key for equality and
//! ordering. The hash is memoized and invalidated by every mutation.

use super::codec;
use super::error::MultikeyError;
use super::{CryptoTag, Result, Secrecy};
use crate::crypto::hash::{hash1, HashOutput};
use crate::crypto::sbuf::SecretBuffer;
use crate::store::{BlobStore, Namespace};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;
use zeroize::Zeroize;

/// Payload contract a container is generic over.
///
/// Implemented exactly twice, by [`PublicKeyBytes`] and [`SecretKeyBytes`];
/// the serialized form of the two container flavors is identical apart from
/// the secrecy byte.
pub trait KeyMaterial: Sized {
    /// The secrecy this payload carries (fixes the wire secrecy byte and
    /// the blob-store namespace).
    const SECRECY: Secrecy;

    /// Take ownership of plain bytes (deserialization boundary). Secret
    /// payloads move the bytes into locked memory and wipe the source.
    fn from_plain(bytes: Vec<u8>) -> Result<Self>;

    /// Borrow the raw key bytes (serialization boundary).
    fn as_bytes(&self) -> &[u8];

    /// Explicit copy; secret payloads make an independent locked allocation.
    fn duplicate(&self) -> Result<Self>;
}

/// A public key as stored in a container: plain bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyBytes(Vec<u8>);

impl PublicKeyBytes {
    /// Wrap public key bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl KeyMaterial for PublicKeyBytes {
    const SECRECY: Secrecy = Secrecy::Public;

    fn from_plain(bytes: Vec<u8>) -> Result<Self> {
        Ok(Self(bytes))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn duplicate(&self) -> Result<Self> {
        Ok(self.clone())
    }
}

/// A secret key as stored in a container: a page-locked buffer.
pub struct SecretKeyBytes(SecretBuffer);

impl SecretKeyBytes {
    /// Wrap an already-locked secret.
    pub fn new(secret: SecretBuffer) -> Self {
        Self(secret)
    }
}

impl KeyMaterial for SecretKeyBytes {
    const SECRECY: Secrecy = Secrecy::Secret;

    fn from_plain(bytes: Vec<u8>) -> Result<Self> {
        Ok(Self(SecretBuffer::from_vec(bytes).map_err(MultikeyError::from)?))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.expose()
    }

    fn duplicate(&self) -> Result<Self> {
        Ok(Self(self.0.try_clone().map_err(MultikeyError::from)?))
    }
}

impl fmt::Debug for SecretKeyBytes {
    /// Redacted: never prints the contents.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKeyBytes(len={})", self.0.len())
    }
}

/// Typed key container: total mapping from cryptosystem tag to an ordered
/// key list, with a memoized content hash.
///
/// # Invariants
///
/// 1. Every [`CryptoTag`] is present; unused tags map to an empty list
/// 2. All stored keys share the container's secrecy (enforced by `M`)
/// 3. Every mutation invalidates the cached hash
/// 4. Serialization emits ascending wire-ID order and omits empty lists
pub struct KeyContainer<M: KeyMaterial> {
    lists: BTreeMap<CryptoTag, Vec<M>>,
    cached_hash: RefCell<Option<HashOutput>>,
}

/// Container of public keys (one per peer identity exchanged).
pub type PublicKeys = KeyContainer<PublicKeyBytes>;

/// Container of secret keys (the private half of an identity).
pub type SecretKeys = KeyContainer<SecretKeyBytes>;

impl<M: KeyMaterial> KeyContainer<M> {
    /// Create an empty container (every tag present, every list empty).
    pub fn new() -> Self {
        let mut lists = BTreeMap::new();
        for tag in CryptoTag::ALL {
            lists.insert(tag, Vec::new());
        }
        Self {
            lists,
            cached_hash: RefCell::new(None),
        }
    }

    /// The secrecy of this container's payload.
    pub fn secrecy(&self) -> Secrecy {
        M::SECRECY
    }

    /// Append a key under `tag`. O(1); dirties the cached hash.
    pub fn add_key(&mut self, tag: CryptoTag, key: M) {
        self.cached_hash.replace(None);
        self.lists.entry(tag).or_default().push(key);
    }

    /// The `index`-th key under `tag`.
    ///
    /// # Errors
    ///
    /// Returns `MultikeyError::Range` when `index` is out of bounds.
    pub fn get_key(&self, tag: CryptoTag, index: usize) -> Result<&M> {
        let keys = self.keys_in(tag);
        keys.get(index).ok_or(MultikeyError::Range {
            tag,
            index,
            count: keys.len(),
        })
    }

    /// All keys under `tag`, in insertion order.
    pub fn keys_in(&self, tag: CryptoTag) -> &[M] {
        self.lists
            .get(&tag)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of keys under `tag`.
    pub fn count_in(&self, tag: CryptoTag) -> usize {
        self.keys_in(tag).len()
    }

    /// Number of cryptosystems with at least one key.
    pub fn count_systems_used(&self) -> usize {
        self.lists.values().filter(|keys| !keys.is_empty()).count()
    }

    /// The content hash (identity fingerprint): `Hash1(serialize())`,
    /// memoized until the next mutation.
    pub fn hash(&self) -> HashOutput {
        if let Some(cached) = self.cached_hash.borrow().as_ref() {
            return cached.clone();
        }
        let mut encoded = self.serialize();
        let digest = hash1(&encoded);
        encoded.zeroize();
        self.cached_hash.replace(Some(digest.clone()));
        digest
    }

    /// Encode to the GMK wire format.
    pub fn serialize(&self) -> Vec<u8> {
        codec::serialize(self)
    }

    /// Decode a container from the GMK wire format.
    ///
    /// # Errors
    ///
    /// Returns `MultikeyError::Format` on any malformed input (wrong magic,
    /// unknown version, secrecy mismatching this container flavor, unknown
    /// or misordered tags, truncation, trailing bytes). No partially-filled
    /// container escapes: the error carries nothing.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        codec::deserialize(bytes)
    }

    /// Empty every list; dirties the cached hash.
    pub fn clear(&mut self) {
        self.cached_hash.replace(None);
        for keys in self.lists.values_mut() {
            keys.clear();
        }
    }

    /// Explicit deep copy (locked re-allocations for secret payloads).
    pub fn duplicate(&self) -> Result<Self> {
        let mut out = Self::new();
        for tag in CryptoTag::ALL {
            for key in self.keys_in(tag) {
                out.add_key(tag, key.duplicate()?);
            }
        }
        Ok(out)
    }

    /// Persist to the blob store under the namespace this secrecy maps to
    /// (`public` → public namespace, `secret` → locked namespace).
    ///
    /// # Errors
    ///
    /// Returns `MultikeyError::Store` on store failure.
    pub fn save(&self, store: &BlobStore, name: &str) -> Result<()> {
        let mut encoded = self.serialize();
        let result = store.save_bytes(self.namespace(), name, &encoded);
        if M::SECRECY == Secrecy::Secret {
            encoded.zeroize();
        }
        result?;
        debug!(name, systems = self.count_systems_used(), "container saved");
        Ok(())
    }

    /// Load a container of this flavor from the blob store.
    ///
    /// Secret containers travel from disk to locked memory without an
    /// unwiped plain copy surviving the call.
    ///
    /// # Errors
    ///
    /// Returns `MultikeyError::Store` when the blob is missing or unreadable
    /// and `MultikeyError::Format` when its encoding is malformed.
    pub fn load(store: &BlobStore, name: &str) -> Result<Self> {
        let container = match M::SECRECY {
            Secrecy::Public => {
                let bytes = store.load_bytes(Namespace::Public, name)?;
                Self::deserialize(&bytes)?
            }
            Secrecy::Secret => {
                let locked = store.load_secret(name)?;
                Self::deserialize(locked.expose())?
            }
        };
        debug!(name, systems = container.count_systems_used(), "container loaded");
        Ok(container)
    }

    fn namespace(&self) -> Namespace {
        match M::SECRECY {
            Secrecy::Public => Namespace::Public,
            Secrecy::Secret => Namespace::Secret,
        }
    }
}

impl<M: KeyMaterial> Default for KeyContainer<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: KeyMaterial> PartialEq for KeyContainer<M> {
    fn eq(&self, other: &Self) -> bool {
        self.hash() == other.hash()
    }
}

impl<M: KeyMaterial> Eq for KeyContainer<M> {}

impl<M: KeyMaterial> PartialOrd for KeyContainer<M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<M: KeyMaterial> Ord for KeyContainer<M> {
    /// Lexicographic byte compare of the content hashes.
    fn cmp(&self, other: &Self) -> Ordering {
        self.hash().as_bytes().cmp(other.hash().as_bytes())
    }
}

impl fmt::Debug for PublicKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<String> = CryptoTag::ALL
            .iter()
            .filter(|t| self.count_in(**t) > 0)
            .map(|t| format!("{:?}:{}", t, self.count_in(*t)))
            .collect();
        write!(
            f,
            "PublicKeys[{}] {}",
            counts.join(", "),
            &self.hash().to_hex()[..16]
        )
    }
}

impl fmt::Debug for SecretKeys {
    /// Redacted: counts only, no contents, no fingerprint.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<String> = CryptoTag::ALL
            .iter()
            .filter(|t| self.count_in(**t) > 0)
            .map(|t| format!("{:?}:{}", t, self.count_in(*t)))
            .collect();
        write!(f, "SecretKeys[{}]", counts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn public_with(keys: &[(CryptoTag, &[u8])]) -> PublicKeys {
        let mut c = PublicKeys::new();
        for (tag, bytes) in keys {
            c.add_key(*tag, PublicKeyBytes::new(bytes.to_vec()));
        }
        c
    }

    // -- Structure ----------------------------------------------------------

    #[test]
    fn test_new_container_is_total_and_empty() {
        let c = PublicKeys::new();
        for tag in CryptoTag::ALL {
            assert_eq!(c.count_in(tag), 0);
        }
        assert_eq!(c.count_systems_used(), 0);
    }

    #[test]
    fn test_add_and_get() {
        let c = public_with(&[(CryptoTag::X25519, b"key-0"), (CryptoTag::X25519, b"key-1")]);
        assert_eq!(c.count_in(CryptoTag::X25519), 2);
        assert_eq!(c.count_systems_used(), 1);
        assert_eq!(c.get_key(CryptoTag::X25519, 1).unwrap().as_bytes(), b"key-1");
    }

    #[test]
    fn test_get_out_of_range() {
        let c = public_with(&[(CryptoTag::X25519, b"only")]);
        let err = c.get_key(CryptoTag::X25519, 1).unwrap_err();
        assert!(matches!(
            err,
            MultikeyError::Range {
                tag: CryptoTag::X25519,
                index: 1,
                count: 1
            }
        ));
        assert!(c.get_key(CryptoTag::Sidh, 0).is_err());
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut c = public_with(&[(CryptoTag::X25519, b"a"), (CryptoTag::Sidh, b"b")]);
        assert_eq!(c.count_systems_used(), 2);
        c.clear();
        assert_eq!(c.count_systems_used(), 0);
        for tag in CryptoTag::ALL {
            assert_eq!(c.count_in(tag), 0);
        }
    }

    // -- Hash memoization and equality --------------------------------------

    #[test]
    fn test_hash_stable_without_mutation() {
        let c = public_with(&[(CryptoTag::X25519, b"key")]);
        assert_eq!(c.hash(), c.hash());
    }

    #[test]
    fn test_hash_changes_after_add() {
        let mut c = public_with(&[(CryptoTag::X25519, b"key")]);
        let before = c.hash();
        c.add_key(CryptoTag::X25519, PublicKeyBytes::new(b"another".to_vec()));
        assert_ne!(before, c.hash());
    }

    #[test]
    fn test_hash_changes_after_clear() {
        let mut c = public_with(&[(CryptoTag::X25519, b"key")]);
        let before = c.hash();
        c.clear();
        assert_ne!(before, c.hash());
    }

    #[test]
    fn test_equality_is_content_based() {
        let a = public_with(&[(CryptoTag::X25519, b"same")]);
        let b = public_with(&[(CryptoTag::X25519, b"same")]);
        let c = public_with(&[(CryptoTag::X25519, b"diff")]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_ordering_is_strict_on_distinct_content() {
        let a = public_with(&[(CryptoTag::X25519, b"aaa")]);
        let b = public_with(&[(CryptoTag::X25519, b"bbb")]);
        assert_ne!(a.cmp(&b), Ordering::Equal);
        assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    // -- Duplication --------------------------------------------------------

    #[test]
    fn test_duplicate_is_equal_and_independent() {
        let a = public_with(&[(CryptoTag::X25519, b"key"), (CryptoTag::Sidh, b"s")]);
        let mut b = a.duplicate().unwrap();
        assert_eq!(a, b);
        b.add_key(CryptoTag::X25519, PublicKeyBytes::new(b"more".to_vec()));
        assert_ne!(a, b);
        assert_eq!(a.count_in(CryptoTag::X25519), 1);
    }

    #[test]
    fn test_secret_container_duplicate() {
        let mut a = SecretKeys::new();
        a.add_key(
            CryptoTag::X25519,
            SecretKeyBytes::new(SecretBuffer::from_plain(b"sec").unwrap()),
        );
        let b = a.duplicate().unwrap();
        assert_eq!(a, b);
    }

    // -- Redaction ----------------------------------------------------------

    #[test]
    fn test_secret_debug_never_prints_contents() {
        let mut c = SecretKeys::new();
        c.add_key(
            CryptoTag::X25519,
            SecretKeyBytes::new(SecretBuffer::from_plain(b"plaintext-secret").unwrap()),
        );
        let rendered = format!("{:?}", c);
        assert!(!rendered.contains("plaintext-secret"));
        assert!(rendered.contains("X25519:1"));
    }

    // -- Store round-trip ----------------------------------------------------

    #[test]
    fn test_save_load_public() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path());

        let c = public_with(&[(CryptoTag::X25519, b"pk"), (CryptoTag::Ntru, b"ntru-pk")]);
        c.save(&store, "alice.mk").unwrap();

        let loaded = PublicKeys::load(&store, "alice.mk").unwrap();
        assert_eq!(c, loaded);
    }

    #[test]
    fn test_save_load_secret_uses_secret_namespace() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path());

        let mut c = SecretKeys::new();
        c.add_key(
            CryptoTag::X25519,
            SecretKeyBytes::new(SecretBuffer::from_plain(&[9u8; 32]).unwrap()),
        );
        c.save(&store, "alice.sk").unwrap();

        assert!(store.is_file_ok(Namespace::Secret, "alice.sk"));
        assert!(!store.is_file_ok(Namespace::Public, "alice.sk"));

        let loaded = SecretKeys::load(&store, "alice.sk").unwrap();
        assert_eq!(c, loaded);
    }

    #[test]
    fn test_load_missing_is_store_error() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path());
        assert!(matches!(
            PublicKeys::load(&store, "missing.mk"),
            Err(MultikeyError::Store(_))
        ));
    }
}
