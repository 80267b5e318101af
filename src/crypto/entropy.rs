//! # Entropy Source and DRBG Pool
//!
//! Process-wide randomness for the primitive adapters.
//!
//! The operating-system entropy source is touched lazily, on the first
//! request, and only to seed deterministic random bit generators. DRBGs are
//! pooled in a process-wide map keyed by security level with create-on-miss
//! semantics; the pool is guarded by a mutex so crypto calls need not be
//! confined to a single thread.
//!
//! Instantiation failure (the OS refusing entropy) is fatal for the
//! requesting operation and surfaces as [`CryptoError::Entropy`].

use crate::crypto::error::{CryptoError, Result};
use parking_lot::Mutex;
use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Security level a DRBG is instantiated for, in bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SecurityLevel(pub u16);

/// The security level used by every adapter in this crate (128-bit).
pub const DEFAULT_LEVEL: SecurityLevel = SecurityLevel(128);

static DRBG_POOL: OnceLock<Mutex<HashMap<SecurityLevel, StdRng>>> = OnceLock::new();

fn pool() -> &'static Mutex<HashMap<SecurityLevel, StdRng>> {
    DRBG_POOL.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Fill `dest` with random bytes from the DRBG for `level`.
///
/// The DRBG is instantiated from the OS entropy source on the first request
/// for its level and lives for the remainder of the process.
///
/// # Errors
///
/// Returns `CryptoError::Entropy` if the OS entropy source refuses to seed
/// a new DRBG. An already-instantiated DRBG cannot fail.
pub fn fill_random(level: SecurityLevel, dest: &mut [u8]) -> Result<()> {
    with_drbg(level, |rng| rng.fill_bytes(dest))
}

/// Run `f` with exclusive access to the DRBG for `level`.
///
/// Used by adapters whose underlying crates take an `RngCore` directly.
///
/// # Errors
///
/// Returns `CryptoError::Entropy` on first-use instantiation failure.
pub fn with_drbg<T>(level: SecurityLevel, f: impl FnOnce(&mut StdRng) -> T) -> Result<T> {
    let mut pool = pool().lock();
    if !pool.contains_key(&level) {
        let rng = StdRng::from_rng(OsRng)
            .map_err(|e| CryptoError::entropy(format!("DRBG instantiation failed: {e}")))?;
        pool.insert(level, rng);
    }
    let rng = pool.get_mut(&level).expect("inserted above");
    Ok(f(rng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_random_produces_bytes() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        fill_random(DEFAULT_LEVEL, &mut a).unwrap();
        fill_random(DEFAULT_LEVEL, &mut b).unwrap();
        assert_ne!(a, b, "two 32-byte draws must differ");
    }

    #[test]
    fn test_pool_is_keyed_by_level() {
        let mut a = [0u8; 16];
        fill_random(SecurityLevel(128), &mut a).unwrap();
        fill_random(SecurityLevel(256), &mut a).unwrap();
    }

    #[test]
    fn test_with_drbg_returns_closure_value() {
        let n = with_drbg(DEFAULT_LEVEL, |rng| rng.next_u64()).unwrap();
        let m = with_drbg(DEFAULT_LEVEL, |rng| rng.next_u64()).unwrap();
        assert_ne!((n, m), (0, 0));
    }
}
