//! # Secret Buffer
//!
//! Owned byte sequence for secret key material, held in page-locked memory
//! and wiped on every drop path.
//!
//! ## Guarantees
//!
//! - The backing pages are `mlock`ed (never swapped) while the buffer lives
//! - The contents are zeroed before the pages are unlocked, on normal drop
//!   and during unwinding alike
//! - There are no implicit copies: cloning is explicit via [`SecretBuffer::try_clone`]
//!   and makes an independent locked allocation
//! - Equality compares in constant time
//!
//! ## Example
//!
//! ```
//! use gmk_core::crypto::sbuf::SecretBuffer;
//!
//! let mut sb = SecretBuffer::zeroed(32).unwrap();
//! sb.as_mut_slice()[0] = 0x42;
//! assert_eq!(sb.len(), 32);
//! assert_eq!(sb[0], 0x42);
//! ```

use crate::crypto::error::{CryptoError, Result};
use std::fmt;
use std::ops::{Index, IndexMut};
use zeroize::Zeroize;

/// Page-locked, zero-on-drop byte buffer for secret material.
///
/// Value semantics with explicit copy: the type is deliberately not `Clone`;
/// use [`SecretBuffer::try_clone`], which performs a fresh locked allocation.
pub struct SecretBuffer {
    buf: Box<[u8]>,
    locked: bool,
}

impl SecretBuffer {
    /// Allocate a locked buffer of `len` zero bytes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if the pages cannot be locked.
    pub fn zeroed(len: usize) -> Result<Self> {
        let mut buf = vec![0u8; len].into_boxed_slice();
        let locked = Self::lock(&mut buf)?;
        Ok(Self { buf, locked })
    }

    /// Allocate a locked buffer filled with `len` bytes from the process-wide
    /// DRBG pool at the default security level.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` on lock failure or
    /// `CryptoError::Entropy` if the DRBG cannot be instantiated.
    pub fn random(len: usize) -> Result<Self> {
        let mut sb = Self::zeroed(len)?;
        crate::crypto::entropy::fill_random(crate::crypto::entropy::DEFAULT_LEVEL, &mut sb.buf)?;
        Ok(sb)
    }

    /// Copy plain (unlocked) bytes into a fresh locked buffer.
    ///
    /// The source slice is NOT wiped; the caller is responsible for the
    /// hygiene of the plain copy. Prefer [`SecretBuffer::from_vec`] when the
    /// source is owned.
    pub fn from_plain(bytes: &[u8]) -> Result<Self> {
        let mut sb = Self::zeroed(bytes.len())?;
        sb.buf.copy_from_slice(bytes);
        Ok(sb)
    }

    /// Move an owned byte vector into a locked buffer, wiping the source.
    pub fn from_vec(mut bytes: Vec<u8>) -> Result<Self> {
        let sb = Self::from_plain(&bytes);
        bytes.zeroize();
        sb
    }

    /// Number of bytes held.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrow the contents.
    pub fn expose(&self) -> &[u8] {
        &self.buf
    }

    /// Borrow the contents mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    /// Raw const pointer to the first byte (for primitive FFI-style callers).
    pub fn as_ptr(&self) -> *const u8 {
        self.buf.as_ptr()
    }

    /// Explicit copy into an independent locked allocation.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if the new pages cannot be locked.
    pub fn try_clone(&self) -> Result<Self> {
        Self::from_plain(&self.buf)
    }

    /// XOR `other` into this buffer byte-wise.
    ///
    /// Both sequences must have the same length; used by the session-key
    /// accumulator where all operands are hash-length.
    ///
    /// # Panics
    ///
    /// Panics when the lengths differ (programming bug, not an input error).
    pub fn xor_assign(&mut self, other: &[u8]) {
        assert_eq!(self.buf.len(), other.len(), "xor operand length mismatch");
        for (dst, src) in self.buf.iter_mut().zip(other.iter()) {
            *dst ^= *src;
        }
    }

    fn lock(buf: &mut Box<[u8]>) -> Result<bool> {
        if buf.is_empty() {
            return Ok(false);
        }
        // SAFETY: the boxed slice is a live allocation of exactly buf.len()
        // bytes and its address is stable for the lifetime of the box.
        let ok = unsafe { memsec::mlock(buf.as_mut_ptr(), buf.len()) };
        if !ok {
            buf.zeroize();
            return Err(CryptoError::secure_memory("mlock failed"));
        }
        Ok(true)
    }
}

impl Drop for SecretBuffer {
    fn drop(&mut self) {
        if self.locked {
            // SAFETY: pointer/length pair is the same region passed to mlock.
            // memsec::munlock wipes the region before unlocking it.
            unsafe {
                memsec::munlock(self.buf.as_mut_ptr(), self.buf.len());
            }
        } else {
            self.buf.zeroize();
        }
    }
}

impl Index<usize> for SecretBuffer {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.buf[index]
    }
}

impl IndexMut<usize> for SecretBuffer {
    fn index_mut(&mut self, index: usize) -> &mut u8 {
        &mut self.buf[index]
    }
}

impl PartialEq for SecretBuffer {
    fn eq(&self, other: &Self) -> bool {
        if self.buf.len() != other.buf.len() {
            return false;
        }
        if self.buf.is_empty() {
            return true;
        }
        // SAFETY: both pointers are valid for the compared length.
        unsafe { memsec::memeq(self.buf.as_ptr(), other.buf.as_ptr(), self.buf.len()) }
    }
}

impl Eq for SecretBuffer {}

impl fmt::Debug for SecretBuffer {
    /// Redacted: never prints the contents.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBuffer(len={})", self.buf.len())
    }
}
