//! # Cryptographic Error Types
//!
//! Unified error handling for the primitive layer of the GMK core.
//!
//! ## Design Principles
//!
//! - **No Information Leakage**: Error messages never contain secret data
//! - **Detailed Context**: Each error names the failing adapter API
//! - **Type Safety**: Strongly typed errors prevent silent failures

use thiserror::Error;

/// Result type alias for cryptographic operations
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Unified error type for the primitive adapters and supporting machinery
///
/// All errors in the crypto module are represented by this enum,
/// ensuring consistent error handling and preventing secret data leakage.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A primitive adapter reported a non-success status or a key failed
    /// validation
    ///
    /// Carries the adapter API name and the underlying detail so the caller
    /// can tell which cryptosystem aborted the operation.
    #[error("Primitive failure in {api}: {detail}")]
    Primitive {
        /// The adapter API that failed (e.g. `"ntru::keypair"`)
        api: &'static str,
        /// Underlying failure detail from the primitive crate
        detail: String,
    },

    /// Invalid key, ciphertext, or shared-secret length
    ///
    /// Includes expected and actual lengths for debugging.
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// The expected length in bytes
        expected: usize,
        /// The actual length provided in bytes
        actual: usize,
    },

    /// Authenticated encryption/decryption operation failed
    ///
    /// This may occur due to:
    /// - Authentication tag verification failure (tampering detected)
    /// - Invalid nonce or key length
    #[error("AEAD operation failed: {0}")]
    AeadError(String),

    /// The process-wide entropy source or a DRBG instantiation failed
    ///
    /// Treated as fatal by key-generation callers.
    #[error("Entropy source failure: {0}")]
    Entropy(String),

    /// Secure-memory allocation or page-locking failed
    #[error("Secure memory failure: {0}")]
    SecureMemory(String),
}

impl CryptoError {
    /// Create a primitive error carrying the failing adapter API name
    pub fn primitive(api: &'static str, detail: impl Into<String>) -> Self {
        Self::Primitive {
            api,
            detail: detail.into(),
        }
    }

    /// Create an AEAD error from a string message
    pub fn aead(msg: impl Into<String>) -> Self {
        Self::AeadError(msg.into())
    }

    /// Create an entropy error from a string message
    pub fn entropy(msg: impl Into<String>) -> Self {
        Self::Entropy(msg.into())
    }

    /// Create a secure-memory error from a string message
    pub fn secure_memory(msg: impl Into<String>) -> Self {
        Self::SecureMemory(msg.into())
    }
}
