//! # Tunnel Error Types
//!
//! Errors of the session-key derivation, stream, and tunnel layer.

use crate::crypto::error::CryptoError;
use crate::multikey::MultikeyError;
use thiserror::Error;

/// Result type alias for tunnel operations
pub type Result<T> = std::result::Result<T, TunnelError>;

/// Error type for handshake, stream, and tunnel operations
#[derive(Debug, Error)]
pub enum TunnelError {
    /// Handshake precondition failed: container count mismatch, zero common
    /// cryptosystems, identical content hashes, or an out-of-order tunnel
    /// operation
    ///
    /// The tunnel (or stream) is not constructed.
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// AEAD open rejected a ciphertext
    ///
    /// The stream transitions to `Closed`; no further operations succeed.
    #[error("Authentication failed")]
    Auth,

    /// AEAD seal failure or an internal stream invariant breach
    ///
    /// Fatal at stream scope.
    #[error("Stream crypto failure: {0}")]
    Crypto(String),

    /// Container or identity-pair failure during handshake
    #[error(transparent)]
    Multikey(#[from] MultikeyError),

    /// Primitive adapter failure during derivation
    #[error(transparent)]
    Primitive(#[from] CryptoError),
}

impl TunnelError {
    /// Create a handshake error from a string message
    pub fn handshake(msg: impl Into<String>) -> Self {
        Self::Handshake(msg.into())
    }

    /// Create a stream-crypto error from a string message
    pub fn crypto(msg: impl Into<String>) -> Self {
        Self::Crypto(msg.into())
    }
}
