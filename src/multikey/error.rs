//! # Multikey Error Types
//!
//! Errors of the container, codec, and identity-pair layer.

use super::CryptoTag;
use crate::crypto::error::CryptoError;
use crate::store::StoreError;
use thiserror::Error;

/// Error type for container and identity-pair operations
#[derive(Debug, Error)]
pub enum MultikeyError {
    /// Out-of-bounds key index in a typed key container
    #[error("Key index {index} out of range for {tag:?} (holds {count})")]
    Range {
        /// The cryptosystem list indexed into
        tag: CryptoTag,
        /// The offending index
        index: usize,
        /// Number of keys the list holds
        count: usize,
    },

    /// Malformed container encoding: bad magic, version, secrecy, tag
    /// ordering, truncation, or trailing bytes
    ///
    /// The target container is left empty when this is returned.
    #[error("Malformed container encoding: {0}")]
    Format(String),

    /// A primitive adapter failed during generation
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Blob-store failure during save/load
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MultikeyError {
    /// Create a format error from a string message
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_error_display() {
        let err = MultikeyError::Range {
            tag: CryptoTag::X25519,
            index: 3,
            count: 1,
        };
        assert!(err.to_string().contains("3"));
        assert!(err.to_string().contains("X25519"));
    }

    #[test]
    fn test_format_helper() {
        assert!(matches!(
            MultikeyError::format("bad magic"),
            MultikeyError::Format(_)
        ));
    }
}
