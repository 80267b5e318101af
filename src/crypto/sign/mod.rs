//! # Ed25519 Signature Module
//!
//! Keygen-only adapter for the reserved signature tag. The tunnel never
//! consumes these keys; they exist so multi-key identities that carry a
//! signing key round-trip through generation, storage, and the wire format.

mod ed25519;

pub use ed25519::Ed25519Sign;

/// Ed25519 public key size in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Ed25519 secret key (seed) size in bytes
pub const SECRET_KEY_SIZE: usize = 32;
