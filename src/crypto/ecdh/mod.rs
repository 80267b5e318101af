//! # X25519 KEX Module
//!
//! Classical elliptic-curve Diffie-Hellman adapter for the multi-key
//! identity layer.
//!
//! ## Components
//!
//! - [`X25519Kex`]: key generation and agreement over container byte keys
//!
//! Keys cross this boundary as byte sequences: public halves as plain
//! vectors, secret halves inside a [`crate::crypto::sbuf::SecretBuffer`].
//! That is the shape the typed key container stores.

mod x25519;

pub use x25519::X25519Kex;

/// X25519 public key size in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// X25519 secret key size in bytes
pub const SECRET_KEY_SIZE: usize = 32;

/// X25519 shared secret size in bytes
pub const SHARED_SECRET_SIZE: usize = 32;
