//! # SIDH p751 KEX Module
//!
//! Post-quantum isogeny key exchange adapter. SIDH is the one interactive
//! (DH-style) post-quantum system in the multi-key set: both peers publish
//! static public keys and agree without extra messages, which is what lets
//! it participate in the default session-key derivation alongside X25519.
//!
//! ## Two-sided logical keys
//!
//! SIDH agreement is asymmetric between the 2-isogeny ("Alice") and
//! 3-isogeny ("Bob") sides, so one logical identity key carries one
//! sub-keypair of each side:
//!
//! ```text
//! logical public = pub_a ∥ pub_b   (564 + 564 = 1128 bytes)
//! logical secret = sec_a ∥ sec_b   ( 48 +  48 =   96 bytes)
//! ```
//!
//! Agreement runs both cross pairings — my `sec_a` against their `pub_b`,
//! my `sec_b` against their `pub_a` — and combines the two raw secrets as
//! `Hash1(s_a) ⊕ Hash1(s_b)`, which is symmetric because the two sides
//! compute the same pair of j-invariants in swapped order.

mod sidh;

pub use sidh::SidhKex;

/// Size of one public-key half (p751, compressed-free encoding)
pub const PUBLIC_HALF_SIZE: usize = 564;

/// Size of one secret-key half
pub const SECRET_HALF_SIZE: usize = 48;

/// Raw per-side shared secret size (an Fp2 j-invariant)
pub const RAW_SHARED_SIZE: usize = 188;

/// Logical public key size (`pub_a ∥ pub_b`)
pub const LOGICAL_PUBLIC_SIZE: usize = 2 * PUBLIC_HALF_SIZE;

/// Logical secret key size (`sec_a ∥ sec_b`)
pub const LOGICAL_SECRET_SIZE: usize = 2 * SECRET_HALF_SIZE;
