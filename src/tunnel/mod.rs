//! # Tunnel Layer
//!
//! Session establishment between two multi-key identities:
//!
//! - `kct` - session-key derivation combining all shared cryptosystems
//! - `stream` - authenticated duplex channel with nonce-direction
//!   discipline
//! - `tunnel` - the two-stage handshake (long-term → ephemeral) exposed to
//!   callers
//!
//! ## Two-stage handshake
//!
//! ```text
//! long-term identities ──derive──▶ Stream AB (KCTab, records usage)
//!         │                                │
//!         └─▶ ephemeral identity over the recorded systems
//!                                          │
//! ephemeral identities ──derive──▶ final Stream (KCTf, supersedes AB)
//! ```

pub mod error;
pub mod kct;
pub mod stream;
#[allow(clippy::module_inception)]
pub mod tunnel;

pub use error::{Result, TunnelError};
pub use kct::{derive_kct, derive_kct_with, Kct, KemTranscript, SessionKey};
pub use stream::{Stream, StreamState};
pub use tunnel::Tunnel;
