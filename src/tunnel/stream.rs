//! # Stream
//!
//! An authenticated duplex channel over one derived session key.
//!
//! ## Nonce direction
//!
//! Both peers seal under the same key, kept apart by the nonce-direction
//! bit: a strict comparison of the two identity content hashes decides
//! which peer owns the odd counters. The boxer walks this peer's
//! direction, the unboxer walks the peer's expected direction; counters
//! advance by two, the 16-byte nonce constant is fixed for the session.
//!
//! ## State machine
//!
//! `fresh → started → open → closed`. A stream leaves `started` on the
//! first successful seal or open; any authentication failure drives it to
//! the terminal `closed` state.

use crate::crypto::aead::{AeadCipher, CounterNonce};
use crate::multikey::{IdentityPair, PublicKeys, TagCounts};
use crate::tunnel::error::{Result, TunnelError};
use crate::tunnel::kct::{derive_kct, SessionKey};
use tracing::{debug, warn};

/// Stream lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Constructed but no key exchange has run (never observable through
    /// the public constructors, which perform the exchange)
    Fresh,
    /// Key exchanged, no traffic yet
    Started,
    /// At least one message sealed or opened
    Open,
    /// Terminal: an authentication failure occurred
    Closed,
}

/// Authenticated duplex channel over a derived session key.
pub struct Stream {
    kct: SessionKey,
    cipher: AeadCipher,
    nonce_odd: bool,
    boxer: CounterNonce,
    unboxer: CounterNonce,
    state: StreamState,
    systems_used: TagCounts,
}

impl Stream {
    /// Initiator-side construction: derive the session key against the
    /// peer's public container and fix the nonce direction.
    ///
    /// `will_new_id` records which cryptosystems contributed, published via
    /// [`Stream::systems_used`] so the ephemeral identity can be generated
    /// over exactly those systems.
    ///
    /// # Errors
    ///
    /// `TunnelError::Handshake` on derivation preconditions or when the two
    /// identities hash identically (structurally impossible for distinct
    /// identities, treated as a handshake failure if detected).
    pub fn exchange_start(
        me: &IdentityPair,
        them: &PublicKeys,
        will_new_id: bool,
    ) -> Result<Self> {
        Self::exchange(me, them, will_new_id, b"")
    }

    /// Responder-side completion: same derivation, driven by the
    /// initiator-supplied handshake preamble.
    ///
    /// Derivation is symmetric, so both sides produce byte-identical
    /// session keys; the preamble is carried as the reserved transcript
    /// input.
    ///
    /// # Errors
    ///
    /// As [`Stream::exchange_start`].
    pub fn exchange_done(me: &IdentityPair, them: &PublicKeys, preamble: &[u8]) -> Result<Self> {
        Self::exchange(me, them, true, preamble)
    }

    fn exchange(
        me: &IdentityPair,
        them: &PublicKeys,
        record_usage: bool,
        preamble: &[u8],
    ) -> Result<Self> {
        let kct = derive_kct(me, them, record_usage, preamble)?;

        let my_hash = me.public().hash();
        let their_hash = them.hash();
        if my_hash == their_hash {
            return Err(TunnelError::handshake(
                "peer identity hashes identically to ours",
            ));
        }
        let nonce_odd = my_hash > their_hash;

        let cipher = AeadCipher::new(&kct.key.to_aead_key());
        let systems_used = kct.systems_used().clone();

        debug!(nonce_odd, systems = systems_used.len(), "stream started");
        Ok(Self {
            kct: kct.key,
            cipher,
            nonce_odd,
            boxer: CounterNonce::new(nonce_odd),
            unboxer: CounterNonce::new(!nonce_odd),
            state: StreamState::Started,
            systems_used,
        })
    }

    /// Seal a message under the current send nonce; the counter
    /// post-increments.
    ///
    /// # Errors
    ///
    /// `TunnelError::Crypto` if the stream is closed, the AEAD refuses, or
    /// the nonce counter is exhausted.
    pub fn seal(&mut self, msg: &[u8]) -> Result<Vec<u8>> {
        self.ensure_active()?;

        let sealed = self
            .cipher
            .encrypt(&self.boxer.current(), msg, None)
            .map_err(|e| TunnelError::crypto(e.to_string()))?;
        self.boxer
            .advance()
            .map_err(|e| TunnelError::crypto(e.to_string()))?;

        if self.state == StreamState::Started {
            self.state = StreamState::Open;
        }
        Ok(sealed)
    }

    /// Open a ciphertext under the peer's expected nonce; the counter
    /// advances only on success.
    ///
    /// A rejected ciphertext (tampering, replay, cross-stream confusion)
    /// closes the stream permanently.
    ///
    /// # Errors
    ///
    /// `TunnelError::Auth` on MAC failure; `TunnelError::Crypto` if the
    /// stream is already closed.
    pub fn open(&mut self, sealed: &[u8]) -> Result<Vec<u8>> {
        self.ensure_active()?;

        match self.cipher.decrypt(&self.unboxer.current(), sealed, None) {
            Ok(msg) => {
                self.unboxer
                    .advance()
                    .map_err(|e| TunnelError::crypto(e.to_string()))?;
                if self.state == StreamState::Started {
                    self.state = StreamState::Open;
                }
                Ok(msg)
            }
            Err(_) => {
                warn!("authentication failure, closing stream");
                self.state = StreamState::Closed;
                Err(TunnelError::Auth)
            }
        }
    }

    /// This peer's nonce-direction bit.
    pub fn nonce_odd(&self) -> bool {
        self.nonce_odd
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// The send-side nonce counter (test observability).
    pub fn boxer_counter(&self) -> u64 {
        self.boxer.counter()
    }

    /// Cryptosystems that contributed to the key exchange (recorded only
    /// when the stream was opened with `will_new_id`).
    pub fn systems_used(&self) -> &TagCounts {
        &self.systems_used
    }

    /// The derived session key (peers assert byte-identical derivation).
    pub fn session_key(&self) -> &SessionKey {
        &self.kct
    }

    fn ensure_active(&self) -> Result<()> {
        match self.state {
            StreamState::Closed => Err(TunnelError::crypto("stream is closed")),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("state", &self.state)
            .field("nonce_odd", &self.nonce_odd)
            .field("boxer_counter", &self.boxer.counter())
            .finish()
    }
}
