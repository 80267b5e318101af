//! # Tunnel
//!
//! Orchestrates the two-stage handshake:
//!
//! 1. **Stream AB** — over the long-term identities, with usage recording,
//!    so each side learns which cryptosystems actually contributed
//! 2. **Stream final** — over fresh ephemeral identities generated from
//!    exactly those systems; supersedes Stream AB and carries all
//!    application traffic, giving the session forward secrecy
//!
//! Stream AB stays reachable (`seal_ab`/`open_ab`) for handshake-phase
//! messages only.

use crate::multikey::{IdentityPair, PublicKeys};
use crate::tunnel::error::{Result, TunnelError};
use crate::tunnel::stream::Stream;
use tracing::debug;

/// A two-stage tunnel between two multi-key identities.
///
/// Owns the long-term stream, the ephemeral identity, and (once
/// established) the final ephemeral stream.
pub struct Tunnel {
    stream_ab: Stream,
    stream_final: Option<Stream>,
    ephemeral: IdentityPair,
    peer_ephemeral: Option<PublicKeys>,
}

impl Tunnel {
    /// Initiator-side construction.
    ///
    /// Builds Stream AB over the long-term identities with usage recording,
    /// then generates an ephemeral identity over exactly the cryptosystems
    /// that contributed.
    ///
    /// # Errors
    ///
    /// Propagates handshake and key-generation failures; the tunnel is not
    /// constructed.
    pub fn initiate(self_long: &IdentityPair, them_long: &PublicKeys) -> Result<Self> {
        let stream_ab = Stream::exchange_start(self_long, them_long, true)?;
        let ephemeral = IdentityPair::generate(stream_ab.systems_used(), false)?;

        debug!(systems = stream_ab.systems_used().len(), "tunnel initiated");
        Ok(Self {
            stream_ab,
            stream_final: None,
            ephemeral,
            peer_ephemeral: None,
        })
    }

    /// Responder-side construction.
    ///
    /// Parses the initiator-supplied handshake preamble (the initiator's
    /// serialized ephemeral public container), completes the long-term
    /// exchange symmetrically, and generates this side's ephemeral
    /// identity.
    ///
    /// # Errors
    ///
    /// `TunnelError::Multikey` when the preamble is malformed; handshake
    /// failures as [`Tunnel::initiate`].
    pub fn respond(
        self_long: &IdentityPair,
        them_long: &PublicKeys,
        preamble: &[u8],
    ) -> Result<Self> {
        let peer_ephemeral = PublicKeys::deserialize(preamble)?;
        let stream_ab = Stream::exchange_done(self_long, them_long, preamble)?;
        let ephemeral = IdentityPair::generate(stream_ab.systems_used(), false)?;

        debug!(systems = stream_ab.systems_used().len(), "tunnel responded");
        Ok(Self {
            stream_ab,
            stream_final: None,
            ephemeral,
            peer_ephemeral: Some(peer_ephemeral),
        })
    }

    /// The handshake preamble this side sends: its serialized ephemeral
    /// public container.
    pub fn handshake_preamble(&self) -> Vec<u8> {
        self.ephemeral.public().serialize()
    }

    /// This side's ephemeral public container.
    pub fn ephemeral_public(&self) -> &PublicKeys {
        self.ephemeral.public()
    }

    /// Build the final stream from the ephemeral identities. It supersedes
    /// Stream AB for [`Tunnel::seal`]/[`Tunnel::open`].
    ///
    /// # Errors
    ///
    /// Handshake failures leave the tunnel with Stream AB only.
    pub fn create_ctf(&mut self, their_ephemeral: &PublicKeys) -> Result<()> {
        let stream = Stream::exchange_start(&self.ephemeral, their_ephemeral, false)?;
        self.stream_final = Some(stream);
        debug!("ephemeral stream established");
        Ok(())
    }

    /// Responder convenience: build the final stream from the ephemeral
    /// public container the initiator sent in its preamble.
    ///
    /// # Errors
    ///
    /// `TunnelError::Handshake` when no preamble-parsed container is held
    /// (initiator side, or already consumed).
    pub fn create_ctf_from_preamble(&mut self) -> Result<()> {
        let theirs = self.peer_ephemeral.take().ok_or_else(|| {
            TunnelError::handshake("no peer ephemeral container from preamble")
        })?;
        self.create_ctf(&theirs)
    }

    /// Seal a message on the final ephemeral stream.
    ///
    /// # Errors
    ///
    /// `TunnelError::Handshake` before [`Tunnel::create_ctf`]; stream
    /// errors otherwise.
    pub fn seal(&mut self, msg: &[u8]) -> Result<Vec<u8>> {
        self.stream_final_mut()?.seal(msg)
    }

    /// Open a ciphertext on the final ephemeral stream.
    ///
    /// # Errors
    ///
    /// As [`Tunnel::seal`]; `TunnelError::Auth` closes the final stream.
    pub fn open(&mut self, sealed: &[u8]) -> Result<Vec<u8>> {
        self.stream_final_mut()?.open(sealed)
    }

    /// Seal on the long-term stream (handshake-phase messages only).
    pub fn seal_ab(&mut self, msg: &[u8]) -> Result<Vec<u8>> {
        self.stream_ab.seal(msg)
    }

    /// Open on the long-term stream (handshake-phase messages only).
    pub fn open_ab(&mut self, sealed: &[u8]) -> Result<Vec<u8>> {
        self.stream_ab.open(sealed)
    }

    /// The long-term stream.
    pub fn stream_ab(&self) -> &Stream {
        &self.stream_ab
    }

    /// The final ephemeral stream, once established.
    pub fn stream_final(&self) -> Option<&Stream> {
        self.stream_final.as_ref()
    }

    fn stream_final_mut(&mut self) -> Result<&mut Stream> {
        self.stream_final
            .as_mut()
            .ok_or_else(|| TunnelError::handshake("ephemeral stream not established"))
    }
}

impl std::fmt::Debug for Tunnel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tunnel")
            .field("stream_ab", &self.stream_ab)
            .field("final_established", &self.stream_final.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multikey::{CryptoTag, TagCounts};

    fn peers() -> (IdentityPair, IdentityPair) {
        let counts = TagCounts::from([(CryptoTag::X25519, 1)]);
        (
            IdentityPair::generate(&counts, false).unwrap(),
            IdentityPair::generate(&counts, false).unwrap(),
        )
    }

    fn tunnels() -> (Tunnel, Tunnel) {
        let (alice, bob) = peers();
        let ta = Tunnel::initiate(&alice, bob.public()).unwrap();
        let tb = Tunnel::respond(&bob, alice.public(), &ta.handshake_preamble()).unwrap();
        (ta, tb)
    }

    #[test]
    fn test_long_term_streams_agree() {
        let (ta, tb) = tunnels();
        assert_eq!(
            ta.stream_ab().session_key(),
            tb.stream_ab().session_key()
        );
    }

    #[test]
    fn test_ephemeral_covers_contributing_systems() {
        let (ta, _tb) = tunnels();
        assert_eq!(ta.ephemeral_public().count_in(CryptoTag::X25519), 1);
        assert_eq!(ta.ephemeral_public().count_systems_used(), 1);
    }

    #[test]
    fn test_seal_before_ctf_fails() {
        let (mut ta, _tb) = tunnels();
        assert!(matches!(ta.seal(b"early"), Err(TunnelError::Handshake(_))));
    }

    #[test]
    fn test_malformed_preamble_rejected() {
        let (alice, bob) = peers();
        let result = Tunnel::respond(&bob, alice.public(), b"not a container");
        assert!(matches!(result, Err(TunnelError::Multikey(_))));
    }

    #[test]
    fn test_full_two_stage_handshake() {
        let (mut ta, mut tb) = tunnels();

        tb.create_ctf_from_preamble().unwrap();
        let bob_eph = PublicKeys::deserialize(&tb.handshake_preamble()).unwrap();
        ta.create_ctf(&bob_eph).unwrap();

        assert_eq!(
            ta.stream_final().unwrap().session_key(),
            tb.stream_final().unwrap().session_key()
        );
        // Ephemeral key differs from the long-term key
        assert_ne!(
            ta.stream_final().unwrap().session_key(),
            ta.stream_ab().session_key()
        );

        let sealed = ta.seal(b"over the ephemeral stream").unwrap();
        assert_eq!(tb.open(&sealed).unwrap(), b"over the ephemeral stream");
    }

    #[test]
    fn test_create_ctf_from_preamble_is_responder_only() {
        let (mut ta, _tb) = tunnels();
        assert!(matches!(
            ta.create_ctf_from_preamble(),
            Err(TunnelError::Handshake(_))
        ));
    }
}
