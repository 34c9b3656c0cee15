//! Peer session with a precomputed key and per-message nonces

use std::ops::DerefMut;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::{
    decryptv_nm_inplace, encryptv_nm_inplace, generate_nonce, CryptoResult, Keypair, Nonce,
    PublicKey, SharedKey, Tag,
};

/// Established session between two peers.
///
/// The shared key is computed once at construction and reused for every
/// message. Each sealed message gets a fresh random 192-bit nonce, so the
/// caller never picks nonces and cannot repeat one. The session is `Sync`
/// and may be shared between worker threads.
pub struct CryptoSession {
    /// Precomputed shared key
    key: SharedKey,
    /// Messages sealed
    sealed: AtomicU64,
    /// Messages opened successfully
    opened: AtomicU64,
}

impl CryptoSession {
    /// Create a session from our key pair and the peer's public key
    pub fn new(our_keypair: &Keypair, their_public: &PublicKey) -> CryptoResult<Self> {
        let key = our_keypair.precompute(their_public)?;
        debug!("Crypto session established");
        Ok(Self::from_shared_key(key))
    }

    /// Create a session from an already precomputed key
    pub fn from_shared_key(key: SharedKey) -> Self {
        Self {
            key,
            sealed: AtomicU64::new(0),
            opened: AtomicU64::new(0),
        }
    }

    /// Encrypt segments in place.
    ///
    /// Returns the nonce that must travel with the message, and its tag.
    pub fn seal_in_place<S: DerefMut<Target = [u8]>>(
        &self,
        segments: &mut [S],
    ) -> CryptoResult<(Nonce, Tag)> {
        let nonce = generate_nonce();
        let tag = encryptv_nm_inplace(segments, &nonce, &self.key)?;
        self.sealed.fetch_add(1, Ordering::Relaxed);
        Ok((nonce, tag))
    }

    /// Encrypt one buffer in place.
    pub fn seal_buffer(&self, data: &mut [u8]) -> CryptoResult<(Nonce, Tag)> {
        self.seal_in_place(&mut [data])
    }

    /// Verify and decrypt segments in place.
    pub fn open_in_place<S: DerefMut<Target = [u8]>>(
        &self,
        segments: &mut [S],
        nonce: &Nonce,
        tag: &Tag,
    ) -> CryptoResult<()> {
        decryptv_nm_inplace(segments, nonce, &self.key, tag)?;
        self.opened.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Verify and decrypt one buffer in place.
    pub fn open_buffer(&self, data: &mut [u8], nonce: &Nonce, tag: &Tag) -> CryptoResult<()> {
        self.open_in_place(&mut [data], nonce, tag)
    }

    /// Get the number of sealed messages (for debugging/stats)
    pub fn sealed_count(&self) -> u64 {
        self.sealed.load(Ordering::Relaxed)
    }

    /// Get the number of opened messages (for debugging/stats)
    pub fn opened_count(&self) -> u64 {
        self.opened.load(Ordering::Relaxed)
    }
}
