//! Incremental sealing and opening
//!
//! A call moves through `NOT_STARTED -> SUBKEY_DERIVED -> STREAMING ->
//! FINALIZED`, or ends in `FAILED` when an opener's tag does not verify.
//! The transitions are encoded in the types: constructing a [`Sealer`] or
//! [`Opener`] derives the subkey, feeding chunks is streaming, and the
//! consuming `finalize` / `verify` calls end the call. Only a
//! [`VerifiedOpener`] can produce plaintext.

use tracing::{trace, warn};

use crate::{Authenticator, CryptoResult, Keystream, Nonce, SharedKey, Tag};

/// Encrypt-then-authenticate over a message delivered in pieces
pub struct Sealer {
    keystream: Keystream,
    auth: Authenticator,
}

impl Sealer {
    /// Derive the one-time authenticator key and start the keystream
    pub fn new(key: &SharedKey, nonce: &Nonce) -> Self {
        let (keystream, auth_key) = Keystream::new(key, nonce);
        let auth = Authenticator::new(&auth_key);
        trace!("Sealer subkey derived");
        Self { keystream, auth }
    }

    /// Encrypt the next piece of the message in place.
    pub fn seal(&mut self, chunk: &mut [u8]) -> CryptoResult<()> {
        self.keystream.apply(chunk)?;
        self.auth.update(chunk);
        Ok(())
    }

    /// Bytes sealed so far
    pub fn position(&self) -> u64 {
        self.keystream.position()
    }

    /// Finish the message and return its tag
    pub fn finalize(self) -> Tag {
        trace!(len = self.position(), "Sealer finalized");
        self.auth.finalize()
    }
}

/// Authenticate-then-decrypt over a message delivered in pieces.
///
/// All ciphertext must pass through [`Opener::authenticate`] before
/// [`Opener::verify`] unlocks decryption.
pub struct Opener {
    keystream: Keystream,
    auth: Authenticator,
    authenticated: u64,
}

impl Opener {
    /// Derive the one-time authenticator key and start the keystream
    pub fn new(key: &SharedKey, nonce: &Nonce) -> Self {
        let (keystream, auth_key) = Keystream::new(key, nonce);
        let auth = Authenticator::new(&auth_key);
        trace!("Opener subkey derived");
        Self {
            keystream,
            auth,
            authenticated: 0,
        }
    }

    /// Feed the next piece of ciphertext to the authenticator.
    pub fn authenticate(&mut self, chunk: &[u8]) {
        self.auth.update(chunk);
        self.authenticated += chunk.len() as u64;
    }

    /// Check the tag over everything authenticated so far.
    pub fn verify(self, expected: &Tag) -> CryptoResult<VerifiedOpener> {
        match self.auth.verify(expected) {
            Ok(()) => {
                trace!(len = self.authenticated, "Opener verified");
                Ok(VerifiedOpener {
                    keystream: self.keystream,
                })
            }
            Err(e) => {
                warn!(len = self.authenticated, "Message authentication failed");
                Err(e)
            }
        }
    }
}

/// Decrypts a message whose tag has already been verified
pub struct VerifiedOpener {
    keystream: Keystream,
}

impl VerifiedOpener {
    /// Decrypt the next piece of the message in place.
    pub fn decrypt(&mut self, chunk: &mut [u8]) -> CryptoResult<()> {
        self.keystream.apply(chunk)
    }

    /// Bytes decrypted so far
    pub fn position(&self) -> u64 {
        self.keystream.position()
    }
}
