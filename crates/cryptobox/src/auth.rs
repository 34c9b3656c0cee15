//! Streaming Poly1305 authenticator

use poly1305::universal_hash::{KeyInit, UniversalHash};
use poly1305::{Block, Key, Poly1305};
use subtle::ConstantTimeEq;

use crate::{CryptoError, CryptoResult, Tag, TAG_SIZE};

/// One-time authenticator key size
pub const AUTH_KEY_SIZE: usize = 32;

const POLY_BLOCK_SIZE: usize = 16;

/// Incremental Poly1305 over an arbitrarily chunked byte stream.
///
/// Poly1305 consumes 16-byte blocks and pads only the final one, so a chunk
/// boundary inside a block would change the tag if it were fed straight
/// through. Up to 15 bytes are held back until the block completes, which
/// makes the tag independent of how the input was chunked.
#[derive(Clone)]
pub struct Authenticator {
    mac: Poly1305,
    pending: [u8; POLY_BLOCK_SIZE],
    pending_len: usize,
}

impl Authenticator {
    /// Start an authenticator under a one-time key
    pub fn new(key: &[u8; AUTH_KEY_SIZE]) -> Self {
        Self {
            mac: Poly1305::new(Key::from_slice(key)),
            pending: [0u8; POLY_BLOCK_SIZE],
            pending_len: 0,
        }
    }

    /// Absorb the next piece of ciphertext
    pub fn update(&mut self, mut data: &[u8]) {
        if self.pending_len > 0 {
            let take = (POLY_BLOCK_SIZE - self.pending_len).min(data.len());
            self.pending[self.pending_len..self.pending_len + take].copy_from_slice(&data[..take]);
            self.pending_len += take;
            data = &data[take..];

            if self.pending_len < POLY_BLOCK_SIZE {
                return;
            }
            self.mac.update(&[Block::clone_from_slice(&self.pending)]);
            self.pending_len = 0;
        }

        let whole = data.len() - data.len() % POLY_BLOCK_SIZE;
        if whole > 0 {
            // Exact multiple of the block size, so no padding is applied
            self.mac.update_padded(&data[..whole]);
        }

        let rest = &data[whole..];
        self.pending[..rest.len()].copy_from_slice(rest);
        self.pending_len = rest.len();
    }

    /// Pad the held-back tail and produce the tag
    pub fn finalize(self) -> Tag {
        let tag = self.mac.compute_unpadded(&self.pending[..self.pending_len]);
        let mut out = [0u8; TAG_SIZE];
        out.copy_from_slice(&tag);
        out
    }

    /// Finalize and compare against `expected` in constant time.
    pub fn verify(self, expected: &Tag) -> CryptoResult<()> {
        let computed = self.finalize();
        if bool::from(computed[..].ct_eq(&expected[..])) {
            Ok(())
        } else {
            Err(CryptoError::AuthenticationFailure)
        }
    }
}
