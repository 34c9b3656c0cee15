//! XChaCha20 keystream with the authenticator block reserved

use chacha20::cipher::{KeyIvInit, StreamCipher, StreamCipherSeek};
use chacha20::{Key, XChaCha20, XNonce};
use zeroize::Zeroizing;

use crate::{CryptoError, CryptoResult, Nonce, SharedKey, AUTH_KEY_SIZE, BLOCK_SIZE};

/// Keystream for one (key, nonce) pair.
///
/// Positions are message offsets: position 0 is the first byte of keystream
/// block 1, because block 0 belongs to the authenticator. The stream can be
/// consumed in pieces of any size and resumes exactly where the previous
/// piece ended.
pub struct Keystream {
    cipher: XChaCha20,
}

impl Keystream {
    /// Start a keystream, returning it together with the one-time
    /// authenticator key taken from block 0.
    pub fn new(key: &SharedKey, nonce: &Nonce) -> (Self, Zeroizing<[u8; AUTH_KEY_SIZE]>) {
        let mut cipher = XChaCha20::new(Key::from_slice(key.as_bytes()), XNonce::from_slice(nonce));

        // The whole first block is consumed; only its head keys the MAC.
        let mut block0 = Zeroizing::new([0u8; BLOCK_SIZE]);
        cipher.apply_keystream(block0.as_mut_slice());

        let mut auth_key = Zeroizing::new([0u8; AUTH_KEY_SIZE]);
        auth_key.copy_from_slice(&block0[..AUTH_KEY_SIZE]);

        (Self { cipher }, auth_key)
    }

    /// XOR the next `buf.len()` keystream bytes into `buf`.
    pub fn apply(&mut self, buf: &mut [u8]) -> CryptoResult<()> {
        self.cipher
            .try_apply_keystream(buf)
            .map_err(|_| CryptoError::MalformedSegmentList {
                reason: "message exceeds keystream range",
            })
    }

    /// Overwrite `out` with raw keystream bytes.
    pub fn fill(&mut self, out: &mut [u8]) -> CryptoResult<()> {
        out.fill(0);
        self.apply(out)
    }

    /// Current message offset
    pub fn position(&self) -> u64 {
        self.cipher.current_pos::<u64>() - BLOCK_SIZE as u64
    }

    /// Move to message offset `pos`.
    pub fn seek(&mut self, pos: u64) -> CryptoResult<()> {
        let absolute = pos
            .checked_add(BLOCK_SIZE as u64)
            .ok_or(CryptoError::MalformedSegmentList {
                reason: "offset exceeds keystream range",
            })?;
        self.cipher
            .try_seek(absolute)
            .map_err(|_| CryptoError::MalformedSegmentList {
                reason: "offset exceeds keystream range",
            })
    }

    /// Move to the start of message block `index`.
    pub fn seek_block(&mut self, index: u64) -> CryptoResult<()> {
        let pos = index
            .checked_mul(BLOCK_SIZE as u64)
            .ok_or(CryptoError::MalformedSegmentList {
                reason: "offset exceeds keystream range",
            })?;
        self.seek(pos)
    }
}
