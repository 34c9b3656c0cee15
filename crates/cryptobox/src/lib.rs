//! Cryptobox - In-place authenticated encryption for worker and wire payloads
//!
//! X25519 key exchange (HChaCha20-hashed into an `nm` key) with XChaCha20 and
//! a streaming Poly1305 authenticator. Messages may be presented as one buffer
//! or as a list of disjoint segments; the ciphertext and tag do not depend on
//! how the message was split.
//!
//! Nonces must never repeat under the same key. Use [`generate_nonce`] or a
//! [`CryptoSession`], which draws a fresh nonce for every message.

mod auth;
mod engine;
mod error;
mod keys;
mod keystream;
mod segment;
mod session;
mod stream;

pub mod seed;
pub mod split;

pub use auth::*;
pub use engine::*;
pub use error::*;
pub use keys::*;
pub use keystream::*;
pub use segment::*;
pub use session::*;
pub use stream::*;

/// Public key size (256 bits / 32 bytes)
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Secret key size (256 bits / 32 bytes)
pub const SECRET_KEY_SIZE: usize = 32;

/// Precomputed shared key size (256 bits / 32 bytes)
pub const SHARED_KEY_SIZE: usize = 32;

/// Nonce size for XChaCha20 (192 bits / 24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Authentication tag size (128 bits / 16 bytes)
pub const TAG_SIZE: usize = 16;

/// Keystream block size
pub const BLOCK_SIZE: usize = 64;

/// Largest message the keystream can cover. Block 0 is reserved for the
/// authenticator key and the block counter is 32 bits wide.
pub const MAX_MESSAGE_LEN: u64 = (u32::MAX as u64 - 1) * BLOCK_SIZE as u64;

/// Public key bytes
pub type PublicKey = [u8; PUBLIC_KEY_SIZE];

/// Nonce bytes
pub type Nonce = [u8; NONCE_SIZE];

/// Authentication tag bytes
pub type Tag = [u8; TAG_SIZE];
