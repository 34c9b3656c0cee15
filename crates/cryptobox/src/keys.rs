//! Key material and X25519 key exchange

use chacha20::cipher::consts::U10;
use chacha20::cipher::generic_array::GenericArray;
use chacha20::hchacha;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, warn};
use x25519_dalek::{PublicKey as DalekPublicKey, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    CryptoError, CryptoResult, Nonce, PublicKey, Tag, NONCE_SIZE, PUBLIC_KEY_SIZE,
    SECRET_KEY_SIZE, SHARED_KEY_SIZE, TAG_SIZE,
};

/// X25519 secret key. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; SECRET_KEY_SIZE]);

impl SecretKey {
    /// Wrap raw secret key bytes
    pub fn from_bytes(bytes: [u8; SECRET_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Copy a secret key out of a slice of exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; SECRET_KEY_SIZE] =
            bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
                expected: SECRET_KEY_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Get the secret key bytes
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecretKey").field(&"[REDACTED]").finish()
    }
}

/// Precomputed shared key (`nm`) for a pair of peers. Zeroized on drop.
///
/// Derived by [`nm_precompute`]; both sides of an exchange arrive at the same
/// value. Reusable for any number of messages as long as every message uses
/// a distinct nonce.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedKey([u8; SHARED_KEY_SIZE]);

impl SharedKey {
    /// Wrap raw key bytes, e.g. a key restored from secure storage.
    pub fn from_bytes(bytes: [u8; SHARED_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Copy a shared key out of a slice of exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; SHARED_KEY_SIZE] =
            bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
                expected: SHARED_KEY_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Get the shared key bytes
    pub fn as_bytes(&self) -> &[u8; SHARED_KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedKey").field(&"[REDACTED]").finish()
    }
}

/// Static X25519 key pair
#[derive(Clone)]
pub struct Keypair {
    secret: SecretKey,
    public: PublicKey,
}

impl Keypair {
    /// Generate a new key pair from the OS random source
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        Self::from_static(&secret)
    }

    /// Rebuild a key pair from stored secret key bytes
    pub fn from_secret_bytes(bytes: [u8; SECRET_KEY_SIZE]) -> Self {
        let secret = StaticSecret::from(bytes);
        Self::from_static(&secret)
    }

    fn from_static(secret: &StaticSecret) -> Self {
        let public = DalekPublicKey::from(secret);
        Self {
            secret: SecretKey(secret.to_bytes()),
            public: *public.as_bytes(),
        }
    }

    /// Get the public key bytes
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Get the secret key
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    /// Precompute the shared key with a peer
    pub fn precompute(&self, their_public: &PublicKey) -> CryptoResult<SharedKey> {
        nm_precompute(their_public, &self.secret)
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("public", &self.public)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Derive the shared key for `their_public` and `our_secret`.
///
/// The X25519 output is hashed with HChaCha20 under an all-zero input so the
/// result is a uniform key rather than a raw curve coordinate. Swapping the
/// roles of two key pairs yields the same key.
///
/// Fails with [`CryptoError::InvalidKeyMaterial`] when the peer key is a
/// low-order point and the exchange degenerates to the identity.
pub fn nm_precompute(their_public: &PublicKey, our_secret: &SecretKey) -> CryptoResult<SharedKey> {
    let secret = StaticSecret::from(our_secret.0);
    let shared = secret.diffie_hellman(&DalekPublicKey::from(*their_public));

    if !shared.was_contributory() {
        warn!("Key exchange produced a degenerate shared secret");
        return Err(CryptoError::InvalidKeyMaterial);
    }

    let mut hashed = hchacha::<U10>(
        GenericArray::from_slice(shared.as_bytes()),
        &GenericArray::default(),
    );

    let mut nm = [0u8; SHARED_KEY_SIZE];
    nm.copy_from_slice(&hashed);
    hashed.as_mut_slice().zeroize();

    debug!("Precomputed shared key");
    Ok(SharedKey(nm))
}

/// Generate a random nonce from the OS random source
pub fn generate_nonce() -> Nonce {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Convert a 32-byte slice into a public key
pub fn public_key_from_slice(bytes: &[u8]) -> CryptoResult<PublicKey> {
    bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
        expected: PUBLIC_KEY_SIZE,
        actual: bytes.len(),
    })
}

/// Convert a 24-byte slice into a nonce
pub fn nonce_from_slice(bytes: &[u8]) -> CryptoResult<Nonce> {
    bytes.try_into().map_err(|_| CryptoError::InvalidNonceLength {
        expected: NONCE_SIZE,
        actual: bytes.len(),
    })
}

/// Convert a 16-byte slice into a tag
pub fn tag_from_slice(bytes: &[u8]) -> CryptoResult<Tag> {
    bytes.try_into().map_err(|_| CryptoError::InvalidTagLength {
        expected: TAG_SIZE,
        actual: bytes.len(),
    })
}
