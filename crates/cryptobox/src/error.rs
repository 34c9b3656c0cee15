//! Cryptobox error types

use thiserror::Error;

/// Cryptographic operation error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid key material: key exchange produced a degenerate shared key")]
    InvalidKeyMaterial,

    #[error("Authentication failed: tag mismatch")]
    AuthenticationFailure,

    #[error("Malformed segment list: {reason}")]
    MalformedSegmentList { reason: &'static str },

    #[error("Output buffer too small: expected {expected}, got {actual}")]
    OutputBufferTooSmall { expected: usize, actual: usize },

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    #[error("Invalid tag length: expected {expected}, got {actual}")]
    InvalidTagLength { expected: usize, actual: usize },

    #[error("Hash seed already initialized")]
    HashSeedAlreadyInitialized,
}

pub type CryptoResult<T> = Result<T, CryptoError>;
