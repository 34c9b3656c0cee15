//! In-place encryption over one buffer or a list of segments
//!
//! The single-buffer functions are the one-segment case of the vectorized
//! ones and produce byte-identical output. Segments may be any mutable byte
//! container (`&mut [u8]`, `Vec<u8>`, `BytesMut`, `IoSliceMut`); they are
//! processed in list order as one message.
//!
//! Decryption verifies the tag over the untouched ciphertext first and only
//! then runs the keystream pass, so a failed call leaves the ciphertext in
//! place and never exposes unauthenticated plaintext.

use std::ops::DerefMut;

use tracing::trace;

use crate::{
    nm_precompute, CryptoError, CryptoResult, Nonce, Opener, PublicKey, Sealer, SecretKey,
    SegmentWalker, SharedKey, Tag, TAG_SIZE,
};

/// Encrypt `segments` in place with a precomputed key and return the tag.
pub fn encryptv_nm_inplace<S: DerefMut<Target = [u8]>>(
    segments: &mut [S],
    nonce: &Nonce,
    key: &SharedKey,
) -> CryptoResult<Tag> {
    let mut walker = SegmentWalker::new(segments)?;
    let mut sealer = Sealer::new(key, nonce);

    trace!(
        segments = walker.segment_count(),
        len = walker.total_len(),
        "Encrypting segments"
    );
    walker.try_for_each_block(|block| sealer.seal(block))?;

    Ok(sealer.finalize())
}

/// Verify and decrypt `segments` in place with a precomputed key.
///
/// On [`CryptoError::AuthenticationFailure`] the segments are left as they
/// were and must be discarded by the caller.
pub fn decryptv_nm_inplace<S: DerefMut<Target = [u8]>>(
    segments: &mut [S],
    nonce: &Nonce,
    key: &SharedKey,
    tag: &Tag,
) -> CryptoResult<()> {
    let mut walker = SegmentWalker::new(segments)?;
    let mut opener = Opener::new(key, nonce);

    trace!(
        segments = walker.segment_count(),
        len = walker.total_len(),
        "Decrypting segments"
    );
    walker.try_for_each_block(|block| {
        opener.authenticate(block);
        Ok::<(), CryptoError>(())
    })?;
    let mut verified = opener.verify(tag)?;

    walker.rewind();
    walker.try_for_each_block(|block| verified.decrypt(block))
}

/// Like [`encryptv_nm_inplace`], writing the tag into `tag_out`.
///
/// `tag_out` is checked before any segment is touched.
pub fn encryptv_nm_inplace_into<S: DerefMut<Target = [u8]>>(
    segments: &mut [S],
    nonce: &Nonce,
    key: &SharedKey,
    tag_out: &mut [u8],
) -> CryptoResult<()> {
    if tag_out.len() < TAG_SIZE {
        return Err(CryptoError::OutputBufferTooSmall {
            expected: TAG_SIZE,
            actual: tag_out.len(),
        });
    }
    let tag = encryptv_nm_inplace(segments, nonce, key)?;
    tag_out[..TAG_SIZE].copy_from_slice(&tag);
    Ok(())
}

/// Encrypt one buffer in place with a precomputed key.
pub fn encrypt_nm_inplace(data: &mut [u8], nonce: &Nonce, key: &SharedKey) -> CryptoResult<Tag> {
    encryptv_nm_inplace(&mut [data], nonce, key)
}

/// Verify and decrypt one buffer in place with a precomputed key.
pub fn decrypt_nm_inplace(
    data: &mut [u8],
    nonce: &Nonce,
    key: &SharedKey,
    tag: &Tag,
) -> CryptoResult<()> {
    decryptv_nm_inplace(&mut [data], nonce, key, tag)
}

/// Encrypt one buffer in place for the owner of `their_public`.
pub fn encrypt_inplace(
    data: &mut [u8],
    nonce: &Nonce,
    their_public: &PublicKey,
    our_secret: &SecretKey,
) -> CryptoResult<Tag> {
    let key = nm_precompute(their_public, our_secret)?;
    encrypt_nm_inplace(data, nonce, &key)
}

/// Verify and decrypt one buffer in place from the owner of `their_public`.
pub fn decrypt_inplace(
    data: &mut [u8],
    nonce: &Nonce,
    their_public: &PublicKey,
    our_secret: &SecretKey,
    tag: &Tag,
) -> CryptoResult<()> {
    let key = nm_precompute(their_public, our_secret)?;
    decrypt_nm_inplace(data, nonce, &key, tag)
}
