//! Ciphertext and tag must not depend on how a message is segmented

use bytes::BytesMut;
use cryptobox::split::{constrained_split, random_split, realistic_split};
use cryptobox::{
    decrypt_nm_inplace, decryptv_nm_inplace, encrypt_nm_inplace, encryptv_nm_inplace,
    CryptoError, Keypair, Nonce, SharedKey, Tag,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

const LENGTHS: &[usize] = &[0, 1, 2, 15, 16, 63, 64, 65, 127, 128, 2048, 2049, 64 * 1024 + 17];

fn shared_key() -> SharedKey {
    let ours = Keypair::generate();
    let theirs = Keypair::generate();
    ours.precompute(theirs.public_key()).unwrap()
}

fn random_message(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    rng.fill_bytes(&mut data);
    data
}

fn random_nonce(rng: &mut StdRng) -> Nonce {
    let mut nonce = [0u8; 24];
    rng.fill_bytes(&mut nonce);
    nonce
}

/// Reference result from the single-buffer path
fn reference(plaintext: &[u8], nonce: &Nonce, key: &SharedKey) -> (Vec<u8>, Tag) {
    let mut data = plaintext.to_vec();
    let tag = encrypt_nm_inplace(&mut data, nonce, key).unwrap();
    (data, tag)
}

#[test]
fn test_random_splits_match_single_buffer() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let key = shared_key();

    for &len in LENGTHS {
        let plaintext = random_message(&mut rng, len);
        let nonce = random_nonce(&mut rng);
        let (expected, expected_tag) = reference(&plaintext, &nonce, &key);

        for max_segments in [1, 2, 3, 8, 32] {
            let mut data = plaintext.clone();
            let mut segments = random_split(&mut data, max_segments, &mut rng);
            let tag = encryptv_nm_inplace(&mut segments, &nonce, &key).unwrap();
            drop(segments);

            assert_eq!(data, expected, "len {} max {}", len, max_segments);
            assert_eq!(tag, expected_tag, "len {} max {}", len, max_segments);
        }
    }
}

#[test]
fn test_realistic_splits_roundtrip() {
    let mut rng = StdRng::seed_from_u64(42);
    let key = shared_key();

    for &len in LENGTHS {
        let plaintext = random_message(&mut rng, len);
        let nonce = random_nonce(&mut rng);
        let (expected, expected_tag) = reference(&plaintext, &nonce, &key);

        let mut data = plaintext.clone();
        let mut segments = realistic_split(&mut data, 32, &mut rng);
        let tag = encryptv_nm_inplace(&mut segments, &nonce, &key).unwrap();
        assert_eq!(tag, expected_tag);

        // Decrypt under a different segmentation than the one used to encrypt
        drop(segments);
        assert_eq!(data, expected);
        let mut segments = realistic_split(&mut data, 32, &mut rng);
        decryptv_nm_inplace(&mut segments, &nonce, &key, &tag).unwrap();
        drop(segments);
        assert_eq!(data, plaintext);
    }
}

#[test]
fn test_constrained_splits_match_single_buffer() {
    let mut rng = StdRng::seed_from_u64(7);
    let key = shared_key();
    let plaintext = random_message(&mut rng, 64 * 1024 + 17);
    let nonce = random_nonce(&mut rng);
    let (expected, expected_tag) = reference(&plaintext, &nonce, &key);

    for constraint in [0, 1, 7, 32, 63, 64, 65, 100, 4096] {
        let mut data = plaintext.clone();
        let mut segments = constrained_split(&mut data, 32, constraint);
        let tag = encryptv_nm_inplace(&mut segments, &nonce, &key).unwrap();
        drop(segments);

        assert_eq!(data, expected, "constraint {}", constraint);
        assert_eq!(tag, expected_tag, "constraint {}", constraint);
    }
}

#[test]
fn test_fixed_cuts_around_block_boundaries() {
    let mut rng = StdRng::seed_from_u64(3);
    let key = shared_key();
    let len = 8192 + 1;
    let plaintext = random_message(&mut rng, len);
    let nonce = random_nonce(&mut rng);
    let (expected, expected_tag) = reference(&plaintext, &nonce, &key);

    let cut_sets: &[&[usize]] = &[
        &[len / 2],
        &[1],
        &[len - 3],
        &[2, 2049],
        &[63, 1, 64],
        &[0, 0, 0],
    ];
    for cuts in cut_sets {
        let mut data = plaintext.clone();
        let mut segments = Vec::new();
        let mut rest = &mut data[..];
        for &cut in *cuts {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(cut);
            segments.push(head);
            rest = tail;
        }
        segments.push(rest);

        let tag = encryptv_nm_inplace(&mut segments, &nonce, &key).unwrap();
        drop(segments);

        assert_eq!(data, expected, "cuts {:?}", cuts);
        assert_eq!(tag, expected_tag, "cuts {:?}", cuts);
    }
}

#[test]
fn test_bytes_mut_segments() {
    let mut rng = StdRng::seed_from_u64(99);
    let key = shared_key();
    let plaintext = random_message(&mut rng, 3000);
    let nonce = random_nonce(&mut rng);
    let (expected, expected_tag) = reference(&plaintext, &nonce, &key);

    let mut segments: Vec<BytesMut> = plaintext
        .chunks(700)
        .map(BytesMut::from)
        .collect();
    let tag = encryptv_nm_inplace(&mut segments, &nonce, &key).unwrap();

    assert_eq!(tag, expected_tag);
    assert_eq!(segments.concat(), expected);

    decryptv_nm_inplace(&mut segments, &nonce, &key, &tag).unwrap();
    assert_eq!(segments.concat(), plaintext);
}

#[test]
fn test_deterministic_and_nonce_sensitive() {
    let key = shared_key();
    let plaintext = vec![0u8; 300];

    let (first, first_tag) = reference(&plaintext, &[1; 24], &key);
    let (second, second_tag) = reference(&plaintext, &[1; 24], &key);
    assert_eq!(first, second);
    assert_eq!(first_tag, second_tag);

    let mut nonce = [1u8; 24];
    nonce[23] ^= 0x80;
    let (third, third_tag) = reference(&plaintext, &nonce, &key);
    assert_ne!(first, third);
    assert_ne!(first_tag, third_tag);
}

#[test]
fn test_bit_flips_are_rejected() {
    let mut rng = StdRng::seed_from_u64(1234);
    let key = shared_key();
    let nonce = random_nonce(&mut rng);
    let plaintext = random_message(&mut rng, 500);
    let (ciphertext, tag) = reference(&plaintext, &nonce, &key);

    for _ in 0..64 {
        let mut data = ciphertext.clone();
        let byte = rng.gen_range(0..data.len());
        data[byte] ^= 1 << rng.gen_range(0..8);
        let tampered = data.clone();

        assert_eq!(
            decrypt_nm_inplace(&mut data, &nonce, &key, &tag),
            Err(CryptoError::AuthenticationFailure)
        );
        assert_eq!(data, tampered);
    }

    for byte in 0..tag.len() {
        let mut bad_tag = tag;
        bad_tag[byte] ^= 0x40;
        let mut data = ciphertext.clone();
        assert!(decrypt_nm_inplace(&mut data, &nonce, &key, &bad_tag).is_err());
    }
}

#[test]
fn test_zero_fuzz_loop() {
    let mut rng = StdRng::seed_from_u64(2024);
    let key = shared_key();

    for _ in 0..200 {
        let len = rng.gen_range(0..5000);
        let nonce = random_nonce(&mut rng);
        let mut data = vec![0u8; len];

        let mut segments = random_split(&mut data, 32, &mut rng);
        let tag = encryptv_nm_inplace(&mut segments, &nonce, &key).unwrap();
        drop(segments);

        decrypt_nm_inplace(&mut data, &nonce, &key, &tag).unwrap();
        assert!(data.iter().all(|&b| b == 0), "len {}", len);
    }
}

proptest! {
    #[test]
    fn prop_split_invariance(
        plaintext in proptest::collection::vec(any::<u8>(), 0..1500),
        cuts in proptest::collection::vec(0usize..1500, 0..10),
        key_bytes in any::<[u8; 32]>(),
        nonce in any::<[u8; 24]>(),
    ) {
        let key = SharedKey::from_bytes(key_bytes);
        let (expected, expected_tag) = reference(&plaintext, &nonce, &key);

        let mut cuts: Vec<usize> = cuts.into_iter().map(|c| c.min(plaintext.len())).collect();
        cuts.sort_unstable();

        let mut data = plaintext.clone();
        let mut segments = Vec::new();
        let mut rest = &mut data[..];
        let mut consumed = 0;
        for cut in cuts {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(cut - consumed);
            segments.push(head);
            rest = tail;
            consumed = cut;
        }
        segments.push(rest);

        let tag = encryptv_nm_inplace(&mut segments, &nonce, &key).unwrap();
        let ciphertext: Vec<u8> = segments.iter().flat_map(|s| s.iter().copied()).collect();
        decryptv_nm_inplace(&mut segments, &nonce, &key, &tag).unwrap();
        drop(segments);

        prop_assert_eq!(tag, expected_tag);
        prop_assert_eq!(ciphertext, expected);
        prop_assert_eq!(data, plaintext);
    }
}
