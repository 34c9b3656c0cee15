use cryptobox::split::constrained_split;
use cryptobox::{
    decrypt_nm_inplace, encrypt_nm_inplace, encryptv_nm_inplace, Keypair, Nonce, SharedKey,
};

const NONCE: Nonce = [0x5A; 24];

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

fn make_key() -> SharedKey {
    let ours = Keypair::generate();
    let theirs = Keypair::generate();
    ours.precompute(theirs.public_key()).unwrap()
}

#[divan::bench]
fn bench_precompute(bencher: divan::Bencher) {
    let ours = Keypair::generate();
    let theirs = Keypair::generate();
    bencher.bench(|| ours.precompute(divan::black_box(theirs.public_key())).unwrap());
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt_single(bencher: divan::Bencher, size: usize) {
    let key = make_key();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .with_inputs(|| data.clone())
        .bench_local_refs(|buf| encrypt_nm_inplace(buf, &NONCE, divan::black_box(&key)).unwrap());
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt_single(bencher: divan::Bencher, size: usize) {
    let key = make_key();
    let mut ciphertext = make_data(size);
    let tag = encrypt_nm_inplace(&mut ciphertext, &NONCE, &key).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .with_inputs(|| ciphertext.clone())
        .bench_local_refs(|buf| {
            decrypt_nm_inplace(buf, &NONCE, divan::black_box(&key), &tag).unwrap()
        });
}

/// Segments of 63 bytes force every block through the stitching path.
#[divan::bench(args = [64, 63, 4096])]
fn bench_encrypt_vectored(bencher: divan::Bencher, segment: usize) {
    const SIZE: usize = 65536;
    let key = make_key();
    let data = make_data(SIZE);
    bencher
        .counter(divan::counter::BytesCount::new(SIZE))
        .with_inputs(|| data.clone())
        .bench_local_refs(|buf| {
            let mut segments = constrained_split(buf, usize::MAX, segment);
            encryptv_nm_inplace(&mut segments, &NONCE, divan::black_box(&key)).unwrap()
        });
}

fn main() {
    divan::main();
}
