//! Process-wide seed for keyed hash tables
//!
//! Set once, either explicitly at startup with [`init_hash_seed`] or lazily
//! from the OS random source on the first [`hash_seed`] call. Initialization
//! happens exactly once even when several threads race on first use.

use std::sync::OnceLock;

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;

use crate::{CryptoError, CryptoResult};

static HASH_SEED: OnceLock<u64> = OnceLock::new();

/// Install the seed. Fails if a seed is already in place.
pub fn init_hash_seed(seed: u64) -> CryptoResult<()> {
    HASH_SEED
        .set(seed)
        .map_err(|_| CryptoError::HashSeedAlreadyInitialized)?;
    debug!("Hash seed initialized");
    Ok(())
}

/// Get the seed, generating a random non-zero one if none was installed.
pub fn hash_seed() -> u64 {
    *HASH_SEED.get_or_init(|| loop {
        let seed = OsRng.next_u64();
        if seed != 0 {
            break seed;
        }
    })
}
