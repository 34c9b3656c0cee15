//! Encryption scenarios over one zeroed buffer
//!
//! Every scenario encrypts the buffer through some segmentation, then
//! decrypts it through the single-buffer path and checks that it is all
//! zeroes again. Any mismatch aborts the run.

use std::time::Instant;

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use cryptobox::split::{constrained_split, random_split, realistic_split};
use cryptobox::{
    decrypt_inplace, decrypt_nm_inplace, encrypt_nm_inplace, encryptv_nm_inplace, Nonce,
    PublicKey, SecretKey, SharedKey, Tag,
};

use crate::config::HarnessConfig;

#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub name: &'static str,
    pub segments: usize,
    pub seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct FuzzReport {
    pub strategy: &'static str,
    pub iterations: usize,
    pub seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct HarnessReport {
    pub config: HarnessConfig,
    pub scenarios: Vec<ScenarioReport>,
    pub fuzz: Vec<FuzzReport>,
}

#[derive(Clone, Copy)]
enum Strategy {
    Random,
    Realistic,
    Constrained,
}

impl Strategy {
    fn name(self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::Realistic => "realistic",
            Strategy::Constrained => "constrained",
        }
    }
}

pub struct Harness {
    config: HarnessConfig,
    buf: Vec<u8>,
    key: SharedKey,
    nonce: Nonce,
    rng: StdRng,
    scenarios: Vec<ScenarioReport>,
    fuzz: Vec<FuzzReport>,
}

impl Harness {
    /// Allocate the zeroed buffer and draw a random key and nonce
    pub fn new(config: HarnessConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut key = [0u8; 32];
        rng.fill_bytes(&mut key);
        let mut nonce = [0u8; 24];
        rng.fill_bytes(&mut nonce);

        Self {
            buf: vec![0u8; config.mapping_size],
            key: SharedKey::from_bytes(key),
            nonce,
            rng,
            config,
            scenarios: Vec::new(),
            fuzz: Vec::new(),
        }
    }

    /// Run every scenario and fuzz loop in order.
    pub fn run(mut self) -> Result<HarnessReport> {
        known_answer()?;

        self.baseline()?;

        let len = self.buf.len();
        self.fixed("bulk", vec![])?;
        self.fixed("2 equal chunks", vec![len / 2])?;
        self.fixed("small and large chunks", vec![1])?;
        self.fixed("large and small chunks", vec![len.saturating_sub(3)])?;
        let cut = if len > 1 {
            self.rng.gen_range(1..len)
        } else {
            len
        };
        self.fixed("random 2 chunks", vec![cut])?;
        self.fixed("small, medium and large chunks", vec![2, 2 + 2049])?;

        let max = self.config.max_segments;
        let lens = self.split_lens(Strategy::Random, max, 0);
        self.segmented("random split", &lens)?;
        let lens = self.split_lens(Strategy::Realistic, max, 0);
        self.segmented("realistic split", &lens)?;
        let lens = self.split_lens(Strategy::Constrained, max + 1, 32);
        self.segmented("constrained split", &lens)?;

        self.fuzz(Strategy::Random)?;
        self.fuzz(Strategy::Realistic)?;
        self.fuzz(Strategy::Constrained)?;

        Ok(HarnessReport {
            config: self.config,
            scenarios: self.scenarios,
            fuzz: self.fuzz,
        })
    }

    fn baseline(&mut self) -> Result<()> {
        let start = Instant::now();
        let tag = encrypt_nm_inplace(&mut self.buf, &self.nonce, &self.key)?;
        let seconds = start.elapsed().as_secs_f64();

        self.check_zeroed(&tag)?;
        info!(seconds, "baseline encryption");
        self.scenarios.push(ScenarioReport {
            name: "baseline",
            segments: 1,
            seconds,
        });
        Ok(())
    }

    /// Split at absolute offsets `cuts`, clamped to the buffer.
    fn fixed(&mut self, name: &'static str, cuts: Vec<usize>) -> Result<()> {
        let len = self.buf.len();
        let mut lens = Vec::with_capacity(cuts.len() + 1);
        let mut prev = 0;
        for cut in cuts {
            let cut = cut.clamp(prev, len);
            lens.push(cut - prev);
            prev = cut;
        }
        lens.push(len - prev);
        self.segmented(name, &lens)
    }

    fn segmented(&mut self, name: &'static str, lens: &[usize]) -> Result<()> {
        let (tag, seconds) = self.encrypt_split(lens)?;
        self.check_zeroed(&tag)
            .with_context(|| format!("{} of {} segments", name, lens.len()))?;

        info!(segments = lens.len(), seconds, "{} encryption", name);
        self.scenarios.push(ScenarioReport {
            name,
            segments: lens.len(),
            seconds,
        });
        Ok(())
    }

    fn fuzz(&mut self, strategy: Strategy) -> Result<()> {
        let max = self.config.max_segments.max(1);
        let start = Instant::now();

        for i in 0..self.config.fuzz_iterations {
            let (max_segments, constraint) = match strategy {
                Strategy::Constrained => (self.rng.gen_range(0..=i % max * 10) + 1, i),
                _ => (self.rng.gen_range(0..=i % max * 2) + 1, 0),
            };
            let lens = self.split_lens(strategy, max_segments, constraint);
            let (tag, _) = self.encrypt_split(&lens)?;
            self.check_zeroed(&tag).with_context(|| {
                format!(
                    "{} fuzz iteration {} with {} segments",
                    strategy.name(),
                    i,
                    lens.len()
                )
            })?;

            if i % 1000 == 0 {
                info!(iterations = i, "{} fuzz", strategy.name());
            }
        }

        self.fuzz.push(FuzzReport {
            strategy: strategy.name(),
            iterations: self.config.fuzz_iterations,
            seconds: start.elapsed().as_secs_f64(),
        });
        Ok(())
    }

    fn split_lens(
        &mut self,
        strategy: Strategy,
        max_segments: usize,
        constraint: usize,
    ) -> Vec<usize> {
        let segments = match strategy {
            Strategy::Random => random_split(&mut self.buf, max_segments, &mut self.rng),
            Strategy::Realistic => realistic_split(&mut self.buf, max_segments, &mut self.rng),
            Strategy::Constrained => constrained_split(&mut self.buf, max_segments, constraint),
        };
        segments.iter().map(|s| s.len()).collect()
    }

    /// Encrypt the buffer cut into consecutive segments of `lens` bytes.
    fn encrypt_split(&mut self, lens: &[usize]) -> Result<(Tag, f64)> {
        let mut segments = Vec::with_capacity(lens.len());
        let mut rest = &mut self.buf[..];
        for &len in lens {
            if len > rest.len() {
                bail!("segment lengths exceed the buffer");
            }
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(len);
            segments.push(head);
            rest = tail;
        }
        if !rest.is_empty() {
            bail!("segment lengths do not cover the buffer");
        }

        debug!(segments = segments.len(), "Encrypting split buffer");
        let start = Instant::now();
        let tag = encryptv_nm_inplace(&mut segments, &self.nonce, &self.key)?;
        Ok((tag, start.elapsed().as_secs_f64()))
    }

    fn check_zeroed(&mut self, tag: &Tag) -> Result<()> {
        decrypt_nm_inplace(&mut self.buf, &self.nonce, &self.key, tag)
            .context("decryption failed")?;
        if let Some(pos) = self.buf.iter().position(|&b| b != 0) {
            bail!("decrypted buffer is not zero at offset {}", pos);
        }
        Ok(())
    }
}

/// Decrypt a message sealed by a second key pair and compare it to the
/// expected plaintext.
fn known_answer() -> Result<()> {
    const NONCE: Nonce = [
        227, 151, 41, 137, 191, 238, 172, 191, 15, 194, 173, 236, 31, 251, 122, 91, 69, 177, 81,
        65, 178, 202, 244, 184,
    ];
    const TAG: Tag = [
        59, 255, 197, 155, 66, 151, 167, 219, 3, 134, 67, 197, 191, 78, 111, 232,
    ];
    const SENDER_PUBLIC: PublicKey = [
        93, 85, 4, 76, 136, 253, 180, 212, 246, 186, 173, 91, 7, 136, 111, 161, 134, 247, 14,
        107, 167, 45, 250, 5, 214, 247, 193, 69, 18, 129, 255, 71,
    ];
    const RECIPIENT_SECRET: [u8; 32] = [
        104, 17, 235, 221, 214, 25, 30, 219, 122, 129, 252, 117, 191, 31, 70, 55, 202, 222, 235,
        189, 82, 37, 209, 177, 173, 66, 22, 58, 132, 113, 97, 115,
    ];

    let mut data: [u8; 16] = [
        71, 44, 215, 255, 50, 46, 219, 43, 139, 247, 159, 106, 250, 94, 213, 71,
    ];
    decrypt_inplace(
        &mut data,
        &NONCE,
        &SENDER_PUBLIC,
        &SecretKey::from_bytes(RECIPIENT_SECRET),
        &TAG,
    )
    .context("known answer failed to authenticate")?;

    if &data != b"Manish Malik! ;)" {
        bail!("known answer decrypted to the wrong plaintext");
    }
    info!("known answer passed");
    Ok(())
}
