//! Harness configuration

use clap::Parser;
use serde::Serialize;

/// One keystream mapping of 8192 blocks plus a trailing byte
pub const DEFAULT_MAPPING_SIZE: usize = 64 * 8192 + 1;
pub const DEFAULT_MAX_SEGMENTS: usize = 32;
pub const DEFAULT_FUZZ_ITERATIONS: usize = 10_000;

#[derive(Parser, Debug, Clone, Serialize)]
#[command(
    name = "cryptobox-harness",
    version,
    about = "Time and fuzz in-place encryption over scattered segments"
)]
pub struct HarnessConfig {
    /// Size of the zeroed buffer encrypted by every scenario
    #[arg(long, env = "CRYPTOBOX_MAPPING_SIZE", default_value_t = DEFAULT_MAPPING_SIZE)]
    pub mapping_size: usize,

    /// Segment cap for the split scenarios
    #[arg(long, env = "CRYPTOBOX_MAX_SEGMENTS", default_value_t = DEFAULT_MAX_SEGMENTS)]
    pub max_segments: usize,

    /// Iterations of each fuzz loop
    #[arg(long, env = "CRYPTOBOX_FUZZ_ITERATIONS", default_value_t = DEFAULT_FUZZ_ITERATIONS)]
    pub fuzz_iterations: usize,

    /// Seed for split generation; random when unset
    #[arg(long, env = "CRYPTOBOX_SEED")]
    pub seed: Option<u64>,

    /// Print the timing report as JSON on stdout
    #[arg(long, env = "CRYPTOBOX_JSON")]
    #[serde(skip)]
    pub json: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            mapping_size: DEFAULT_MAPPING_SIZE,
            max_segments: DEFAULT_MAX_SEGMENTS,
            fuzz_iterations: DEFAULT_FUZZ_ITERATIONS,
            seed: None,
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cli_defaults() {
        let parsed = HarnessConfig::parse_from(["cryptobox-harness"]);
        let default = HarnessConfig::default();

        assert_eq!(parsed.mapping_size, default.mapping_size);
        assert_eq!(parsed.max_segments, default.max_segments);
        assert_eq!(parsed.fuzz_iterations, default.fuzz_iterations);
        assert!(!parsed.json);
    }

    #[test]
    fn test_flags_override() {
        let parsed = HarnessConfig::parse_from([
            "cryptobox-harness",
            "--mapping-size",
            "4097",
            "--fuzz-iterations",
            "3",
            "--seed",
            "9",
            "--json",
        ]);

        assert_eq!(parsed.mapping_size, 4097);
        assert_eq!(parsed.fuzz_iterations, 3);
        assert_eq!(parsed.seed, Some(9));
        assert!(parsed.json);
    }
}
