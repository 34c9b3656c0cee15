//! Cryptobox Harness
//!
//! Times in-place encryption of a zeroed buffer under many segmentations and
//! fuzzes the segment engine against the single-buffer path.

mod config;
mod harness;

use clap::Parser;
use tracing::info;

use config::HarnessConfig;
use harness::Harness;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cryptobox_harness=info".parse()?)
                .add_directive("cryptobox=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = HarnessConfig::parse();
    let json = config.json;
    info!(
        mapping_size = config.mapping_size,
        max_segments = config.max_segments,
        fuzz_iterations = config.fuzz_iterations,
        "Starting cryptobox harness"
    );

    let report = Harness::new(config).run()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    info!("All scenarios passed");

    Ok(())
}
