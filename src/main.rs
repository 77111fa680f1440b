//! Entropy Accumulator CLI
//!
//! Command-line interface for exercising and demonstrating the entropy
//! accumulator: builds a context from configuration, draws conditioned
//! output, and optionally runs the self-test battery.

use clap::Parser;
use entropy_accumulator::{
    accumulator_self_test, source_bias_test, FileConfig, OsSource, ReseedableRng,
};
use rand_core::RngCore;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "entropy-accumulator", version, about = "Multi-source entropy accumulator demo")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of random bytes to produce (overrides the config).
    #[arg(short = 'n', long)]
    bytes: Option<usize>,

    /// Run the self-test battery and exit.
    #[arg(long)]
    self_test: bool,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Entropy Accumulator v{}", entropy_accumulator::VERSION);

    if args.self_test {
        std::process::exit(run_self_tests());
    }

    let config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    let bytes = args.bytes.unwrap_or(config.output.bytes);

    let accumulator = match config.accumulator.build() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Failed to build accumulator: {}", e);
            std::process::exit(1);
        }
    };

    info!(sources = accumulator.source_count(), "Accumulator ready");

    // Pre-warm the accumulator before the first extraction
    for _ in 0..config.output.prewarm_rounds {
        if let Err(e) = accumulator.gather() {
            warn!("Gather round failed: {}", e);
        }
    }

    let output = match accumulator.extract(bytes) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Extraction failed: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Conditioned entropy: {}",
        output
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<String>()
    );

    for status in accumulator.source_status() {
        info!(
            name = %status.name,
            strength = %status.strength,
            threshold = status.threshold,
            "Source satisfied its threshold this cycle"
        );
    }

    // Demonstrate the DRBG coupling: reseed a ChaCha20 CSPRNG from the
    // accumulator and generate some output.
    let mut rng = ReseedableRng::from_os_entropy();
    match rng.reseed_from(&accumulator) {
        Ok(()) => {
            let mut sample = [0u8; 32];
            rng.fill_bytes(&mut sample);
            println!(
                "CSPRNG output:       {}",
                sample
                    .iter()
                    .map(|b| format!("{:02x}", b))
                    .collect::<String>()
            );
        }
        Err(e) => warn!("Reseed failed: {}", e),
    }

    info!("Done. Reseed count: {}", rng.reseed_count());
}

/// Runs both self-test probes, logging outcomes. Returns the exit code.
fn run_self_tests() -> i32 {
    let mut failed = false;

    match source_bias_test(&mut OsSource::new()) {
        Ok(()) => info!("Bias probe: passed"),
        Err(e) => {
            warn!("Bias probe: failed: {}", e);
            failed = true;
        }
    }

    match accumulator_self_test() {
        Ok(()) => info!("Functional probe: passed"),
        Err(e) => {
            warn!("Functional probe: failed: {}", e);
            failed = true;
        }
    }

    i32::from(failed)
}
