//! Entropy Accumulator Library
//!
//! Pools multiple heterogeneous, variable-quality entropy sources into one
//! unpredictable, backtracking-resistant output stream. Intended as the
//! seed source wherever a TLS stack needs unguessable bytes: key
//! generation, nonces, handshake randomness.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! sources → gather round → conditioning → extraction → reseeding
//!     ↓                                       ↑
//! self-test battery                    manual update
//! ```
//!
//! # Design Principles
//!
//! - **Threshold-gated**: no output until every registered source has
//!   contributed its per-cycle byte minimum
//! - **Fail loud**: a failing source aborts the round with a typed error;
//!   silent weakening is never an option
//! - **Backtracking-resistant**: the accumulator reseeds itself from its own
//!   digest on every extraction, and callers only ever see a second,
//!   independent digest
//! - **Wiped on exit**: buffers holding raw or conditioned entropy are
//!   zeroized on every path, error paths included
//!
//! # Example
//!
//! ```
//! use entropy_accumulator::{EntropyAccumulator, ReseedableRng};
//!
//! // Accumulator with the built-in jitter (weak) and OS (strong) sources
//! let accumulator = EntropyAccumulator::with_default_sources();
//!
//! // Pre-warm, then draw conditioned output
//! accumulator.gather().unwrap();
//! let bytes = accumulator.extract(32).unwrap();
//! assert_eq!(bytes.len(), 32);
//!
//! // Or plug it into the downstream CSPRNG as its seed source
//! let mut rng = ReseedableRng::from_os_entropy();
//! rng.reseed_from(&accumulator).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod accumulator;
pub mod config;
pub mod reseeding;
pub mod selftest;
pub mod source;

// Re-export commonly used types at crate root
pub use accumulator::{
    EntropyAccumulator, EntropyError, SourceStatus, BLOCK_SIZE, MAX_GATHER, MAX_SOURCES,
};
pub use config::{AccumulatorConfig, ConfigError, FileConfig, OutputConfig};
pub use reseeding::ReseedableRng;
pub use selftest::{accumulator_self_test, source_bias_test, SelfTestError};
pub use source::{EntropySource, JitterSource, OsSource, PollError, Strength};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
