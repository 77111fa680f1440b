//! Self-test battery for entropy sources and the accumulator pipeline.
//!
//! Two probes: a statistical bias check run directly against one source,
//! and an end-to-end functional check of the whole gather/condition/extract
//! chain. Both report pass/fail through their `Result`; neither aborts the
//! process. These are sanity checks that catch an obviously degraded or
//! stuck source, not proofs of entropy quality.

mod bias;
mod functional;

pub use bias::source_bias_test;
pub use functional::accumulator_self_test;

use crate::accumulator::EntropyError;
use crate::source::PollError;
use thiserror::Error;

/// Self-test failures.
#[derive(Debug, Error)]
pub enum SelfTestError {
    /// Some bit position was constant across an entire sample.
    #[error("sample bits are all zero or all one")]
    StuckBits,
    /// Two consecutive samples were byte-for-byte identical.
    #[error("source repeated an identical sample")]
    RepeatedSample,
    /// The source could not fill a sample within the attempt budget.
    #[error("source produced {got} of {want} requested bytes")]
    ShortSample {
        /// Bytes actually delivered.
        got: usize,
        /// Bytes the probe asked for.
        want: usize,
    },
    /// The source under test returned a poll error.
    #[error("source poll failed")]
    Poll(#[from] PollError),
    /// The accumulator pipeline itself returned an error.
    #[error("accumulator pipeline failed")]
    Pipeline(#[from] EntropyError),
    /// An output byte position stayed zero across every draw.
    #[error("output byte {index} was zero across all draws")]
    DeadOutputByte {
        /// Index of the dead byte within the output block.
        index: usize,
    },
}
