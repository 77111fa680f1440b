//! Entropy source abstraction.
//!
//! Every entropy source implements the [`EntropySource`] trait: a single
//! bounded-time `poll` operation that writes whatever unpredictable bytes
//! are currently available. Sources are registered with an accumulator
//! together with a quality class and a per-cycle byte threshold.

mod jitter;
mod mock;
mod os;

pub use jitter::JitterSource;
pub use mock::{ConstantSource, CyclingSource, FailingSource, SilentSource};
pub use os::OsSource;

use thiserror::Error;

/// Errors an entropy source may return from [`EntropySource::poll`].
#[derive(Debug, Clone, Error)]
pub enum PollError {
    /// The underlying device or facility is not available right now.
    #[error("source unavailable: {0}")]
    Unavailable(String),
    /// A read from the underlying device or facility failed.
    #[error("source read failed: {0}")]
    ReadFailed(String),
}

/// Quality class of an entropy source.
///
/// At least one `Strong` source must be registered before an accumulator
/// will produce output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    /// Believed to deliver full-quality entropy (hardware RNG, OS CSPRNG).
    Strong,
    /// Contributes mixing material but is not trusted on its own.
    Weak,
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strong => write!(f, "strong"),
            Self::Weak => write!(f, "weak"),
        }
    }
}

/// Trait for entropy sources.
///
/// Implementations must return promptly: polls run while the accumulator
/// lock is held, so a stalled source stalls every caller of that context.
/// Writing zero bytes is a legal "nothing available this round" response.
pub trait EntropySource: Send {
    /// Short identifier used in logs and status reports.
    fn name(&self) -> &'static str;

    /// Writes up to `buf.len()` bytes of raw entropy into `buf`.
    ///
    /// Returns the number of bytes actually written.
    fn poll(&mut self, buf: &mut [u8]) -> Result<usize, PollError>;
}
