//! Entropy accumulation core.
//!
//! This module owns the shared conditioning hash stream, the bounded source
//! registry, and the extraction logic that gates output on every source
//! meeting its per-cycle threshold.

mod conditioner;
mod context;
mod registry;

pub use conditioner::BLOCK_SIZE;
pub use context::{EntropyAccumulator, EntropyError, SourceStatus, MAX_GATHER};
pub use registry::MAX_SOURCES;
