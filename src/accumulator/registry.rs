//! Bounded, ordered collection of registered entropy sources.
//!
//! Registration order is preserved and is the polling order of every gather
//! round. That ordering is a caller-visible protocol detail: it decides
//! which source is queried first each round.

use super::context::EntropyError;
use crate::source::{EntropySource, Strength};

/// Maximum number of sources a single accumulator accepts.
pub const MAX_SOURCES: usize = 20;

/// Reserved conditioning identifier for manually injected material.
///
/// Registered sources are identified by their registry index, which is
/// always below [`MAX_SOURCES`].
pub(crate) const MANUAL_SOURCE_ID: u8 = MAX_SOURCES as u8;

/// One registered source together with its per-cycle bookkeeping.
pub(crate) struct SourceDescriptor {
    pub source: Box<dyn EntropySource>,
    /// Bytes this source must contribute before an extraction may complete.
    pub threshold: usize,
    pub strength: Strength,
    /// Bytes contributed since the last successful extraction.
    pub accumulated: usize,
}

pub(crate) struct SourceRegistry {
    entries: Vec<SourceDescriptor>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(MAX_SOURCES),
        }
    }

    /// Appends a source, rejecting capacity overflow and zero thresholds.
    pub fn push(
        &mut self,
        source: Box<dyn EntropySource>,
        threshold: usize,
        strength: Strength,
    ) -> Result<(), EntropyError> {
        if self.entries.len() >= MAX_SOURCES {
            return Err(EntropyError::TooManySources);
        }
        if threshold == 0 {
            return Err(EntropyError::InvalidThreshold);
        }
        self.entries.push(SourceDescriptor {
            source,
            threshold,
            strength,
            accumulated: 0,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SourceDescriptor> {
        self.entries.iter_mut()
    }

    /// True if every source has met its per-cycle threshold.
    pub fn all_satisfied(&self) -> bool {
        self.entries.iter().all(|d| d.accumulated >= d.threshold)
    }

    /// True if at least one strong source is registered.
    ///
    /// Presence is what counts here, not whether the source contributed any
    /// bytes this cycle.
    pub fn has_strong(&self) -> bool {
        self.entries.iter().any(|d| d.strength == Strength::Strong)
    }

    /// Resets every per-cycle counter. Called only by a completed extraction.
    pub fn reset_accumulated(&mut self) {
        for descriptor in &mut self.entries {
            descriptor.accumulated = 0;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
