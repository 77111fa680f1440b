//! Deterministic mock sources for testing and demonstration.
//!
//! None of these produce entropy. They exist so that accumulator behavior
//! can be exercised with fully reproducible inputs.

use super::{EntropySource, PollError};

/// Source returning a fixed byte value, a fixed number of bytes per poll.
#[derive(Debug)]
pub struct ConstantSource {
    value: u8,
    chunk: usize,
}

impl ConstantSource {
    /// Creates a source yielding `chunk` copies of `value` per poll.
    pub fn new(value: u8, chunk: usize) -> Self {
        Self { value, chunk }
    }
}

impl EntropySource for ConstantSource {
    fn name(&self) -> &'static str {
        "mock_constant"
    }

    fn poll(&mut self, buf: &mut [u8]) -> Result<usize, PollError> {
        let n = buf.len().min(self.chunk);
        buf[..n].fill(self.value);
        Ok(n)
    }
}

/// Source replaying a fixed byte pattern from the start on every poll.
#[derive(Debug)]
pub struct CyclingSource {
    pattern: Vec<u8>,
}

impl CyclingSource {
    /// Creates a source replaying `pattern` on every poll.
    pub fn new(pattern: Vec<u8>) -> Self {
        Self { pattern }
    }
}

impl EntropySource for CyclingSource {
    fn name(&self) -> &'static str {
        "mock_cycling"
    }

    fn poll(&mut self, buf: &mut [u8]) -> Result<usize, PollError> {
        let n = buf.len().min(self.pattern.len());
        buf[..n].copy_from_slice(&self.pattern[..n]);
        Ok(n)
    }
}

/// Source that never has data available. Always returns zero bytes.
#[derive(Debug, Default)]
pub struct SilentSource;

impl EntropySource for SilentSource {
    fn name(&self) -> &'static str {
        "mock_silent"
    }

    fn poll(&mut self, _buf: &mut [u8]) -> Result<usize, PollError> {
        Ok(0)
    }
}

/// Source whose every poll fails.
#[derive(Debug, Default)]
pub struct FailingSource;

impl EntropySource for FailingSource {
    fn name(&self) -> &'static str {
        "mock_failing"
    }

    fn poll(&mut self, _buf: &mut [u8]) -> Result<usize, PollError> {
        Err(PollError::ReadFailed("mock failure".into()))
    }
}
