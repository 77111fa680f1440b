//! OS-provided entropy source.

use super::{EntropySource, PollError};
use rand_core::{OsRng, RngCore};

/// Entropy source backed by the operating system CSPRNG.
///
/// Delegates to [`rand_core::OsRng`], which reads the platform randomness
/// facility (`getrandom(2)`, `/dev/urandom`, …). This is the default strong
/// source for an accumulator.
#[derive(Debug, Default)]
pub struct OsSource;

impl OsSource {
    /// Creates an OS-backed source.
    pub fn new() -> Self {
        Self
    }
}

impl EntropySource for OsSource {
    fn name(&self) -> &'static str {
        "os"
    }

    fn poll(&mut self, buf: &mut [u8]) -> Result<usize, PollError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| PollError::ReadFailed(e.to_string()))?;
        Ok(buf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_requested_length() {
        let mut source = OsSource::new();
        let mut buf = [0u8; 64];
        let n = source.poll(&mut buf).unwrap();
        assert_eq!(n, 64);
    }

    #[test]
    fn test_empty_buffer_is_legal() {
        let mut source = OsSource::new();
        let mut buf = [0u8; 0];
        assert_eq!(source.poll(&mut buf).unwrap(), 0);
    }
}
