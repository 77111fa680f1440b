//! Software timing-jitter entropy source.
//!
//! Harvests scheduling and clock-resolution jitter by timing short bursts
//! of arithmetic work and keeping the least-significant bit of each elapsed
//! time. This is a weak source: it supplements the mix but is never trusted
//! to carry an extraction on its own.

use super::{EntropySource, PollError};
use std::hint::black_box;
use std::time::Instant;

/// Bytes a single poll will produce at most.
///
/// Each byte costs eight timed work bursts, so this bound keeps a poll
/// comfortably inside the accumulator's non-blocking budget.
const MAX_POLL_BYTES: usize = 8;

/// Weak entropy source based on CPU timing jitter.
#[derive(Debug)]
pub struct JitterSource {
    /// Arithmetic iterations per timed burst.
    spin: u32,
}

impl JitterSource {
    /// Creates a jitter source with the default burst length.
    pub fn new() -> Self {
        Self { spin: 64 }
    }

    /// Times one burst of arithmetic work and returns the elapsed nanoseconds.
    fn timed_burst(&self) -> u64 {
        let start = Instant::now();
        let mut x = 0u64;
        for i in 0..self.spin {
            x = black_box(x.wrapping_mul(6364136223846793005).wrapping_add(u64::from(i)));
        }
        black_box(x);
        start.elapsed().as_nanos() as u64
    }
}

impl Default for JitterSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for JitterSource {
    fn name(&self) -> &'static str {
        "timing_jitter"
    }

    fn poll(&mut self, buf: &mut [u8]) -> Result<usize, PollError> {
        let n = buf.len().min(MAX_POLL_BYTES);
        for byte in buf.iter_mut().take(n) {
            let mut b = 0u8;
            for _ in 0..8 {
                b = (b << 1) | (self.timed_burst() & 1) as u8;
            }
            *byte = b;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_is_bounded() {
        let mut source = JitterSource::new();
        let mut buf = [0u8; 128];
        let n = source.poll(&mut buf).unwrap();
        assert_eq!(n, MAX_POLL_BYTES);
    }

    #[test]
    fn test_small_buffer_not_overrun() {
        let mut source = JitterSource::new();
        let mut buf = [0u8; 3];
        let n = source.poll(&mut buf).unwrap();
        assert_eq!(n, 3);
    }
}
