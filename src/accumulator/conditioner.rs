//! Hash-stream conditioning of raw entropy samples.
//!
//! All source contributions are folded into one shared hash stream. Each
//! sample is prefixed with a two-byte header (source identifier and sample
//! length) so that contributions from different sources, or differently
//! sized contributions from the same source, can never be confused with
//! one another.

use sha2::Digest;
use zeroize::Zeroizing;

/// Accumulator hash function, selected at build time.
#[cfg(not(feature = "sha512"))]
pub(crate) type AccumulatorHash = sha2::Sha256;
#[cfg(feature = "sha512")]
pub(crate) type AccumulatorHash = sha2::Sha512;

/// Digest width of the accumulator hash in bytes.
///
/// This is also the maximum number of bytes a single extraction can return.
#[cfg(not(feature = "sha512"))]
pub const BLOCK_SIZE: usize = 32;
/// Digest width of the accumulator hash in bytes.
///
/// This is also the maximum number of bytes a single extraction can return.
#[cfg(feature = "sha512")]
pub const BLOCK_SIZE: usize = 64;

/// Shared hash stream accumulating conditioned samples.
///
/// The stream is started lazily on the first [`feed`](HashStream::feed) and
/// keeps accumulating across arbitrarily many calls until an extraction
/// finalizes it.
pub(crate) struct HashStream {
    hasher: AccumulatorHash,
    started: bool,
}

impl HashStream {
    pub fn new() -> Self {
        Self {
            hasher: AccumulatorHash::new(),
            started: false,
        }
    }

    /// Folds one sample into the stream under the given source identifier.
    ///
    /// Samples longer than [`BLOCK_SIZE`] are first compressed to block size
    /// with a one-shot digest, so long samples cannot bypass mixing.
    pub fn feed(&mut self, source_id: u8, sample: &[u8]) {
        let mut compressed = Zeroizing::new([0u8; BLOCK_SIZE]);
        let sample = if sample.len() > BLOCK_SIZE {
            compressed.copy_from_slice(&AccumulatorHash::digest(sample));
            &compressed[..]
        } else {
            sample
        };

        let header = [source_id, (sample.len() & 0xFF) as u8];
        self.started = true;
        self.hasher.update(header);
        self.hasher.update(sample);
    }

    /// Finalizes the stream and reseeds it from its own digest.
    ///
    /// The internal digest is immediately hashed back into the fresh stream,
    /// so the accumulator state is never fully determined by the value handed
    /// out. The returned digest is a second, independent hash of the internal
    /// one; raw accumulator state never leaves this module.
    pub fn finalize_and_reseed(&mut self) -> Zeroizing<[u8; BLOCK_SIZE]> {
        debug_assert!(self.started, "finalizing a stream that was never fed");

        let mut internal = Zeroizing::new([0u8; BLOCK_SIZE]);
        internal.copy_from_slice(&self.hasher.finalize_reset());

        self.hasher.update(&internal[..]);
        self.started = true;

        let mut output = Zeroizing::new([0u8; BLOCK_SIZE]);
        output.copy_from_slice(&AccumulatorHash::digest(&internal[..]));
        output
    }

    /// Discards all accumulated state.
    pub fn wipe(&mut self) {
        self.hasher = AccumulatorHash::new();
        self.started = false;
    }
}
