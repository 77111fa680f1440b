//! CSPRNG reseeding interface.
//!
//! The accumulator is the seed source; this module is the downstream
//! deterministic-random-bit-generator side, wrapping a ChaCha-based CSPRNG
//! with support for periodic reseeding.

mod csprng;

pub use csprng::ReseedableRng;
