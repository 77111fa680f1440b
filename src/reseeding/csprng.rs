//! ChaCha-based CSPRNG with reseeding support.
//!
//! Wraps the standard ChaCha20 CSPRNG with an interface for reseeding from
//! accumulator output.
//!
//! # Reseeding Model
//!
//! Reseeding uses BLAKE3 to mix:
//! - Previous seed material (retained across reseeds)
//! - New conditioned entropy
//! - A domain separator and reseed counter
//!
//! This follows NIST SP 800-90A style DRBG reseeding logic: non-linear
//! mixing via a cryptographic hash ensures that biased or partially
//! predictable inputs cannot degrade security.

use crate::accumulator::{EntropyAccumulator, EntropyError, BLOCK_SIZE};
use blake3::Hasher;
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use zeroize::{Zeroize, Zeroizing};

/// Domain separator for reseeding operations.
/// Ensures the hash context is distinct from other uses.
const RESEED_DOMAIN: &[u8] = b"entropy-accumulator-reseed-v1";

/// A reseedable CSPRNG backed by ChaCha20.
///
/// Initialized from OS entropy and periodically reseeded with conditioned
/// accumulator output, so that accumulator entropy supplements (not
/// replaces) the initial seed.
///
/// # Security Model
///
/// - Initial seed comes from OS entropy (trusted)
/// - Accumulator output is mixed in via BLAKE3 (non-linear)
/// - Previous seed material is retained and mixed with new entropy
/// - Compromising only the accumulator sources cannot predict outputs
pub struct ReseedableRng {
    /// The underlying ChaCha20 CSPRNG.
    inner: ChaCha20Rng,
    /// Retained seed material for mixing during reseed.
    /// This is NOT the ChaCha internal state.
    seed_material: [u8; 32],
    /// Total reseeds performed.
    reseed_count: u64,
    /// Bytes generated since last reseed.
    bytes_since_reseed: u64,
}

impl ReseedableRng {
    /// Creates a new CSPRNG seeded from the OS entropy source.
    pub fn from_os_entropy() -> Self {
        let mut seed_material = [0u8; 32];
        rand_core::OsRng.fill_bytes(&mut seed_material);

        Self {
            inner: ChaCha20Rng::from_seed(seed_material),
            seed_material,
            reseed_count: 0,
            bytes_since_reseed: 0,
        }
    }

    /// Creates a CSPRNG from a known seed (for testing only).
    #[cfg(test)]
    pub(crate) fn from_seed_for_testing(seed: [u8; 32]) -> Self {
        Self {
            inner: ChaCha20Rng::from_seed(seed),
            seed_material: seed,
            reseed_count: 0,
            bytes_since_reseed: 0,
        }
    }

    /// Reseeds the CSPRNG with conditioned entropy.
    ///
    /// The new seed is derived by hashing together the previous seed
    /// material, the new entropy, and a domain separator plus reseed
    /// counter. Non-linear mixing means a biased input cannot weaken the
    /// existing state.
    pub fn reseed(&mut self, entropy: &[u8]) {
        // new_seed = BLAKE3(domain || counter || old_seed_material || entropy)
        let mut hasher = Hasher::new();
        hasher.update(RESEED_DOMAIN);
        hasher.update(&self.reseed_count.to_le_bytes());
        hasher.update(&self.seed_material);
        hasher.update(entropy);

        let new_seed_material: [u8; 32] = *hasher.finalize().as_bytes();

        self.seed_material = new_seed_material;
        self.inner = ChaCha20Rng::from_seed(new_seed_material);
        self.reseed_count += 1;
        self.bytes_since_reseed = 0;

        tracing::info!(reseed_count = self.reseed_count, "CSPRNG reseeded");
    }

    /// Reseeds from a fresh block of accumulator output.
    ///
    /// This is the intended coupling point: the accumulator's fill callback
    /// is the DRBG seed source.
    pub fn reseed_from(&mut self, accumulator: &EntropyAccumulator) -> Result<(), EntropyError> {
        let mut block = Zeroizing::new([0u8; BLOCK_SIZE]);
        accumulator.fill(&mut block[..])?;
        self.reseed(&block[..]);
        Ok(())
    }

    /// Returns the number of reseeds performed.
    pub fn reseed_count(&self) -> u64 {
        self.reseed_count
    }

    /// Returns bytes generated since last reseed.
    pub fn bytes_since_reseed(&self) -> u64 {
        self.bytes_since_reseed
    }
}

impl rand_core::CryptoRng for ReseedableRng {}

impl Drop for ReseedableRng {
    fn drop(&mut self) {
        self.seed_material.zeroize();
    }
}

impl RngCore for ReseedableRng {
    fn next_u32(&mut self) -> u32 {
        self.bytes_since_reseed += 4;
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.bytes_since_reseed += 8;
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.bytes_since_reseed += dest.len() as u64;
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.bytes_since_reseed += dest.len() as u64;
        self.inner.try_fill_bytes(dest)
    }
}
