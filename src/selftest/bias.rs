//! Statistical bias probe for a single entropy source.

use super::SelfTestError;
use crate::source::EntropySource;
use zeroize::Zeroizing;

/// Size of each probe sample in bytes.
const SAMPLE_LEN: usize = 16;

/// Checks one source for obvious bias or a stuck output.
///
/// Draws two independent samples directly from the source, bypassing the
/// accumulator. Fails if either sample is all-zero-bits or all-one-bits,
/// or if the two samples are bit-for-bit identical (pattern detection).
pub fn source_bias_test(source: &mut dyn EntropySource) -> Result<(), SelfTestError> {
    let first = gather_sample(source)?;
    let second = gather_sample(source)?;

    check_bits(&first[..])?;
    check_bits(&second[..])?;

    if first[..] == second[..] {
        tracing::warn!(name = source.name(), "bias probe: repeated sample");
        return Err(SelfTestError::RepeatedSample);
    }

    tracing::debug!(name = source.name(), "bias probe passed");
    Ok(())
}

/// Assembles one full probe sample from bounded repeated polls.
fn gather_sample(
    source: &mut dyn EntropySource,
) -> Result<Zeroizing<[u8; SAMPLE_LEN]>, SelfTestError> {
    let mut sample = Zeroizing::new([0u8; SAMPLE_LEN]);
    let mut filled = 0;
    let mut attempts = SAMPLE_LEN;

    while attempts > 0 && filled < SAMPLE_LEN {
        let n = source.poll(&mut sample[filled..])?;
        filled += n.min(SAMPLE_LEN - filled);
        attempts -= 1;
    }

    if filled < SAMPLE_LEN {
        return Err(SelfTestError::ShortSample {
            got: filled,
            want: SAMPLE_LEN,
        });
    }
    Ok(sample)
}

/// Fails if every bit of the sample is unset, or every bit is set.
fn check_bits(sample: &[u8]) -> Result<(), SelfTestError> {
    let mut set = 0xFFu8;
    let mut unset = 0x00u8;
    for &byte in sample {
        set &= byte;
        unset |= byte;
    }
    if set == 0xFF || unset == 0x00 {
        return Err(SelfTestError::StuckBits);
    }
    Ok(())
}
