//! CPU instruction source (`RDRAND`): x86/x86_64 hardware RNG, gated at
//! runtime the same way the PRF registry gates its SIMD backends.

#![cfg(any(target_arch = "x86", target_arch = "x86_64"))]

#[cfg(target_arch = "x86")]
use core::arch::x86::_rdrand64_step;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::_rdrand64_step;

use super::{Source, SourceFlags};
use crate::error::Error;

/// Maximum retries per 8-byte word per the Intel RDRAND programming
/// guidance (a transient underflow is expected to clear within a few
/// attempts).
const MAX_RETRIES: u32 = 10;

#[target_feature(enable = "rdrand")]
unsafe fn rdrand64() -> Option<u64> {
    let mut word = 0u64;
    for _ in 0..MAX_RETRIES {
        if _rdrand64_step(&mut word) == 1 {
            return Some(word);
        }
    }
    None
}

/// Reads seed bytes from the `RDRAND` instruction.
pub(crate) struct Rdrand;

impl Source for Rdrand {
    fn flags(&self) -> SourceFlags {
        SourceFlags::SRC_RDRAND | SourceFlags::FL_CPU | SourceFlags::FL_STRONG | SourceFlags::FL_FAST
    }

    fn fill(&self, out: &mut [u8]) -> Result<(), Error> {
        cpufeatures::new!(rdrand_cpuid, "rdrand");
        if !rdrand_cpuid::init().get() {
            return Err(Error::INIT_STRONG_RNG);
        }

        for chunk in out.chunks_mut(8) {
            // Safety: guarded by the `rdrand` cpuid check above.
            let word = unsafe { rdrand64() }.ok_or(Error::ACCESS_STRONG_RNG)?;
            let bytes = word.to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_requested_length_when_available() {
        let mut out = [0u8; 20];
        match Rdrand.fill(&mut out) {
            Ok(()) => assert_ne!(out, [0u8; 20]),
            Err(e) => assert_eq!(e, Error::INIT_STRONG_RNG),
        }
    }
}
