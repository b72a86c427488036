//! Multi-source entropy combiner.
//!
//! Pulls bytes from several independent OS/hardware sources, XORs them
//! into a seed buffer, and reports success only if at least one
//! cryptographically strong source contributed.

pub(crate) mod egd;
pub(crate) mod rdrand;
pub(crate) mod syscall;
pub(crate) mod urandom;

use crate::error::Error;
use bitflags::bitflags;
use zeroize::Zeroize;

bitflags! {
    /// Entropy-source provenance/strength tags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SourceFlags: u32 {
        /// Device RNG file (e.g. `/dev/urandom`).
        const SRC_RANDOMDEV      = 0b0000_0000_0001;
        /// OS random syscall (`getrandom(2)` / `BCryptGenRandom`).
        const SRC_CRYPTGENRANDOM = 0b0000_0000_0010;
        /// CPU `RDRAND` instruction.
        const SRC_RDRAND         = 0b0000_0000_0100;
        /// External EGD daemon.
        const SRC_EGD            = 0b0000_0000_1000;
        /// Source is provided by the operating system.
        const FL_OS     = 0b0001_0000_0000;
        /// Source is provided by the CPU.
        const FL_CPU    = 0b0010_0000_0000;
        /// Source is believed cryptographically unpredictable.
        const FL_STRONG = 0b0100_0000_0000;
        /// Source is cheap enough to call on every reseed without concern.
        const FL_FAST   = 0b1000_0000_0000;
    }
}

/// Upper bound on a single combiner call: no caller in this crate ever
/// seeds with more than [`crate::prf::MAX_STATE_BYTES`] bytes, so the
/// combiner's scratch buffer can live on the stack instead of the heap.
pub(crate) const MAX_SEED_LEN: usize = crate::prf::MAX_STATE_BYTES;

/// One entropy source: fills a buffer with exactly its length in bytes,
/// or fails outright (no partial successes).
pub(crate) trait Source: Send + Sync {
    /// Provenance/strength tag for this source.
    fn flags(&self) -> SourceFlags;
    /// Fills `out` completely, or returns an error.
    fn fill(&self, out: &mut [u8]) -> Result<(), Error>;
}

/// Iterates `sources` in order, XOR-combining the output of every
/// enabled (`flags & disabled == 0`) and selected (`flags & select ==
/// select`) source into `out`. Succeeds iff the union of flags from
/// sources that actually contributed includes [`SourceFlags::FL_STRONG`].
/// On total failure, returns the last error observed (or
/// [`Error::INIT_STRONG_RNG`] if no source was even attempted).
pub(crate) fn combine(
    sources: &[&dyn Source],
    out: &mut [u8],
    disabled: SourceFlags,
    select: SourceFlags,
) -> Result<SourceFlags, Error> {
    assert!(out.len() <= MAX_SEED_LEN, "seed requests never exceed MAX_SEED_LEN");
    out.fill(0);

    let mut scratch = [0u8; MAX_SEED_LEN];
    let scratch = &mut scratch[..out.len()];

    let mut accumulated = SourceFlags::empty();
    let mut last_err = Error::INIT_STRONG_RNG;

    for source in sources {
        let flags = source.flags();
        if flags.intersects(disabled) {
            continue;
        }
        if !flags.contains(select) {
            continue;
        }
        match source.fill(scratch) {
            Ok(()) => {
                for (dst, src) in out.iter_mut().zip(scratch.iter()) {
                    *dst ^= src;
                }
                accumulated |= flags;
            }
            Err(e) => last_err = e,
        }
    }

    scratch.zeroize();

    if accumulated.contains(SourceFlags::FL_STRONG) {
        Ok(accumulated)
    } else {
        Err(last_err)
    }
}
