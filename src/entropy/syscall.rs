//! OS random-syscall source (`CRYPTGENRANDOM`): `getrandom(2)` on Linux,
//! `BCryptGenRandom`/`CryptGenRandom` on Windows, the platform syscall
//! everywhere the `getrandom` crate supports. This is the same crate the
//! teacher's own optional `rng` feature pulls in transitively through
//! `rand_core`.

use super::{Source, SourceFlags};
use crate::error::Error;

/// Reads seed bytes via the OS's random-number syscall.
pub(crate) struct Syscall;

impl Source for Syscall {
    fn flags(&self) -> SourceFlags {
        SourceFlags::SRC_CRYPTGENRANDOM | SourceFlags::FL_OS | SourceFlags::FL_STRONG
    }

    fn fill(&self, out: &mut [u8]) -> Result<(), Error> {
        getrandom::getrandom(out).map_err(|_| Error::ACCESS_STRONG_RNG)
    }
}
