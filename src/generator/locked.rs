//! The mutex-guarded engine flavor: `Sync`, safe to share across threads
//! behind a single lock. Mirrors the "twin" relationship the source
//! draws between its locked and nolock engine variants — same `Inner`
//! state machine, different synchronization discipline.

use std::sync::Mutex;

use crate::config::Config;
use crate::entropy::{self, Source, SourceFlags};
use crate::error::Error;
use crate::prf;
use zeroize::Zeroize;

use super::{build_sources, Inner};

/// A CSPRNG engine safe to share across threads. Every operation takes
/// the internal lock for its duration; callers on other threads block
/// rather than observe a half-updated state.
pub struct Engine {
    inner: Mutex<Inner>,
}

impl Engine {
    /// Builds a new engine from `cfg`, performing the initial reseed.
    ///
    /// # Errors
    ///
    /// Propagates any [`Error`] from entropy combination, PRF validation,
    /// or alignment as documented on [`Inner::init`].
    pub fn init(cfg: Config) -> Result<Self, Error> {
        Ok(Engine { inner: Mutex::new(Inner::init(cfg)?) })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Mixes additional seed material into the running key.
    ///
    /// When `seed` is supplied, this runs entirely under the lock, same
    /// as every other operation. When it is `None`/empty, `spec.md` §5
    /// recommends releasing the lock around the entropy combiner call
    /// (which may block on OS I/O) so other threads' `rand_bytes` calls
    /// aren't serialized behind it: this snapshots what's needed under
    /// a brief lock, drops it, draws entropy unlocked, then reacquires
    /// the lock only to mix the result in.
    ///
    /// # Errors
    ///
    /// Propagates [`Error`] from the entropy combiner when `seed` is
    /// `None`/empty and live entropy must be drawn instead.
    pub fn add_seed(&self, seed: Option<&[u8]>) -> Result<(), Error> {
        if let Some(s) = seed {
            if !s.is_empty() {
                return self.lock().add_seed(Some(s));
            }
        }

        let (state_bytes, entropy_cfg) = self.lock().snapshot_for_unlocked_seed();

        let mut seed_buf = [0u8; prf::MAX_STATE_BYTES];
        let sources = build_sources(&entropy_cfg);
        let refs: Vec<&dyn Source> = sources.iter().map(std::convert::AsRef::as_ref).collect();
        let drawn = entropy::combine(
            &refs,
            &mut seed_buf[..state_bytes],
            entropy_cfg.disabled_sources,
            SourceFlags::empty(),
        );

        let result = match drawn {
            Ok(_) => self.lock().add_seed(Some(&seed_buf[..state_bytes])),
            Err(e) => Err(e),
        };
        seed_buf.zeroize();
        result
    }

    /// Fills `out` with CSPRNG output.
    pub fn rand_bytes(&self, out: &mut [u8]) {
        self.lock().rand_bytes(out);
    }

    /// A uniformly random machine `unsigned int` (`u32`).
    #[must_use]
    pub fn rand_unsigned(&self) -> u32 {
        self.lock().rand_unsigned()
    }

    /// A uniformly random `u32`.
    #[must_use]
    pub fn rand_uint32(&self) -> u32 {
        self.lock().rand_uint32()
    }

    /// A uniformly random `u64`.
    #[must_use]
    pub fn rand_uint64(&self) -> u64 {
        self.lock().rand_uint64()
    }

    /// A uniformly random `u32` in `[0, top]`.
    #[must_use]
    pub fn rand_range(&self, top: u32) -> u32 {
        self.lock().rand_range(top)
    }

    /// A uniformly random `u64` in `[0, top]`.
    #[must_use]
    pub fn rand_range64(&self, top: u64) -> u64 {
        self.lock().rand_range64(top)
    }

    /// A documented no-op retained for API compatibility: this crate's
    /// forward secrecy is always active, so there is nothing to flush.
    pub fn stir(&self) {
        self.lock().stir();
    }

    /// Zeroes all key material and returns the engine to the
    /// uninitialized state; any later call besides `init` is fatal.
    pub fn wipe(&self) {
        self.lock().wipe();
    }

    /// Size in bytes of the locked engine's internal state record.
    #[must_use]
    pub fn size_of_state() -> usize {
        Inner::size_of()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}
