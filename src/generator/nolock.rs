//! The unsynchronized engine flavor: `Send` but never `Sync`. Useful
//! inside a single-threaded program, or one thread's exclusively-owned
//! engine, where the mutex overhead of [`super::locked::Engine`] buys
//! nothing.

use std::cell::UnsafeCell;

use crate::config::Config;
use crate::error::Error;

use super::Inner;

/// A CSPRNG engine with no internal synchronization. `Send` (it can be
/// handed to another thread) but not `Sync` (it can never be called
/// from two threads at once without external synchronization — calling
/// it concurrently from multiple threads is undefined behavior, not a
/// checked error).
pub struct EngineNolock {
    inner: UnsafeCell<Inner>,
}

// Safety: `Inner` itself has no thread-affine state; moving the whole
// engine to another thread and using it there exclusively is sound.
// `Sync` is deliberately not implemented: nothing here arbitrates
// concurrent access.
unsafe impl Send for EngineNolock {}

impl EngineNolock {
    /// Builds a new engine from `cfg`, performing the initial reseed.
    ///
    /// # Errors
    ///
    /// Propagates any [`Error`] from entropy combination, PRF validation,
    /// or alignment as documented on [`Inner::init`].
    pub fn init(cfg: Config) -> Result<Self, Error> {
        Ok(EngineNolock { inner: UnsafeCell::new(Inner::init(cfg)?) })
    }

    #[allow(clippy::mut_from_ref)]
    fn inner_mut(&self) -> &mut Inner {
        // Safety: `EngineNolock` is not `Sync`, so the borrow checker
        // already statically prevents two `&EngineNolock` from being
        // used to call into this from different threads at once; within
        // one thread, each public method's borrow is scoped to its own
        // call and none of them re-enter.
        unsafe { &mut *self.inner.get() }
    }

    /// Mixes additional seed material into the running key.
    ///
    /// # Errors
    ///
    /// Propagates [`Error`] from the entropy combiner when `seed` is
    /// `None`/empty and live entropy must be drawn instead.
    pub fn add_seed(&self, seed: Option<&[u8]>) -> Result<(), Error> {
        self.inner_mut().add_seed(seed)
    }

    /// Fills `out` with CSPRNG output.
    pub fn rand_bytes(&self, out: &mut [u8]) {
        self.inner_mut().rand_bytes(out);
    }

    /// A uniformly random machine `unsigned int` (`u32`).
    #[must_use]
    pub fn rand_unsigned(&self) -> u32 {
        self.inner_mut().rand_unsigned()
    }

    /// A uniformly random `u32`.
    #[must_use]
    pub fn rand_uint32(&self) -> u32 {
        self.inner_mut().rand_uint32()
    }

    /// A uniformly random `u64`.
    #[must_use]
    pub fn rand_uint64(&self) -> u64 {
        self.inner_mut().rand_uint64()
    }

    /// A uniformly random `u32` in `[0, top]`.
    #[must_use]
    pub fn rand_range(&self, top: u32) -> u32 {
        self.inner_mut().rand_range(top)
    }

    /// A uniformly random `u64` in `[0, top]`.
    #[must_use]
    pub fn rand_range64(&self, top: u64) -> u64 {
        self.inner_mut().rand_range64(top)
    }

    /// A documented no-op retained for API compatibility.
    pub fn stir(&self) {
        self.inner_mut().stir();
    }

    /// Zeroes all key material and returns the engine to the
    /// uninitialized state; any later call besides `init` is fatal.
    pub fn wipe(&self) {
        self.inner_mut().wipe();
    }

    /// Size in bytes of the nolock engine's internal state record.
    #[must_use]
    pub fn size_of_state() -> usize {
        Inner::size_of()
    }
}

impl std::fmt::Debug for EngineNolock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineNolock").finish_non_exhaustive()
    }
}
